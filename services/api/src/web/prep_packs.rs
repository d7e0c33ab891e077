//! services/api/src/web/prep_packs.rs
//!
//! Handlers for generating and managing prep packs.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use examease_core::domain::PrepPackStatus;
use examease_core::validation::CreatePrepPackInput;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError};
use crate::web::input::{ApiJson, ApiPath};
use crate::web::rest::{PrepPackResponse, SuccessResponse};
use crate::web::state::{AppState, SessionId};

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: PrepPackStatus,
}

#[utoipa::path(
    get,
    path = "/prep-packs",
    responses(
        (status = 200, description = "Prep packs of the session, newest first", body = Vec<PrepPackResponse>)
    ),
    params(
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn list_prep_packs_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<impl IntoResponse, HttpError> {
    let packs = app_state.prep_packs.list(session_id).await?;
    let body: Vec<PrepPackResponse> = packs.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

/// Generate a prep pack from the session's question bank.
#[utoipa::path(
    post,
    path = "/prep-packs",
    request_body(content_type = "application/json", description = "`title`, `subject`, optional `description`, `total_marks` (10-500) and `config` (`pattern`, `difficulty`, `sections`, `include_answers`, `include_formulas`, `include_tips`)."),
    responses(
        (status = 201, description = "Prep pack generated", body = PrepPackResponse),
        (status = 400, description = "Validation failed or no questions available", body = ErrorBody)
    ),
    params(
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn create_prep_pack_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiJson(input): ApiJson<CreatePrepPackInput>,
) -> Result<impl IntoResponse, HttpError> {
    let mut rng = StdRng::from_entropy();
    let pack = app_state
        .prep_packs
        .create(session_id, input, &mut rng)
        .await?;
    Ok((StatusCode::CREATED, Json(PrepPackResponse::from(pack))))
}

#[utoipa::path(
    get,
    path = "/prep-packs/{id}",
    responses(
        (status = 200, description = "The prep pack", body = PrepPackResponse),
        (status = 404, description = "Prep pack not found", body = ErrorBody)
    ),
    params(
        ("id" = Uuid, Path, description = "Prep pack id"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn get_prep_pack_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiPath(pack_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let pack = app_state.prep_packs.get(session_id, pack_id).await?;
    Ok(Json(PrepPackResponse::from(pack)))
}

#[utoipa::path(
    delete,
    path = "/prep-packs/{id}",
    responses(
        (status = 200, description = "Prep pack deleted", body = SuccessResponse),
        (status = 404, description = "Prep pack not found", body = ErrorBody)
    ),
    params(
        ("id" = Uuid, Path, description = "Prep pack id"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn delete_prep_pack_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiPath(pack_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.prep_packs.delete(session_id, pack_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Move a prep pack to `generated`, `in_progress` or `completed`.
#[utoipa::path(
    put,
    path = "/prep-packs/{id}/status",
    request_body(content_type = "application/json", description = "`{ \"status\": \"in_progress\" }`"),
    responses(
        (status = 200, description = "Status updated", body = SuccessResponse),
        (status = 404, description = "Prep pack not found", body = ErrorBody)
    ),
    params(
        ("id" = Uuid, Path, description = "Prep pack id"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn update_prep_pack_status_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiPath(pack_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateStatusRequest>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .prep_packs
        .update_status(session_id, pack_id, request.status)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}
