//! services/api/src/web/focus_sessions.rs
//!
//! Handlers for timed focus and break intervals.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use examease_core::validation::{EndFocusSessionInput, StartFocusSessionInput};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError};
use crate::web::input::{ApiJson, ApiPath, ApiQuery};
use crate::web::rest::{FocusSessionResponse, FocusStatsResponse};
use crate::web::state::{AppState, SessionId};

#[derive(Debug, Default, Deserialize)]
pub struct ListFocusQuery {
    pub limit: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/focus-sessions",
    responses(
        (status = 200, description = "Recent intervals, newest first", body = Vec<FocusSessionResponse>)
    ),
    params(
        ("limit" = Option<u32>, Query, description = "How many to return (default 10, at most 100)."),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn list_focus_sessions_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiQuery(query): ApiQuery<ListFocusQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let sessions = app_state.focus.list(session_id, query.limit).await?;
    let body: Vec<FocusSessionResponse> = sessions.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

/// Start a focus or break interval now.
#[utoipa::path(
    post,
    path = "/focus-sessions",
    request_body(content_type = "application/json", description = "`type` (`focus` or `break`, default focus), `target_time` in seconds (60-7200) and an optional `task_name`."),
    responses(
        (status = 201, description = "Interval started", body = FocusSessionResponse),
        (status = 400, description = "Validation failed", body = ErrorBody)
    ),
    params(
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn start_focus_session_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiJson(input): ApiJson<StartFocusSessionInput>,
) -> Result<impl IntoResponse, HttpError> {
    let started = app_state.focus.start(session_id, input, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(FocusSessionResponse::from(started))))
}

/// End an interval now and record how long it ran.
#[utoipa::path(
    put,
    path = "/focus-sessions/{id}/end",
    request_body(content_type = "application/json", description = "`{ \"completed\": true, \"notes\": \"...\" }`; both optional."),
    responses(
        (status = 200, description = "Interval with its measured duration", body = FocusSessionResponse),
        (status = 404, description = "Interval not found", body = ErrorBody)
    ),
    params(
        ("id" = Uuid, Path, description = "Focus session id"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn end_focus_session_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiPath(focus_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<EndFocusSessionInput>,
) -> Result<impl IntoResponse, HttpError> {
    let ended = app_state
        .focus
        .end(session_id, focus_id, input, Utc::now())
        .await?;
    Ok(Json(FocusSessionResponse::from(ended)))
}

#[utoipa::path(
    get,
    path = "/focus-sessions/stats",
    responses(
        (status = 200, description = "Minutes in completed intervals today, this week and overall", body = FocusStatsResponse)
    ),
    params(
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn focus_stats_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = app_state.focus.stats(session_id, Utc::now()).await?;
    Ok(Json(FocusStatsResponse::from(stats)))
}
