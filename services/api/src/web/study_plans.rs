//! services/api/src/web/study_plans.rs
//!
//! Handlers for study plans and their day-by-day progress.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{NaiveDate, Utc};
use examease_core::validation::CreateStudyPlanInput;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError};
use crate::web::input::{ApiJson, ApiPath};
use crate::web::rest::{StudyPlanResponse, SuccessResponse};
use crate::web::state::{AppState, SessionId};

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub date: NaiveDate,
    /// Omit to flip the day's current state.
    #[serde(default)]
    pub completed: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/study-plans",
    responses(
        (status = 200, description = "Study plans of the session, newest first", body = Vec<StudyPlanResponse>)
    ),
    params(
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn list_study_plans_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<impl IntoResponse, HttpError> {
    let plans = app_state.study_plans.list(session_id).await?;
    let body: Vec<StudyPlanResponse> = plans.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

/// Create a plan and schedule its topics starting today (UTC).
#[utoipa::path(
    post,
    path = "/study-plans",
    request_body(content_type = "application/json", description = "`title`, optional `subject`, `exam_date` (YYYY-MM-DD), `daily_hours` (0.5-12) and `topics` (`name`, `priority`, `estimated_hours`)."),
    responses(
        (status = 201, description = "Plan created", body = StudyPlanResponse),
        (status = 400, description = "Validation failed", body = ErrorBody)
    ),
    params(
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn create_study_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiJson(input): ApiJson<CreateStudyPlanInput>,
) -> Result<impl IntoResponse, HttpError> {
    let today = Utc::now().date_naive();
    let plan = app_state
        .study_plans
        .create(session_id, input, today)
        .await?;
    Ok((StatusCode::CREATED, Json(StudyPlanResponse::from(plan))))
}

#[utoipa::path(
    get,
    path = "/study-plans/{id}",
    responses(
        (status = 200, description = "The plan", body = StudyPlanResponse),
        (status = 404, description = "Plan not found", body = ErrorBody)
    ),
    params(
        ("id" = Uuid, Path, description = "Plan id"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn get_study_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiPath(plan_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let plan = app_state.study_plans.get(session_id, plan_id).await?;
    Ok(Json(StudyPlanResponse::from(plan)))
}

#[utoipa::path(
    delete,
    path = "/study-plans/{id}",
    responses(
        (status = 200, description = "Plan deleted", body = SuccessResponse),
        (status = 404, description = "Plan not found", body = ErrorBody)
    ),
    params(
        ("id" = Uuid, Path, description = "Plan id"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn delete_study_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiPath(plan_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.study_plans.delete(session_id, plan_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Mark one day of the plan as done or not done. Without `completed` the
/// day's flag is toggled.
#[utoipa::path(
    put,
    path = "/study-plans/{id}/progress",
    request_body(content_type = "application/json", description = "`{ \"date\": \"2026-05-04\", \"completed\": true }`; omit `completed` to toggle."),
    responses(
        (status = 200, description = "Plan with recomputed progress", body = StudyPlanResponse),
        (status = 404, description = "Plan not found", body = ErrorBody)
    ),
    params(
        ("id" = Uuid, Path, description = "Plan id"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn update_study_plan_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiPath(plan_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ProgressRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let plan = app_state
        .study_plans
        .update_progress(session_id, plan_id, request.date, request.completed)
        .await?;
    Ok(Json(StudyPlanResponse::from(plan)))
}
