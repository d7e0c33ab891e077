//! services/api/src/web/questions.rs
//!
//! Handlers for browsing and editing the question bank.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use examease_core::domain::{QuestionFilter, QuestionPatch};
use examease_core::validation::CreateQuestionInput;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError};
use crate::web::input::{ApiJson, ApiPath, ApiQuery};
use crate::web::rest::{BulkDeleteResponse, QuestionResponse, SuccessResponse};
use crate::web::state::{AppState, SessionId};

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<Uuid>,
}

/// List questions, newest first.
#[utoipa::path(
    get,
    path = "/questions",
    responses(
        (status = 200, description = "Matching questions", body = Vec<QuestionResponse>),
        (status = 400, description = "Malformed filter", body = ErrorBody)
    ),
    params(
        ("difficulty" = Option<String>, Query, description = "easy, medium or hard"),
        ("type" = Option<String>, Query, description = "mcq, short, long or numerical"),
        ("topic" = Option<String>, Query, description = "Substring of the topic"),
        ("search" = Option<String>, Query, description = "Substring of the text or topic"),
        ("source_doc_id" = Option<Uuid>, Query, description = "Only questions from this document"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn list_questions_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiQuery(filter): ApiQuery<QuestionFilter>,
) -> Result<impl IntoResponse, HttpError> {
    let questions = app_state.questions.list(session_id, &filter).await?;
    let body: Vec<QuestionResponse> = questions.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

/// Add a question by hand.
#[utoipa::path(
    post,
    path = "/questions",
    request_body(content_type = "application/json", description = "`text` (10+ characters), optional `answer`, `marks` (1-20), `type`, `difficulty`, `topic`, `source_doc_id`."),
    responses(
        (status = 201, description = "Question created", body = QuestionResponse),
        (status = 400, description = "Validation failed", body = ErrorBody)
    ),
    params(
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn create_question_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiJson(input): ApiJson<CreateQuestionInput>,
) -> Result<impl IntoResponse, HttpError> {
    let question = app_state.questions.create(session_id, input).await?;
    Ok((StatusCode::CREATED, Json(QuestionResponse::from(question))))
}

/// Change some fields of a question.
#[utoipa::path(
    patch,
    path = "/questions/{id}",
    request_body(content_type = "application/json", description = "Any of `text`, `answer`, `marks`, `type`, `difficulty`, `topic`."),
    responses(
        (status = 200, description = "Updated question", body = QuestionResponse),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 404, description = "Question not found", body = ErrorBody)
    ),
    params(
        ("id" = Uuid, Path, description = "Question id"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn update_question_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiPath(question_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<QuestionPatch>,
) -> Result<impl IntoResponse, HttpError> {
    let question = app_state
        .questions
        .update(session_id, question_id, patch)
        .await?;
    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    delete,
    path = "/questions/{id}",
    responses(
        (status = 200, description = "Question deleted", body = SuccessResponse),
        (status = 404, description = "Question not found", body = ErrorBody)
    ),
    params(
        ("id" = Uuid, Path, description = "Question id"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn delete_question_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiPath(question_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.questions.delete(session_id, question_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Delete several questions at once. Ids not owned by the session are skipped.
#[utoipa::path(
    post,
    path = "/questions/bulk-delete",
    request_body(content_type = "application/json", description = "`{ \"ids\": [uuid, ...] }`"),
    responses(
        (status = 200, description = "Number of questions removed", body = BulkDeleteResponse),
        (status = 400, description = "No ids given", body = ErrorBody)
    ),
    params(
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn bulk_delete_questions_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiJson(request): ApiJson<BulkDeleteRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let deleted_count = app_state
        .questions
        .bulk_delete(session_id, &request.ids)
        .await?;
    Ok(Json(BulkDeleteResponse {
        success: true,
        deleted_count,
    }))
}
