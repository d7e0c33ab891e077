pub mod documents;
pub mod focus_sessions;
pub mod input;
pub mod middleware;
pub mod prep_packs;
pub mod questions;
pub mod rest;
pub mod state;
pub mod study_plans;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;

pub use middleware::require_session;
use state::AppState;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Builds the REST router. Every route requires an `x-session-id` header.
pub fn router(app_state: Arc<AppState>) -> Router {
    let body_limit = app_state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    let batch_body_limit = app_state
        .config
        .max_upload_bytes
        .saturating_mul(documents::MAX_BATCH_FILES)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/documents",
            post(documents::upload_document_handler).get(documents::list_documents_handler),
        )
        .route(
            "/documents/batch",
            post(documents::upload_documents_handler).layer(DefaultBodyLimit::max(batch_body_limit)),
        )
        .route(
            "/documents/process-pending",
            post(documents::process_pending_handler),
        )
        .route(
            "/documents/{id}",
            get(documents::get_document_handler).delete(documents::delete_document_handler),
        )
        .route(
            "/documents/{id}/process",
            post(documents::process_document_handler),
        )
        .route(
            "/documents/{id}/reprocess",
            post(documents::reprocess_document_handler),
        )
        .route(
            "/questions",
            get(questions::list_questions_handler).post(questions::create_question_handler),
        )
        .route(
            "/questions/bulk-delete",
            post(questions::bulk_delete_questions_handler),
        )
        .route(
            "/questions/{id}",
            patch(questions::update_question_handler)
                .delete(questions::delete_question_handler),
        )
        .route(
            "/prep-packs",
            get(prep_packs::list_prep_packs_handler).post(prep_packs::create_prep_pack_handler),
        )
        .route(
            "/prep-packs/{id}",
            get(prep_packs::get_prep_pack_handler).delete(prep_packs::delete_prep_pack_handler),
        )
        .route(
            "/prep-packs/{id}/status",
            put(prep_packs::update_prep_pack_status_handler),
        )
        .route(
            "/study-plans",
            get(study_plans::list_study_plans_handler)
                .post(study_plans::create_study_plan_handler),
        )
        .route(
            "/study-plans/{id}",
            get(study_plans::get_study_plan_handler)
                .delete(study_plans::delete_study_plan_handler),
        )
        .route(
            "/study-plans/{id}/progress",
            put(study_plans::update_study_plan_progress_handler),
        )
        .route(
            "/focus-sessions",
            get(focus_sessions::list_focus_sessions_handler)
                .post(focus_sessions::start_focus_session_handler),
        )
        .route("/focus-sessions/stats", get(focus_sessions::focus_stats_handler))
        .route(
            "/focus-sessions/{id}/end",
            put(focus_sessions::end_focus_session_handler),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_session,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(app_state)
}
