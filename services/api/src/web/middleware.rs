//! services/api/src/web/middleware.rs
//!
//! Session middleware for the REST routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::error::HttpError;
use crate::web::state::{AppState, SessionId};

/// Name of the header carrying the caller's anonymous session id.
pub const SESSION_HEADER: &str = "x-session-id";

/// Middleware that resolves the `x-session-id` header to a session.
///
/// The session row is created on first sight and the id is inserted into the
/// request extensions for handlers to use. A missing or malformed id is a 400.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    // 1. Extract the session header
    let raw = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HttpError::bad_request(format!("{} header is required", SESSION_HEADER)))?;

    // 2. Parse it as a UUID
    let session_id = Uuid::parse_str(raw.trim())
        .map_err(|_| HttpError::bad_request(format!("Invalid {} format", SESSION_HEADER)))?;

    // 3. Make sure the session exists
    state.db.get_or_create_session(session_id).await.map_err(|e| {
        error!("Failed to resolve session {}: {:?}", session_id, e);
        HttpError::from(e)
    })?;

    // 4. Insert the session into request extensions
    req.extensions_mut().insert(SessionId(session_id));

    // 5. Continue to the handler
    Ok(next.run(req).await)
}
