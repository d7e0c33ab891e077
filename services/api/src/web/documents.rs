//! services/api/src/web/documents.rs
//!
//! Upload, browse and process documents.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use bytes::Bytes;
use chrono::Utc;
use examease_core::domain::{Document, DocumentType, NewDocument, QuestionFilter};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::adapters::stored_filename;
use crate::error::{ErrorBody, HttpError};
use crate::web::input::ApiPath;
use crate::web::rest::{
    BatchProcessResponse, BatchUploadResponse, DocumentDetailResponse, DocumentResponse,
    ProcessReportResponse, SuccessResponse, UploadResult,
};
use crate::web::state::{AppState, SessionId};

const ALLOWED_TYPES_MESSAGE: &str =
    "Invalid file type. Allowed: PDF, DOCX, PPTX, PPT, TXT, JPG, PNG, ZIP";

/// Files accepted by one batch upload.
pub const MAX_BATCH_FILES: usize = 10;

/// Stores one uploaded file and registers it as a `pending` document. The
/// stored file is removed again if the row cannot be created.
async fn store_upload(
    app_state: &AppState,
    session_id: Uuid,
    original_name: String,
    mime_type: String,
    data: Bytes,
) -> Result<Document, HttpError> {
    let max_bytes = app_state.config.max_upload_bytes;
    if data.len() > max_bytes {
        return Err(HttpError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("File size exceeds {}MB limit", max_bytes / (1024 * 1024)),
        ));
    }
    let doc_type = DocumentType::from_mime(&mime_type)
        .ok_or_else(|| HttpError::bad_request(ALLOWED_TYPES_MESSAGE))?;

    let filename = stored_filename(&original_name, Utc::now());
    let file_path = app_state.files.save(session_id, &filename, &data).await?;

    let created = app_state
        .db
        .create_document(NewDocument {
            session_id,
            filename,
            original_name,
            file_path: file_path.clone(),
            doc_type,
            mime_type,
            size: data.len() as i64,
        })
        .await;

    match created {
        Ok(document) => {
            info!(document_id = %document.id, %session_id, "Document uploaded");
            Ok(document)
        }
        Err(e) => {
            error!("Failed to register upload: {:?}", e);
            if let Err(cleanup) = app_state.files.remove(&file_path).await {
                warn!("Failed to remove orphaned upload {}: {:?}", file_path, cleanup);
            }
            Err(e.into())
        }
    }
}

/// The parts of `multipart` named `part_name`, as (file name, MIME type, bytes).
async fn read_file_parts(
    multipart: &mut Multipart,
    part_name: &str,
    first_only: bool,
) -> Result<Vec<(String, String, Bytes)>, HttpError> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        HttpError::new(e.status(), format!("Failed to read multipart data: {}", e.body_text()))
    })? {
        if field.name() != Some(part_name) {
            continue;
        }
        let original_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| {
            HttpError::new(e.status(), format!("Failed to read file bytes: {}", e.body_text()))
        })?;
        parts.push((original_name, mime_type, data));
        if first_only {
            break;
        }
    }
    Ok(parts)
}

/// Upload a document.
///
/// Accepts a multipart/form-data request with a `file` part. The document is
/// stored as `pending`; processing is a separate call.
#[utoipa::path(
    post,
    path = "/documents",
    request_body(content_type = "multipart/form-data", description = "The document to upload, in a part named `file`."),
    responses(
        (status = 201, description = "Document stored", body = DocumentResponse),
        (status = 400, description = "Missing file or unsupported type", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    params(
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn upload_document_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let (original_name, mime_type, data) = read_file_parts(&mut multipart, "file", true)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| HttpError::bad_request("No file provided"))?;

    let document = store_upload(&app_state, session_id, original_name, mime_type, data).await?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

/// Upload several documents at once.
///
/// Every `files` part goes through the single-upload path on its own; one
/// bad file does not stop the others.
#[utoipa::path(
    post,
    path = "/documents/batch",
    request_body(content_type = "multipart/form-data", description = "One or more parts named `files`."),
    responses(
        (status = 200, description = "One result per file, with totals", body = BatchUploadResponse),
        (status = 400, description = "No files provided", body = ErrorBody)
    ),
    params(
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn upload_documents_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let parts = read_file_parts(&mut multipart, "files", false).await?;
    if parts.is_empty() {
        return Err(HttpError::bad_request("No files provided"));
    }
    if parts.len() > MAX_BATCH_FILES {
        return Err(HttpError::bad_request(format!(
            "At most {MAX_BATCH_FILES} files can be uploaded at once"
        )));
    }

    let mut results = Vec::with_capacity(parts.len());
    for (original_name, mime_type, data) in parts {
        let outcome =
            store_upload(&app_state, session_id, original_name.clone(), mime_type, data).await;
        results.push(UploadResult::new(original_name, outcome.map_err(|e| e.message)));
    }
    Ok(Json(BatchUploadResponse::from(results)))
}

/// List the session's documents, newest first.
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "Documents of the session", body = Vec<DocumentResponse>)
    ),
    params(
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn list_documents_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<impl IntoResponse, HttpError> {
    let documents = app_state.db.list_documents(session_id).await?;
    let body: Vec<DocumentResponse> = documents.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

/// Fetch one document with its extracted text and questions.
#[utoipa::path(
    get,
    path = "/documents/{id}",
    responses(
        (status = 200, description = "The document", body = DocumentDetailResponse),
        (status = 404, description = "Document not found", body = ErrorBody)
    ),
    params(
        ("id" = Uuid, Path, description = "Document id"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn get_document_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiPath(document_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let mut document = app_state
        .db
        .get_document_by_id(session_id, document_id)
        .await?;
    let filter = QuestionFilter {
        source_doc_id: Some(document.id),
        ..Default::default()
    };
    let questions = app_state.questions.list(session_id, &filter).await?;

    let extracted_text = document.extracted_text.take();
    Ok(Json(DocumentDetailResponse {
        document: document.into(),
        extracted_text,
        questions: questions.into_iter().map(Into::into).collect(),
    }))
}

/// Delete a document, its questions and its stored file.
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    responses(
        (status = 200, description = "Document deleted", body = SuccessResponse),
        (status = 404, description = "Document not found", body = ErrorBody)
    ),
    params(
        ("id" = Uuid, Path, description = "Document id"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn delete_document_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiPath(document_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let document = app_state
        .db
        .delete_document(session_id, document_id)
        .await
        .map_err(|e| match e {
            examease_core::PortError::NotFound(_) => {
                HttpError::new(StatusCode::NOT_FOUND, "Document not found")
            }
            other => other.into(),
        })?;

    if let Err(e) = app_state.files.remove(&document.file_path).await {
        warn!("Failed to remove file for document {}: {:?}", document.id, e);
    }
    info!(document_id = %document.id, "Document deleted");
    Ok(Json(SuccessResponse::ok()))
}

/// Extract questions from one document.
///
/// Processing failures are reported in the body with `success: false`; the
/// document is then marked `failed`.
#[utoipa::path(
    post,
    path = "/documents/{id}/process",
    responses(
        (status = 200, description = "Processing outcome", body = ProcessReportResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Document id"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn process_document_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiPath(document_id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let report = app_state
        .processor
        .process_document(session_id, document_id)
        .await;
    Json(ProcessReportResponse::from(report))
}

/// Discard a document's questions and process it again.
#[utoipa::path(
    post,
    path = "/documents/{id}/reprocess",
    responses(
        (status = 200, description = "Processing outcome", body = ProcessReportResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Document id"),
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn reprocess_document_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    ApiPath(document_id): ApiPath<Uuid>,
) -> impl IntoResponse {
    let report = app_state
        .processor
        .reprocess_document(session_id, document_id)
        .await;
    Json(ProcessReportResponse::from(report))
}

/// Process every pending document of the session, one at a time.
#[utoipa::path(
    post,
    path = "/documents/process-pending",
    responses(
        (status = 200, description = "One report per pending document", body = BatchProcessResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    params(
        ("x-session-id" = Uuid, Header, description = "The caller's anonymous session id.")
    )
)]
pub async fn process_pending_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<impl IntoResponse, HttpError> {
    let reports = app_state.processor.process_all_pending(session_id).await?;
    Ok(Json(BatchProcessResponse::from(reports)))
}
