//! crates/examease_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or file systems.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Document, DocumentStatus, FocusOutcome, FocusSession, NewDocument, NewQuestion, PlanStatus,
    PrepPack, PrepPackStatus, Question, QuestionFilter, QuestionPatch, ScheduleItem, StudyPlan,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, disk).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    Invalid(String),
    #[error("Text extraction failed: {0}")]
    Extraction(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence for every record the core reads or writes. All lookups are
/// scoped to the owning session.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Sessions ---
    async fn get_or_create_session(&self, session_id: Uuid) -> PortResult<()>;

    // --- Documents ---
    async fn create_document(&self, document: NewDocument) -> PortResult<Document>;

    async fn get_document_by_id(&self, session_id: Uuid, document_id: Uuid)
        -> PortResult<Document>;

    async fn list_documents(&self, session_id: Uuid) -> PortResult<Vec<Document>>;

    async fn list_documents_by_status(
        &self,
        session_id: Uuid,
        status: DocumentStatus,
    ) -> PortResult<Vec<Document>>;

    async fn update_document_status(
        &self,
        document_id: Uuid,
        status: DocumentStatus,
    ) -> PortResult<()>;

    /// Stores the questions of one extraction run together with the document's
    /// extracted text and marks the document completed, all in one transaction.
    async fn save_extraction(
        &self,
        document_id: Uuid,
        session_id: Uuid,
        questions: &[NewQuestion],
        extracted_text: &str,
        processed_at: DateTime<Utc>,
    ) -> PortResult<u64>;

    async fn fail_document(&self, document_id: Uuid, error_message: &str) -> PortResult<()>;

    /// Deletes every question derived from the document and returns it to
    /// `pending` with no extracted text or error, in one transaction.
    async fn reset_document(&self, session_id: Uuid, document_id: Uuid) -> PortResult<()>;

    /// Deletes the document and, by cascade, its questions.
    async fn delete_document(&self, session_id: Uuid, document_id: Uuid) -> PortResult<Document>;

    // --- Questions ---
    async fn list_questions(
        &self,
        session_id: Uuid,
        filter: &QuestionFilter,
    ) -> PortResult<Vec<Question>>;

    async fn get_question(&self, session_id: Uuid, question_id: Uuid) -> PortResult<Question>;

    async fn create_question(&self, session_id: Uuid, question: NewQuestion)
        -> PortResult<Question>;

    async fn update_question(
        &self,
        session_id: Uuid,
        question_id: Uuid,
        patch: &QuestionPatch,
    ) -> PortResult<Question>;

    async fn delete_questions(&self, session_id: Uuid, question_ids: &[Uuid]) -> PortResult<u64>;

    // --- Prep packs ---
    async fn save_prep_pack(&self, pack: &PrepPack) -> PortResult<()>;

    async fn get_prep_pack(&self, session_id: Uuid, pack_id: Uuid) -> PortResult<PrepPack>;

    async fn list_prep_packs(&self, session_id: Uuid) -> PortResult<Vec<PrepPack>>;

    async fn update_prep_pack_status(
        &self,
        session_id: Uuid,
        pack_id: Uuid,
        status: PrepPackStatus,
    ) -> PortResult<()>;

    async fn delete_prep_pack(&self, session_id: Uuid, pack_id: Uuid) -> PortResult<()>;

    // --- Study plans ---
    async fn save_study_plan(&self, plan: &StudyPlan) -> PortResult<()>;

    async fn get_study_plan(&self, session_id: Uuid, plan_id: Uuid) -> PortResult<StudyPlan>;

    async fn list_study_plans(&self, session_id: Uuid) -> PortResult<Vec<StudyPlan>>;

    async fn update_study_plan_progress(
        &self,
        plan_id: Uuid,
        schedule: &[ScheduleItem],
        progress: f64,
        status: PlanStatus,
    ) -> PortResult<()>;

    async fn delete_study_plan(&self, session_id: Uuid, plan_id: Uuid) -> PortResult<()>;

    // --- Focus sessions ---
    async fn save_focus_session(&self, focus: &FocusSession) -> PortResult<()>;

    async fn get_focus_session(&self, session_id: Uuid, focus_id: Uuid) -> PortResult<FocusSession>;

    /// Newest first. `None` returns every interval of the session.
    async fn list_focus_sessions(
        &self,
        session_id: Uuid,
        limit: Option<u32>,
    ) -> PortResult<Vec<FocusSession>>;

    async fn end_focus_session(
        &self,
        session_id: Uuid,
        focus_id: Uuid,
        outcome: &FocusOutcome,
    ) -> PortResult<FocusSession>;
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persists an upload under the session's directory and returns the stored path.
    async fn save(&self, session_id: Uuid, filename: &str, data: &[u8]) -> PortResult<String>;

    /// Reads the raw bytes of a previously stored file.
    async fn read(&self, path: &str) -> PortResult<Bytes>;

    async fn remove(&self, path: &str) -> PortResult<()>;
}

/// Turns the raw bytes of one document format into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, data: &[u8]) -> PortResult<String>;
}
