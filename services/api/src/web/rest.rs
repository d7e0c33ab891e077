//! services/api/src/web/rest.rs
//!
//! Contains the master definition for the OpenAPI specification and the
//! response payloads shared by the REST handlers.

use chrono::{DateTime, NaiveDate, Utc};
use examease_core::domain::{
    Difficulty, Document, DocumentStatus, DocumentType, FocusKind, FocusSession, FocusStats,
    PlanStatus, PrepPack, PrepPackConfig, PrepPackContent, PrepPackStatus, Question, QuestionType,
    ScheduleItem, StudyPlan, StudyTopic,
};
use examease_core::ProcessReport;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::ErrorBody;
use crate::web::{documents, focus_sessions, prep_packs, questions, study_plans};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        documents::upload_document_handler,
        documents::upload_documents_handler,
        documents::list_documents_handler,
        documents::get_document_handler,
        documents::delete_document_handler,
        documents::process_document_handler,
        documents::reprocess_document_handler,
        documents::process_pending_handler,
        questions::list_questions_handler,
        questions::create_question_handler,
        questions::update_question_handler,
        questions::delete_question_handler,
        questions::bulk_delete_questions_handler,
        prep_packs::list_prep_packs_handler,
        prep_packs::create_prep_pack_handler,
        prep_packs::get_prep_pack_handler,
        prep_packs::delete_prep_pack_handler,
        prep_packs::update_prep_pack_status_handler,
        study_plans::list_study_plans_handler,
        study_plans::create_study_plan_handler,
        study_plans::get_study_plan_handler,
        study_plans::delete_study_plan_handler,
        study_plans::update_study_plan_progress_handler,
        focus_sessions::list_focus_sessions_handler,
        focus_sessions::start_focus_session_handler,
        focus_sessions::end_focus_session_handler,
        focus_sessions::focus_stats_handler,
    ),
    components(
        schemas(
            ErrorBody,
            SuccessResponse,
            DocumentResponse,
            UploadResult,
            BatchUploadResponse,
            DocumentDetailResponse,
            ProcessReportResponse,
            BatchProcessResponse,
            QuestionResponse,
            BulkDeleteResponse,
            PrepPackResponse,
            StudyPlanResponse,
            FocusSessionResponse,
            FocusStatsResponse,
        )
    ),
    tags(
        (name = "ExamEase API", description = "Document processing, question bank, prep packs, study plans and focus sessions.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Returned by operations that have nothing else to report.
#[derive(Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// An uploaded document without its extracted text.
#[derive(Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    #[schema(value_type = String, example = "pdf")]
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub mime_type: String,
    pub size: i64,
    #[schema(value_type = String, example = "pending")]
    pub status: DocumentStatus,
    pub error_message: Option<String>,
    pub question_count: i64,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename,
            original_name: doc.original_name,
            doc_type: doc.doc_type,
            mime_type: doc.mime_type,
            size: doc.size,
            status: doc.status,
            error_message: doc.error_message,
            question_count: doc.question_count,
            uploaded_at: doc.uploaded_at,
            processed_at: doc.processed_at,
        }
    }
}

/// The outcome for one file of a batch upload.
#[derive(Serialize, ToSchema)]
pub struct UploadResult {
    pub original_name: String,
    pub success: bool,
    pub document: Option<DocumentResponse>,
    pub error: Option<String>,
}

impl UploadResult {
    pub fn new(original_name: String, outcome: Result<Document, String>) -> Self {
        match outcome {
            Ok(document) => Self {
                original_name,
                success: true,
                document: Some(document.into()),
                error: None,
            },
            Err(error) => Self {
                original_name,
                success: false,
                document: None,
                error: Some(error),
            },
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct BatchUploadResponse {
    pub results: Vec<UploadResult>,
    pub total_success: usize,
    pub total_failed: usize,
}

impl From<Vec<UploadResult>> for BatchUploadResponse {
    fn from(results: Vec<UploadResult>) -> Self {
        let total_success = results.iter().filter(|r| r.success).count();
        Self {
            total_failed: results.len() - total_success,
            total_success,
            results,
        }
    }
}

/// A document with its stored text and the questions extracted from it.
#[derive(Serialize, ToSchema)]
pub struct DocumentDetailResponse {
    #[serde(flatten)]
    pub document: DocumentResponse,
    pub extracted_text: Option<String>,
    pub questions: Vec<QuestionResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct ProcessReportResponse {
    pub document_id: Uuid,
    pub success: bool,
    pub questions_found: usize,
    pub preview: Option<String>,
    pub error: Option<String>,
}

impl From<ProcessReport> for ProcessReportResponse {
    fn from(report: ProcessReport) -> Self {
        Self {
            document_id: report.document_id,
            success: report.success,
            questions_found: report.questions_found,
            preview: report.preview,
            error: report.error,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct BatchProcessResponse {
    pub success: bool,
    pub processed: usize,
    pub failed: usize,
    pub results: Vec<ProcessReportResponse>,
}

impl From<Vec<ProcessReport>> for BatchProcessResponse {
    fn from(reports: Vec<ProcessReport>) -> Self {
        let failed = reports.iter().filter(|r| !r.success).count();
        Self {
            success: true,
            processed: reports.len() - failed,
            failed,
            results: reports.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub text: String,
    pub answer: Option<String>,
    pub marks: Option<u32>,
    #[schema(value_type = String, example = "short")]
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[schema(value_type = String, example = "medium")]
    pub difficulty: Difficulty,
    pub topic: Option<String>,
    pub source_doc_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Question> for QuestionResponse {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            text: q.text,
            answer: q.answer,
            marks: q.marks,
            question_type: q.question_type,
            difficulty: q.difficulty,
            topic: q.topic,
            source_doc_id: q.source_doc_id,
            created_at: q.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct BulkDeleteResponse {
    pub success: bool,
    pub deleted_count: u64,
}

#[derive(Serialize, ToSchema)]
pub struct PrepPackResponse {
    pub id: Uuid,
    pub title: String,
    pub subject: String,
    pub description: Option<String>,
    pub total_marks: u32,
    #[schema(value_type = String, example = "generated")]
    pub status: PrepPackStatus,
    #[schema(value_type = Object)]
    pub content: PrepPackContent,
    #[schema(value_type = Object)]
    pub config: PrepPackConfig,
    pub created_at: DateTime<Utc>,
}

impl From<PrepPack> for PrepPackResponse {
    fn from(pack: PrepPack) -> Self {
        Self {
            id: pack.id,
            title: pack.title,
            subject: pack.subject,
            description: pack.description,
            total_marks: pack.total_marks,
            status: pack.status,
            content: pack.content,
            config: pack.config,
            created_at: pack.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct StudyPlanResponse {
    pub id: Uuid,
    pub title: String,
    pub subject: Option<String>,
    pub exam_date: Option<NaiveDate>,
    pub daily_hours: f64,
    #[schema(value_type = Vec<Object>)]
    pub schedule: Vec<ScheduleItem>,
    #[schema(value_type = Vec<Object>)]
    pub topics: Vec<StudyTopic>,
    pub progress: f64,
    #[schema(value_type = String, example = "active")]
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
}

impl From<StudyPlan> for StudyPlanResponse {
    fn from(plan: StudyPlan) -> Self {
        Self {
            id: plan.id,
            title: plan.title,
            subject: plan.subject,
            exam_date: plan.exam_date,
            daily_hours: plan.daily_hours,
            schedule: plan.schedule,
            topics: plan.topics,
            progress: plan.progress,
            status: plan.status,
            created_at: plan.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct FocusSessionResponse {
    pub id: Uuid,
    #[schema(value_type = String, example = "focus")]
    #[serde(rename = "type")]
    pub kind: FocusKind,
    pub target_time: u32,
    pub duration: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub completed: bool,
    pub task_name: Option<String>,
    pub notes: Option<String>,
}

impl From<FocusSession> for FocusSessionResponse {
    fn from(focus: FocusSession) -> Self {
        Self {
            id: focus.id,
            kind: focus.kind,
            target_time: focus.target_seconds,
            duration: focus.duration_seconds,
            start_time: focus.start_time,
            end_time: focus.end_time,
            completed: focus.completed,
            task_name: focus.task_name,
            notes: focus.notes,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct FocusStatsResponse {
    pub total_sessions: u64,
    pub today_minutes: i64,
    pub week_minutes: i64,
    pub total_minutes: i64,
}

impl From<FocusStats> for FocusStatsResponse {
    fn from(stats: FocusStats) -> Self {
        Self {
            total_sessions: stats.total_sessions,
            today_minutes: stats.today_minutes,
            week_minutes: stats.week_minutes,
            total_minutes: stats.total_minutes,
        }
    }
}
