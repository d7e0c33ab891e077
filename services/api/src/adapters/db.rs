//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use examease_core::domain::{
    Document, DocumentStatus, FocusOutcome, FocusSession, NewDocument, NewQuestion, PlanStatus,
    PrepPack, PrepPackConfig, PrepPackContent, PrepPackStatus, Question, QuestionFilter,
    QuestionPatch, ScheduleItem, StudyPlan, StudyTopic, UnknownVariant,
};
use examease_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Maps `RowNotFound` to a `NotFound` naming the missing record.
fn not_found_or_unexpected(e: sqlx::Error, what: &str, id: Uuid) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(format!("{} {} not found", what, id)),
        _ => PortError::Unexpected(e.to_string()),
    }
}

fn parse_column<T: FromStr<Err = UnknownVariant>>(value: &str) -> PortResult<T> {
    value.parse::<T>().map_err(|e| PortError::Invalid(e.to_string()))
}

/// Marks beyond the INTEGER column clamp to its maximum.
fn marks_to_column(marks: Option<u32>) -> Option<i32> {
    marks.map(|m| i32::try_from(m).unwrap_or(i32::MAX))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

/// `question_count` is counted live so deletes and manual additions show up.
const DOCUMENT_COLUMNS: &str = "id, session_id, filename, original_name, file_path, doc_type, \
     mime_type, size, status, extracted_text, error_message, \
     (SELECT COUNT(*) FROM questions q WHERE q.source_doc_id = documents.id) AS question_count, \
     uploaded_at, processed_at";

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    session_id: Uuid,
    filename: String,
    original_name: String,
    file_path: String,
    doc_type: String,
    mime_type: String,
    size: i64,
    status: String,
    extracted_text: Option<String>,
    error_message: Option<String>,
    question_count: i64,
    uploaded_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
}
impl DocumentRecord {
    fn to_domain(self) -> PortResult<Document> {
        Ok(Document {
            id: self.id,
            session_id: self.session_id,
            filename: self.filename,
            original_name: self.original_name,
            file_path: self.file_path,
            doc_type: parse_column(&self.doc_type)?,
            mime_type: self.mime_type,
            size: self.size,
            status: parse_column(&self.status)?,
            extracted_text: self.extracted_text,
            error_message: self.error_message,
            question_count: self.question_count,
            uploaded_at: self.uploaded_at,
            processed_at: self.processed_at,
        })
    }
}

const QUESTION_COLUMNS: &str =
    "id, session_id, text, answer, marks, question_type, difficulty, topic, source_doc_id, created_at";

#[derive(FromRow)]
struct QuestionRecord {
    id: Uuid,
    session_id: Uuid,
    text: String,
    answer: Option<String>,
    marks: Option<i32>,
    question_type: String,
    difficulty: String,
    topic: Option<String>,
    source_doc_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}
impl QuestionRecord {
    fn to_domain(self) -> PortResult<Question> {
        Ok(Question {
            id: self.id,
            session_id: self.session_id,
            text: self.text,
            answer: self.answer,
            marks: self.marks.and_then(|m| u32::try_from(m).ok()),
            question_type: parse_column(&self.question_type)?,
            difficulty: parse_column(&self.difficulty)?,
            topic: self.topic,
            source_doc_id: self.source_doc_id,
            created_at: self.created_at,
        })
    }
}

const PREP_PACK_COLUMNS: &str =
    "id, session_id, title, subject, description, content, config, total_marks, status, created_at";

#[derive(FromRow)]
struct PrepPackRecord {
    id: Uuid,
    session_id: Uuid,
    title: String,
    subject: String,
    description: Option<String>,
    content: Json<PrepPackContent>,
    config: Json<PrepPackConfig>,
    total_marks: i32,
    status: String,
    created_at: DateTime<Utc>,
}
impl PrepPackRecord {
    fn to_domain(self) -> PortResult<PrepPack> {
        Ok(PrepPack {
            id: self.id,
            session_id: self.session_id,
            title: self.title,
            subject: self.subject,
            description: self.description,
            content: self.content.0,
            config: self.config.0,
            total_marks: u32::try_from(self.total_marks)
                .map_err(|e| PortError::Invalid(e.to_string()))?,
            status: parse_column(&self.status)?,
            created_at: self.created_at,
        })
    }
}

const STUDY_PLAN_COLUMNS: &str = "id, session_id, title, subject, exam_date, daily_hours, \
     schedule, topics, progress, status, created_at";

#[derive(FromRow)]
struct StudyPlanRecord {
    id: Uuid,
    session_id: Uuid,
    title: String,
    subject: Option<String>,
    exam_date: Option<NaiveDate>,
    daily_hours: f64,
    schedule: Json<Vec<ScheduleItem>>,
    topics: Json<Vec<StudyTopic>>,
    progress: f64,
    status: String,
    created_at: DateTime<Utc>,
}
impl StudyPlanRecord {
    fn to_domain(self) -> PortResult<StudyPlan> {
        Ok(StudyPlan {
            id: self.id,
            session_id: self.session_id,
            title: self.title,
            subject: self.subject,
            exam_date: self.exam_date,
            daily_hours: self.daily_hours,
            schedule: self.schedule.0,
            topics: self.topics.0,
            progress: self.progress,
            status: parse_column(&self.status)?,
            created_at: self.created_at,
        })
    }
}

const FOCUS_COLUMNS: &str = "id, session_id, kind, target_seconds, duration_seconds, start_time, \
     end_time, completed, task_name, notes";

#[derive(FromRow)]
struct FocusSessionRecord {
    id: Uuid,
    session_id: Uuid,
    kind: String,
    target_seconds: i32,
    duration_seconds: i64,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    completed: bool,
    task_name: Option<String>,
    notes: Option<String>,
}
impl FocusSessionRecord {
    fn to_domain(self) -> PortResult<FocusSession> {
        Ok(FocusSession {
            id: self.id,
            session_id: self.session_id,
            kind: parse_column(&self.kind)?,
            target_seconds: u32::try_from(self.target_seconds)
                .map_err(|e| PortError::Invalid(e.to_string()))?,
            duration_seconds: self.duration_seconds,
            start_time: self.start_time,
            end_time: self.end_time,
            completed: self.completed,
            task_name: self.task_name,
            notes: self.notes,
        })
    }
}

/// Appends the question-bank filters to a query that already selects one session.
fn push_question_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &QuestionFilter) {
    if let Some(difficulty) = filter.difficulty {
        qb.push(" AND difficulty = ").push_bind(difficulty.as_str());
    }
    if let Some(question_type) = filter.question_type {
        qb.push(" AND question_type = ").push_bind(question_type.as_str());
    }
    if let Some(source_doc_id) = filter.source_doc_id {
        qb.push(" AND source_doc_id = ").push_bind(source_doc_id);
    }
    if let Some(topic) = &filter.topic {
        qb.push(" AND strpos(lower(coalesce(topic, '')), lower(")
            .push_bind(topic.clone())
            .push(")) > 0");
    }
    if let Some(search) = &filter.search {
        qb.push(" AND (strpos(lower(text), lower(")
            .push_bind(search.clone())
            .push(")) > 0 OR strpos(lower(coalesce(topic, '')), lower(")
            .push_bind(search.clone())
            .push(")) > 0)");
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    // --- Sessions ---

    async fn get_or_create_session(&self, session_id: Uuid) -> PortResult<()> {
        sqlx::query("INSERT INTO sessions (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    // --- Documents ---

    async fn create_document(&self, document: NewDocument) -> PortResult<Document> {
        let sql = format!(
            "INSERT INTO documents (id, session_id, filename, original_name, file_path, doc_type, mime_type, size, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            DOCUMENT_COLUMNS
        );
        let record = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(document.session_id)
            .bind(&document.filename)
            .bind(&document.original_name)
            .bind(&document.file_path)
            .bind(document.doc_type.as_str())
            .bind(&document.mime_type)
            .bind(document.size)
            .bind(DocumentStatus::Pending.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        record.to_domain()
    }

    async fn get_document_by_id(&self, session_id: Uuid, document_id: Uuid) -> PortResult<Document> {
        let sql = format!(
            "SELECT {} FROM documents WHERE id = $1 AND session_id = $2",
            DOCUMENT_COLUMNS
        );
        let record = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(document_id)
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, "Document", document_id))?;
        record.to_domain()
    }

    async fn list_documents(&self, session_id: Uuid) -> PortResult<Vec<Document>> {
        let sql = format!(
            "SELECT {} FROM documents WHERE session_id = $1 ORDER BY uploaded_at DESC",
            DOCUMENT_COLUMNS
        );
        let records = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_documents_by_status(
        &self,
        session_id: Uuid,
        status: DocumentStatus,
    ) -> PortResult<Vec<Document>> {
        let sql = format!(
            "SELECT {} FROM documents WHERE session_id = $1 AND status = $2 ORDER BY uploaded_at ASC",
            DOCUMENT_COLUMNS
        );
        let records = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(session_id)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn update_document_status(
        &self,
        document_id: Uuid,
        status: DocumentStatus,
    ) -> PortResult<()> {
        let result = sqlx::query("UPDATE documents SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Document {} not found", document_id)));
        }
        Ok(())
    }

    async fn save_extraction(
        &self,
        document_id: Uuid,
        session_id: Uuid,
        questions: &[NewQuestion],
        extracted_text: &str,
        processed_at: DateTime<Utc>,
    ) -> PortResult<u64> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        for question in questions {
            sqlx::query(
                "INSERT INTO questions (id, session_id, text, answer, marks, question_type, difficulty, topic, source_doc_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(Uuid::new_v4())
            .bind(session_id)
            .bind(&question.text)
            .bind(&question.answer)
            .bind(marks_to_column(question.marks))
            .bind(question.question_type.as_str())
            .bind(question.difficulty.as_str())
            .bind(&question.topic)
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        }

        let result = sqlx::query(
            "UPDATE documents SET status = $1, extracted_text = $2, \
             processed_at = $3, error_message = NULL WHERE id = $4",
        )
        .bind(DocumentStatus::Completed.as_str())
        .bind(extracted_text)
        .bind(processed_at)
        .bind(document_id)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Document {} not found", document_id)));
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(questions.len() as u64)
    }

    async fn fail_document(&self, document_id: Uuid, error_message: &str) -> PortResult<()> {
        sqlx::query("UPDATE documents SET status = $1, error_message = $2 WHERE id = $3")
            .bind(DocumentStatus::Failed.as_str())
            .bind(error_message)
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn reset_document(&self, session_id: Uuid, document_id: Uuid) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let result = sqlx::query(
            "UPDATE documents SET status = $1, extracted_text = NULL, error_message = NULL, \
             processed_at = NULL WHERE id = $2 AND session_id = $3",
        )
        .bind(DocumentStatus::Pending.as_str())
        .bind(document_id)
        .bind(session_id)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Document {} not found", document_id)));
        }

        sqlx::query("DELETE FROM questions WHERE source_doc_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn delete_document(&self, session_id: Uuid, document_id: Uuid) -> PortResult<Document> {
        let sql = format!(
            "DELETE FROM documents WHERE id = $1 AND session_id = $2 RETURNING {}",
            DOCUMENT_COLUMNS
        );
        let record = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(document_id)
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, "Document", document_id))?;
        record.to_domain()
    }

    // --- Questions ---

    async fn list_questions(
        &self,
        session_id: Uuid,
        filter: &QuestionFilter,
    ) -> PortResult<Vec<Question>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM questions WHERE session_id = ", QUESTION_COLUMNS));
        qb.push_bind(session_id);
        push_question_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC");

        let records = qb
            .build_query_as::<QuestionRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_question(&self, session_id: Uuid, question_id: Uuid) -> PortResult<Question> {
        let sql = format!(
            "SELECT {} FROM questions WHERE id = $1 AND session_id = $2",
            QUESTION_COLUMNS
        );
        let record = sqlx::query_as::<_, QuestionRecord>(&sql)
            .bind(question_id)
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, "Question", question_id))?;
        record.to_domain()
    }

    async fn create_question(&self, session_id: Uuid, question: NewQuestion) -> PortResult<Question> {
        let sql = format!(
            "INSERT INTO questions (id, session_id, text, answer, marks, question_type, difficulty, topic, source_doc_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            QUESTION_COLUMNS
        );
        let record = sqlx::query_as::<_, QuestionRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(session_id)
            .bind(question.text)
            .bind(question.answer)
            .bind(marks_to_column(question.marks))
            .bind(question.question_type.as_str())
            .bind(question.difficulty.as_str())
            .bind(question.topic)
            .bind(question.source_doc_id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        record.to_domain()
    }

    async fn update_question(
        &self,
        session_id: Uuid,
        question_id: Uuid,
        patch: &QuestionPatch,
    ) -> PortResult<Question> {
        let sql = format!(
            "UPDATE questions SET text = COALESCE($3, text), answer = COALESCE($4, answer), \
             marks = COALESCE($5, marks), question_type = COALESCE($6, question_type), \
             difficulty = COALESCE($7, difficulty), topic = COALESCE($8, topic) \
             WHERE id = $1 AND session_id = $2 RETURNING {}",
            QUESTION_COLUMNS
        );
        let record = sqlx::query_as::<_, QuestionRecord>(&sql)
            .bind(question_id)
            .bind(session_id)
            .bind(patch.text.as_deref().map(str::trim))
            .bind(patch.answer.as_deref())
            .bind(marks_to_column(patch.marks))
            .bind(patch.question_type.map(|t| t.as_str()))
            .bind(patch.difficulty.map(|d| d.as_str()))
            .bind(patch.topic.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, "Question", question_id))?;
        record.to_domain()
    }

    async fn delete_questions(&self, session_id: Uuid, question_ids: &[Uuid]) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM questions WHERE session_id = $1 AND id = ANY($2)")
            .bind(session_id)
            .bind(question_ids)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    // --- Prep packs ---

    async fn save_prep_pack(&self, pack: &PrepPack) -> PortResult<()> {
        let total_marks =
            i32::try_from(pack.total_marks).map_err(|e| PortError::Invalid(e.to_string()))?;
        sqlx::query(
            "INSERT INTO prep_packs (id, session_id, title, subject, description, content, config, total_marks, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(pack.id)
        .bind(pack.session_id)
        .bind(&pack.title)
        .bind(&pack.subject)
        .bind(&pack.description)
        .bind(Json(&pack.content))
        .bind(Json(&pack.config))
        .bind(total_marks)
        .bind(pack.status.as_str())
        .bind(pack.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_prep_pack(&self, session_id: Uuid, pack_id: Uuid) -> PortResult<PrepPack> {
        let sql = format!(
            "SELECT {} FROM prep_packs WHERE id = $1 AND session_id = $2",
            PREP_PACK_COLUMNS
        );
        let record = sqlx::query_as::<_, PrepPackRecord>(&sql)
            .bind(pack_id)
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, "Prep pack", pack_id))?;
        record.to_domain()
    }

    async fn list_prep_packs(&self, session_id: Uuid) -> PortResult<Vec<PrepPack>> {
        let sql = format!(
            "SELECT {} FROM prep_packs WHERE session_id = $1 ORDER BY created_at DESC",
            PREP_PACK_COLUMNS
        );
        let records = sqlx::query_as::<_, PrepPackRecord>(&sql)
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn update_prep_pack_status(
        &self,
        session_id: Uuid,
        pack_id: Uuid,
        status: PrepPackStatus,
    ) -> PortResult<()> {
        let result = sqlx::query("UPDATE prep_packs SET status = $1 WHERE id = $2 AND session_id = $3")
            .bind(status.as_str())
            .bind(pack_id)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Prep pack {} not found", pack_id)));
        }
        Ok(())
    }

    async fn delete_prep_pack(&self, session_id: Uuid, pack_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM prep_packs WHERE id = $1 AND session_id = $2")
            .bind(pack_id)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Prep pack {} not found", pack_id)));
        }
        Ok(())
    }

    // --- Study plans ---

    async fn save_study_plan(&self, plan: &StudyPlan) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO study_plans (id, session_id, title, subject, exam_date, daily_hours, schedule, topics, progress, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(plan.id)
        .bind(plan.session_id)
        .bind(&plan.title)
        .bind(&plan.subject)
        .bind(plan.exam_date)
        .bind(plan.daily_hours)
        .bind(Json(&plan.schedule))
        .bind(Json(&plan.topics))
        .bind(plan.progress)
        .bind(plan.status.as_str())
        .bind(plan.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_study_plan(&self, session_id: Uuid, plan_id: Uuid) -> PortResult<StudyPlan> {
        let sql = format!(
            "SELECT {} FROM study_plans WHERE id = $1 AND session_id = $2",
            STUDY_PLAN_COLUMNS
        );
        let record = sqlx::query_as::<_, StudyPlanRecord>(&sql)
            .bind(plan_id)
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, "Study plan", plan_id))?;
        record.to_domain()
    }

    async fn list_study_plans(&self, session_id: Uuid) -> PortResult<Vec<StudyPlan>> {
        let sql = format!(
            "SELECT {} FROM study_plans WHERE session_id = $1 ORDER BY created_at DESC",
            STUDY_PLAN_COLUMNS
        );
        let records = sqlx::query_as::<_, StudyPlanRecord>(&sql)
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn update_study_plan_progress(
        &self,
        plan_id: Uuid,
        schedule: &[ScheduleItem],
        progress: f64,
        status: PlanStatus,
    ) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE study_plans SET schedule = $1, progress = $2, status = $3 WHERE id = $4",
        )
        .bind(Json(schedule))
        .bind(progress)
        .bind(status.as_str())
        .bind(plan_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Study plan {} not found", plan_id)));
        }
        Ok(())
    }

    async fn delete_study_plan(&self, session_id: Uuid, plan_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM study_plans WHERE id = $1 AND session_id = $2")
            .bind(plan_id)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Study plan {} not found", plan_id)));
        }
        Ok(())
    }

    // --- Focus sessions ---

    async fn save_focus_session(&self, focus: &FocusSession) -> PortResult<()> {
        let target_seconds =
            i32::try_from(focus.target_seconds).map_err(|e| PortError::Invalid(e.to_string()))?;
        sqlx::query(
            "INSERT INTO focus_sessions (id, session_id, kind, target_seconds, duration_seconds, start_time, \
             end_time, completed, task_name, notes) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(focus.id)
        .bind(focus.session_id)
        .bind(focus.kind.as_str())
        .bind(target_seconds)
        .bind(focus.duration_seconds)
        .bind(focus.start_time)
        .bind(focus.end_time)
        .bind(focus.completed)
        .bind(&focus.task_name)
        .bind(&focus.notes)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_focus_session(&self, session_id: Uuid, focus_id: Uuid) -> PortResult<FocusSession> {
        let sql = format!(
            "SELECT {} FROM focus_sessions WHERE id = $1 AND session_id = $2",
            FOCUS_COLUMNS
        );
        let record = sqlx::query_as::<_, FocusSessionRecord>(&sql)
            .bind(focus_id)
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, "Focus session", focus_id))?;
        record.to_domain()
    }

    async fn list_focus_sessions(
        &self,
        session_id: Uuid,
        limit: Option<u32>,
    ) -> PortResult<Vec<FocusSession>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM focus_sessions WHERE session_id = ",
            FOCUS_COLUMNS
        ));
        qb.push_bind(session_id);
        qb.push(" ORDER BY start_time DESC");
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }

        let records = qb
            .build_query_as::<FocusSessionRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn end_focus_session(
        &self,
        session_id: Uuid,
        focus_id: Uuid,
        outcome: &FocusOutcome,
    ) -> PortResult<FocusSession> {
        let sql = format!(
            "UPDATE focus_sessions SET end_time = $3, duration_seconds = $4, completed = $5, notes = $6 \
             WHERE id = $1 AND session_id = $2 RETURNING {}",
            FOCUS_COLUMNS
        );
        let record = sqlx::query_as::<_, FocusSessionRecord>(&sql)
            .bind(focus_id)
            .bind(session_id)
            .bind(outcome.end_time)
            .bind(outcome.duration_seconds)
            .bind(outcome.completed)
            .bind(&outcome.notes)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, "Focus session", focus_id))?;
        record.to_domain()
    }
}
