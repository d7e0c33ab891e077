//! crates/examease_core/src/questions.rs
//!
//! Browsing and hand-editing of the session's question bank.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Question, QuestionFilter, QuestionPatch};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{DatabaseService, PortError};
use crate::validation::{validate_question_patch, CreateQuestionInput, ValidationError};

#[derive(Clone)]
pub struct QuestionBankService {
    db: Arc<dyn DatabaseService>,
}

fn question_not_found(e: PortError) -> ServiceError {
    match e {
        PortError::NotFound(_) => ServiceError::NotFound("Question not found".to_string()),
        other => other.into(),
    }
}

impl QuestionBankService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn list(&self, session_id: Uuid, filter: &QuestionFilter) -> ServiceResult<Vec<Question>> {
        Ok(self.db.list_questions(session_id, filter).await?)
    }

    pub async fn get(&self, session_id: Uuid, question_id: Uuid) -> ServiceResult<Question> {
        self.db
            .get_question(session_id, question_id)
            .await
            .map_err(question_not_found)
    }

    /// Adds a manually entered question after validating it. A source
    /// document must belong to the same session.
    pub async fn create(&self, session_id: Uuid, input: CreateQuestionInput) -> ServiceResult<Question> {
        let question = input.validate()?;
        if let Some(document_id) = question.source_doc_id {
            self.db
                .get_document_by_id(session_id, document_id)
                .await
                .map_err(|e| match e {
                    PortError::NotFound(_) => {
                        ServiceError::NotFound("Source document not found".to_string())
                    }
                    other => other.into(),
                })?;
        }
        let stored = self.db.create_question(session_id, question).await?;
        info!(question_id = %stored.id, "Question added manually");
        Ok(stored)
    }

    pub async fn update(
        &self,
        session_id: Uuid,
        question_id: Uuid,
        patch: QuestionPatch,
    ) -> ServiceResult<Question> {
        validate_question_patch(&patch)?;
        self.db
            .update_question(session_id, question_id, &patch)
            .await
            .map_err(question_not_found)
    }

    pub async fn delete(&self, session_id: Uuid, question_id: Uuid) -> ServiceResult<()> {
        let deleted = self.db.delete_questions(session_id, &[question_id]).await?;
        if deleted == 0 {
            return Err(ServiceError::NotFound("Question not found".to_string()));
        }
        Ok(())
    }

    /// Deletes every listed question owned by the session and returns how
    /// many were removed. Ids from other sessions are ignored.
    pub async fn bulk_delete(&self, session_id: Uuid, question_ids: &[Uuid]) -> ServiceResult<u64> {
        if question_ids.is_empty() {
            return Err(ValidationError::new("ids", "at least one question id is required").into());
        }
        let deleted = self.db.delete_questions(session_id, question_ids).await?;
        info!(%session_id, deleted, "Questions deleted");
        Ok(deleted)
    }
}
