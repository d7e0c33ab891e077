//! crates/examease_core/src/pipeline.rs
//!
//! Drives one document from raw bytes to stored questions:
//! `pending -> processing -> completed | failed`.
//!
//! All segmentation and classification happens in memory; the questions and
//! the extracted text are written in a single `save_extraction` call, so a
//! failure at any earlier step leaves no questions behind for that run.

use chrono::Utc;
use futures::lock::Mutex as AsyncMutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::classify::{classify_difficulty, classify_type};
use crate::domain::{Document, DocumentStatus, NewQuestion, MAX_STORED_TEXT_CHARS};
use crate::error::ServiceResult;
use crate::extract::ExtractorRegistry;
use crate::normalize::normalize_text;
use crate::ports::{DatabaseService, FileStore, PortError, PortResult};
use crate::segment::segment_questions;
use crate::topic::detect_topic;

/// Characters of normalized text echoed back in a processing report.
pub const PREVIEW_CHARS: usize = 1000;

/// The outcome of processing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub document_id: Uuid,
    pub success: bool,
    pub questions_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessReport {
    fn completed(document_id: Uuid, questions_found: usize, preview: String) -> Self {
        Self {
            document_id,
            success: true,
            questions_found,
            preview: Some(preview),
            error: None,
        }
    }

    fn failed(document_id: Uuid, error: impl Into<String>) -> Self {
        Self {
            document_id,
            success: false,
            questions_found: 0,
            preview: None,
            error: Some(error.into()),
        }
    }
}

/// Returns at most `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Segments normalized text and labels every candidate with its type,
/// difficulty and preceding heading.
pub fn extract_questions(text: &str, source_doc_id: Option<Uuid>) -> Vec<NewQuestion> {
    segment_questions(text)
        .candidates
        .into_iter()
        .map(|candidate| NewQuestion {
            question_type: classify_type(&candidate.text, candidate.marks),
            difficulty: classify_difficulty(candidate.marks),
            topic: detect_topic(&candidate.text, text),
            text: candidate.text,
            answer: None,
            marks: candidate.marks,
            source_doc_id,
        })
        .collect()
}

type DocumentLock = Arc<AsyncMutex<()>>;

pub struct DocumentProcessor {
    db: Arc<dyn DatabaseService>,
    files: Arc<dyn FileStore>,
    extractors: ExtractorRegistry,
    locks: Mutex<HashMap<Uuid, DocumentLock>>,
}

impl DocumentProcessor {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        files: Arc<dyn FileStore>,
        extractors: ExtractorRegistry,
    ) -> Self {
        Self {
            db,
            files,
            extractors,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Extracts questions from one document. Failures are recorded on the
    /// document and reported, never returned as errors.
    pub async fn process_document(&self, session_id: Uuid, document_id: Uuid) -> ProcessReport {
        let lock = self.lock_for(document_id);
        let report = {
            let _guard = lock.lock().await;
            self.run(session_id, document_id).await
        };
        self.release(document_id, lock);
        report
    }

    /// Drops the document's previous questions and text, resets it to
    /// `pending` and processes it again.
    pub async fn reprocess_document(&self, session_id: Uuid, document_id: Uuid) -> ProcessReport {
        let lock = self.lock_for(document_id);
        let report = {
            let _guard = lock.lock().await;
            match self.db.reset_document(session_id, document_id).await {
                Ok(()) => self.run(session_id, document_id).await,
                Err(PortError::NotFound(_)) => ProcessReport::failed(document_id, "Document not found"),
                Err(e) => ProcessReport::failed(document_id, e.to_string()),
            }
        };
        self.release(document_id, lock);
        report
    }

    /// Processes every pending document of the session, one after another.
    pub async fn process_all_pending(&self, session_id: Uuid) -> ServiceResult<Vec<ProcessReport>> {
        let pending = self
            .db
            .list_documents_by_status(session_id, DocumentStatus::Pending)
            .await?;
        info!(%session_id, count = pending.len(), "Processing pending documents");

        let mut reports = Vec::with_capacity(pending.len());
        for document in pending {
            reports.push(self.process_document(session_id, document.id).await);
        }
        Ok(reports)
    }

    async fn run(&self, session_id: Uuid, document_id: Uuid) -> ProcessReport {
        let document = match self.db.get_document_by_id(session_id, document_id).await {
            Ok(document) => document,
            Err(PortError::NotFound(_)) => {
                return ProcessReport::failed(document_id, "Document not found")
            }
            Err(e) => return ProcessReport::failed(document_id, e.to_string()),
        };

        match self.extract_and_store(&document).await {
            Ok((questions_found, preview)) => {
                info!(
                    document_id = %document.id,
                    questions_found,
                    "Document processed"
                );
                ProcessReport::completed(document.id, questions_found, preview)
            }
            Err(e) => {
                let message = e.to_string();
                error!(document_id = %document.id, "Document processing failed: {}", message);
                if let Err(store_err) = self.db.fail_document(document.id, &message).await {
                    error!(
                        document_id = %document.id,
                        "Could not record processing failure: {:?}",
                        store_err
                    );
                }
                ProcessReport::failed(document.id, message)
            }
        }
    }

    async fn extract_and_store(&self, document: &Document) -> PortResult<(usize, String)> {
        self.db
            .update_document_status(document.id, DocumentStatus::Processing)
            .await?;

        let data = self.files.read(&document.file_path).await?;
        let raw = self
            .extractors
            .extract_blocking(document.doc_type, data)
            .await?;
        let text = normalize_text(&raw);
        if text.is_empty() {
            warn!(document_id = %document.id, "No text extracted from document");
        }

        let questions = extract_questions(&text, Some(document.id));
        self.db
            .save_extraction(
                document.id,
                document.session_id,
                &questions,
                truncate_chars(&text, MAX_STORED_TEXT_CHARS),
                Utc::now(),
            )
            .await?;

        Ok((questions.len(), truncate_chars(&text, PREVIEW_CHARS).to_string()))
    }

    fn lock_for(&self, document_id: Uuid) -> DocumentLock {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(document_id).or_default().clone()
    }

    /// Forgets the document's lock once no other caller is holding or awaiting it.
    fn release(&self, document_id: Uuid, lock: DocumentLock) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        // One reference in the map, one in `lock`.
        if Arc::strong_count(&lock) <= 2 {
            locks.remove(&document_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Difficulty, QuestionType};

    #[test]
    fn golden_extraction_from_marks_annotations() {
        let text = normalize_text("1. What is a stack? [2 marks]\n2. Explain quicksort. [10 marks]");
        let questions = extract_questions(&text, None);
        assert_eq!(questions.len(), 2);

        assert_eq!(questions[0].text, "1. What is a stack?");
        assert_eq!(questions[0].marks, Some(2));
        assert_eq!(questions[0].question_type, QuestionType::Short);
        assert_eq!(questions[0].difficulty, Difficulty::Easy);

        assert_eq!(questions[1].text, "2. Explain quicksort.");
        assert_eq!(questions[1].marks, Some(10));
        assert_eq!(questions[1].question_type, QuestionType::Long);
        assert_eq!(questions[1].difficulty, Difficulty::Hard);
    }

    #[test]
    fn extracted_questions_carry_their_heading() {
        let text = "Unit 2: Sorting\nExplain merge sort with an example. [5 marks]\n\
                    Chapter 3 - Hashing\nWhich of the following resolves collisions? (1M)";
        let questions = extract_questions(text, None);
        assert_eq!(questions[0].topic.as_deref(), Some("Sorting"));
        assert_eq!(questions[1].question_type, QuestionType::Mcq);
        // First heading in the window wins.
        assert_eq!(questions[1].topic.as_deref(), Some("Sorting"));
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
