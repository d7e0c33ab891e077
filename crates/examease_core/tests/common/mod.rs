//! In-memory port implementations shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use examease_core::domain::{
    Document, DocumentStatus, DocumentType, FocusOutcome, FocusSession, NewDocument, NewQuestion,
    PlanStatus, PrepPack, PrepPackStatus, Question, QuestionFilter, QuestionPatch, ScheduleItem,
    StudyPlan,
};
use examease_core::ports::{DatabaseService, FileStore, PortError, PortResult};

#[derive(Default)]
struct State {
    sessions: Vec<Uuid>,
    documents: Vec<Document>,
    questions: Vec<Question>,
    packs: Vec<PrepPack>,
    plans: Vec<StudyPlan>,
    focus: Vec<FocusSession>,
}

#[derive(Default)]
pub struct MemoryDb {
    state: Mutex<State>,
    /// When set, `save_extraction` fails with this message.
    pub fail_saves: Mutex<Option<String>>,
}

/// A copy of the document with its live question count.
fn counted(state: &State, doc: &Document) -> Document {
    let mut doc = doc.clone();
    doc.question_count = state
        .questions
        .iter()
        .filter(|q| q.source_doc_id == Some(doc.id))
        .count() as i64;
    doc
}

fn not_found(what: &str, id: Uuid) -> PortError {
    PortError::NotFound(format!("{} {} not found", what, id))
}

impl MemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn document(&self, id: Uuid) -> Document {
        let state = self.state.lock().unwrap();
        let doc = state.documents.iter().find(|d| d.id == id).unwrap();
        counted(&state, doc)
    }

    pub fn questions_for(&self, document_id: Uuid) -> Vec<Question> {
        let state = self.state.lock().unwrap();
        state
            .questions
            .iter()
            .filter(|q| q.source_doc_id == Some(document_id))
            .cloned()
            .collect()
    }

    pub fn question_count(&self) -> usize {
        self.state.lock().unwrap().questions.len()
    }

    pub fn insert_question(&self, session_id: Uuid, question: NewQuestion) -> Uuid {
        let stored = to_question(session_id, question);
        let id = stored.id;
        self.state.lock().unwrap().questions.push(stored);
        id
    }
}

fn to_question(session_id: Uuid, q: NewQuestion) -> Question {
    Question {
        id: Uuid::new_v4(),
        session_id,
        text: q.text,
        answer: q.answer,
        marks: q.marks,
        question_type: q.question_type,
        difficulty: q.difficulty,
        topic: q.topic,
        source_doc_id: q.source_doc_id,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn get_or_create_session(&self, session_id: Uuid) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.sessions.contains(&session_id) {
            state.sessions.push(session_id);
        }
        Ok(())
    }

    async fn create_document(&self, document: NewDocument) -> PortResult<Document> {
        let stored = Document {
            id: Uuid::new_v4(),
            session_id: document.session_id,
            filename: document.filename,
            original_name: document.original_name,
            file_path: document.file_path,
            doc_type: document.doc_type,
            mime_type: document.mime_type,
            size: document.size,
            status: DocumentStatus::Pending,
            extracted_text: None,
            error_message: None,
            question_count: 0,
            uploaded_at: Utc::now(),
            processed_at: None,
        };
        self.state.lock().unwrap().documents.push(stored.clone());
        Ok(stored)
    }

    async fn get_document_by_id(&self, session_id: Uuid, document_id: Uuid) -> PortResult<Document> {
        let state = self.state.lock().unwrap();
        state
            .documents
            .iter()
            .find(|d| d.id == document_id && d.session_id == session_id)
            .map(|d| counted(&state, d))
            .ok_or_else(|| not_found("Document", document_id))
    }

    async fn list_documents(&self, session_id: Uuid) -> PortResult<Vec<Document>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .documents
            .iter()
            .filter(|d| d.session_id == session_id)
            .map(|d| counted(&state, d))
            .collect())
    }

    async fn list_documents_by_status(
        &self,
        session_id: Uuid,
        status: DocumentStatus,
    ) -> PortResult<Vec<Document>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .documents
            .iter()
            .filter(|d| d.session_id == session_id && d.status == status)
            .cloned()
            .collect())
    }

    async fn update_document_status(&self, document_id: Uuid, status: DocumentStatus) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        let doc = state
            .documents
            .iter_mut()
            .find(|d| d.id == document_id)
            .ok_or_else(|| not_found("Document", document_id))?;
        doc.status = status;
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
        if let Some(message) = self.fail_saves.lock().unwrap().clone() {
            return Err(PortError::Unexpected(message));
        }
        let mut state = self.state.lock().unwrap();
        let stored: Vec<Question> = questions
            .iter()
            .cloned()
            .map(|q| to_question(session_id, q))
            .collect();
        state.questions.extend(stored);

        let doc = state
            .documents
            .iter_mut()
            .find(|d| d.id == document_id)
            .ok_or_else(|| not_found("Document", document_id))?;
        doc.status = DocumentStatus::Completed;
        doc.extracted_text = Some(extracted_text.to_string());
        doc.processed_at = Some(processed_at);
        doc.error_message = None;
        Ok(questions.len() as u64)
    }

    async fn fail_document(&self, document_id: Uuid, error_message: &str) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        let doc = state
            .documents
            .iter_mut()
            .find(|d| d.id == document_id)
            .ok_or_else(|| not_found("Document", document_id))?;
        doc.status = DocumentStatus::Failed;
        doc.error_message = Some(error_message.to_string());
        Ok(())
    }

    async fn reset_document(&self, session_id: Uuid, document_id: Uuid) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state
            .documents
            .iter()
            .any(|d| d.id == document_id && d.session_id == session_id)
        {
            return Err(not_found("Document", document_id));
        }
        state.questions.retain(|q| q.source_doc_id != Some(document_id));
        let doc = state
            .documents
            .iter_mut()
            .find(|d| d.id == document_id)
            .ok_or_else(|| not_found("Document", document_id))?;
        doc.status = DocumentStatus::Pending;
        doc.extracted_text = None;
        doc.error_message = None;
        doc.processed_at = None;
        Ok(())
    }

    async fn delete_document(&self, session_id: Uuid, document_id: Uuid) -> PortResult<Document> {
        let mut state = self.state.lock().unwrap();
        let idx = state
            .documents
            .iter()
            .position(|d| d.id == document_id && d.session_id == session_id)
            .ok_or_else(|| not_found("Document", document_id))?;
        state.questions.retain(|q| q.source_doc_id != Some(document_id));
        Ok(state.documents.remove(idx))
    }

    async fn list_questions(&self, session_id: Uuid, filter: &QuestionFilter) -> PortResult<Vec<Question>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .questions
            .iter()
            .filter(|q| q.session_id == session_id && filter.matches(q))
            .cloned()
            .collect())
    }

    async fn get_question(&self, session_id: Uuid, question_id: Uuid) -> PortResult<Question> {
        let state = self.state.lock().unwrap();
        state
            .questions
            .iter()
            .find(|q| q.id == question_id && q.session_id == session_id)
            .cloned()
            .ok_or_else(|| not_found("Question", question_id))
    }

    async fn create_question(&self, session_id: Uuid, question: NewQuestion) -> PortResult<Question> {
        let stored = to_question(session_id, question);
        self.state.lock().unwrap().questions.push(stored.clone());
        Ok(stored)
    }

    async fn update_question(
        &self,
        session_id: Uuid,
        question_id: Uuid,
        patch: &QuestionPatch,
    ) -> PortResult<Question> {
        let mut state = self.state.lock().unwrap();
        let q = state
            .questions
            .iter_mut()
            .find(|q| q.id == question_id && q.session_id == session_id)
            .ok_or_else(|| not_found("Question", question_id))?;
        if let Some(text) = &patch.text {
            q.text = text.clone();
        }
        if let Some(answer) = &patch.answer {
            q.answer = Some(answer.clone());
        }
        if let Some(marks) = patch.marks {
            q.marks = Some(marks);
        }
        if let Some(t) = patch.question_type {
            q.question_type = t;
        }
        if let Some(d) = patch.difficulty {
            q.difficulty = d;
        }
        if let Some(topic) = &patch.topic {
            q.topic = Some(topic.clone());
        }
        Ok(q.clone())
    }

    async fn delete_questions(&self, session_id: Uuid, question_ids: &[Uuid]) -> PortResult<u64> {
        let mut state = self.state.lock().unwrap();
        let before = state.questions.len();
        state
            .questions
            .retain(|q| !(q.session_id == session_id && question_ids.contains(&q.id)));
        Ok((before - state.questions.len()) as u64)
    }

    async fn save_prep_pack(&self, pack: &PrepPack) -> PortResult<()> {
        self.state.lock().unwrap().packs.push(pack.clone());
        Ok(())
    }

    async fn get_prep_pack(&self, session_id: Uuid, pack_id: Uuid) -> PortResult<PrepPack> {
        let state = self.state.lock().unwrap();
        state
            .packs
            .iter()
            .find(|p| p.id == pack_id && p.session_id == session_id)
            .cloned()
            .ok_or_else(|| not_found("Prep pack", pack_id))
    }

    async fn list_prep_packs(&self, session_id: Uuid) -> PortResult<Vec<PrepPack>> {
        let state = self.state.lock().unwrap();
        Ok(state.packs.iter().filter(|p| p.session_id == session_id).cloned().collect())
    }

    async fn update_prep_pack_status(
        &self,
        session_id: Uuid,
        pack_id: Uuid,
        status: PrepPackStatus,
    ) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        let pack = state
            .packs
            .iter_mut()
            .find(|p| p.id == pack_id && p.session_id == session_id)
            .ok_or_else(|| not_found("Prep pack", pack_id))?;
        pack.status = status;
        Ok(())
    }

    async fn delete_prep_pack(&self, session_id: Uuid, pack_id: Uuid) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.packs.len();
        state.packs.retain(|p| !(p.id == pack_id && p.session_id == session_id));
        if state.packs.len() == before {
            return Err(not_found("Prep pack", pack_id));
        }
        Ok(())
    }

    async fn save_study_plan(&self, plan: &StudyPlan) -> PortResult<()> {
        self.state.lock().unwrap().plans.push(plan.clone());
        Ok(())
    }

    async fn get_study_plan(&self, session_id: Uuid, plan_id: Uuid) -> PortResult<StudyPlan> {
        let state = self.state.lock().unwrap();
        state
            .plans
            .iter()
            .find(|p| p.id == plan_id && p.session_id == session_id)
            .cloned()
            .ok_or_else(|| not_found("Study plan", plan_id))
    }

    async fn list_study_plans(&self, session_id: Uuid) -> PortResult<Vec<StudyPlan>> {
        let state = self.state.lock().unwrap();
        Ok(state.plans.iter().filter(|p| p.session_id == session_id).cloned().collect())
    }

    async fn update_study_plan_progress(
        &self,
        plan_id: Uuid,
        schedule: &[ScheduleItem],
        progress: f64,
        status: PlanStatus,
    ) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        let plan = state
            .plans
            .iter_mut()
            .find(|p| p.id == plan_id)
            .ok_or_else(|| not_found("Study plan", plan_id))?;
        plan.schedule = schedule.to_vec();
        plan.progress = progress;
        plan.status = status;
        Ok(())
    }

    async fn delete_study_plan(&self, session_id: Uuid, plan_id: Uuid) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.plans.len();
        state.plans.retain(|p| !(p.id == plan_id && p.session_id == session_id));
        if state.plans.len() == before {
            return Err(not_found("Study plan", plan_id));
        }
        Ok(())
    }

    async fn save_focus_session(&self, focus: &FocusSession) -> PortResult<()> {
        self.state.lock().unwrap().focus.push(focus.clone());
        Ok(())
    }

    async fn get_focus_session(&self, session_id: Uuid, focus_id: Uuid) -> PortResult<FocusSession> {
        let state = self.state.lock().unwrap();
        state
            .focus
            .iter()
            .find(|f| f.id == focus_id && f.session_id == session_id)
            .cloned()
            .ok_or_else(|| not_found("Focus session", focus_id))
    }

    async fn list_focus_sessions(
        &self,
        session_id: Uuid,
        limit: Option<u32>,
    ) -> PortResult<Vec<FocusSession>> {
        let state = self.state.lock().unwrap();
        let mut found: Vec<FocusSession> = state
            .focus
            .iter()
            .filter(|f| f.session_id == session_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        if let Some(limit) = limit {
            found.truncate(limit as usize);
        }
        Ok(found)
    }

    async fn end_focus_session(
        &self,
        session_id: Uuid,
        focus_id: Uuid,
        outcome: &FocusOutcome,
    ) -> PortResult<FocusSession> {
        let mut state = self.state.lock().unwrap();
        let focus = state
            .focus
            .iter_mut()
            .find(|f| f.id == focus_id && f.session_id == session_id)
            .ok_or_else(|| not_found("Focus session", focus_id))?;
        focus.end_time = Some(outcome.end_time);
        focus.duration_seconds = outcome.duration_seconds;
        focus.completed = outcome.completed;
        focus.notes = outcome.notes.clone();
        Ok(focus.clone())
    }
}

#[derive(Default)]
pub struct MemoryFiles {
    files: Mutex<HashMap<String, Bytes>>,
}

impl MemoryFiles {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl FileStore for MemoryFiles {
    async fn save(&self, session_id: Uuid, filename: &str, data: &[u8]) -> PortResult<String> {
        let path = format!("{}/{}", session_id, filename);
        self.files
            .lock()
            .unwrap()
            .insert(path.clone(), Bytes::copy_from_slice(data));
        Ok(path)
    }

    async fn read(&self, path: &str) -> PortResult<Bytes> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("File {} not found", path)))
    }

    async fn remove(&self, path: &str) -> PortResult<()> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }
}

/// Stores `data` and registers it as a pending document of `doc_type`.
pub async fn upload(
    db: &MemoryDb,
    files: &MemoryFiles,
    session_id: Uuid,
    name: &str,
    doc_type: DocumentType,
    data: &[u8],
) -> Document {
    let path = files.save(session_id, name, data).await.unwrap();
    db.create_document(NewDocument {
        session_id,
        filename: name.to_string(),
        original_name: name.to_string(),
        file_path: path,
        doc_type,
        mime_type: "text/plain".to_string(),
        size: data.len() as i64,
    })
    .await
    .unwrap()
}
