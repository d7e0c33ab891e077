mod common;

use common::{upload, MemoryDb, MemoryFiles};
use examease_core::domain::{Difficulty, DocumentStatus, DocumentType, QuestionType};
use examease_core::error::ServiceError;
use examease_core::extract::ExtractorRegistry;
use examease_core::pipeline::DocumentProcessor;
use examease_core::ports::DatabaseService;
use examease_core::questions::QuestionBankService;
use examease_core::validation::CreateQuestionInput;
use std::sync::Arc;
use uuid::Uuid;

const EXAM_PAPER: &str = "1. What is a stack? [2 marks]\r\n2. Explain quicksort. [10 marks]";

fn processor(db: &Arc<MemoryDb>, files: &Arc<MemoryFiles>) -> DocumentProcessor {
    DocumentProcessor::new(db.clone(), files.clone(), ExtractorRegistry::with_builtins())
}

#[tokio::test]
async fn text_upload_is_segmented_and_stored() {
    let (db, files) = (MemoryDb::new(), MemoryFiles::new());
    let session = Uuid::new_v4();
    let doc = upload(&db, &files, session, "paper.txt", DocumentType::Txt, EXAM_PAPER.as_bytes()).await;

    let report = processor(&db, &files).process_document(session, doc.id).await;
    assert!(report.success, "{:?}", report.error);
    assert_eq!(report.questions_found, 2);
    assert!(report.preview.unwrap().starts_with("1. What is a stack?"));

    let stored = db.document(doc.id);
    assert_eq!(stored.status, DocumentStatus::Completed);
    assert_eq!(stored.question_count, 2);
    assert!(stored.processed_at.is_some());
    assert!(!stored.extracted_text.unwrap().contains('\r'));

    let questions = db.questions_for(doc.id);
    let stack = questions.iter().find(|q| q.text == "1. What is a stack?").unwrap();
    assert_eq!((stack.marks, stack.question_type, stack.difficulty), (Some(2), QuestionType::Short, Difficulty::Easy));
    let sort = questions.iter().find(|q| q.text == "2. Explain quicksort.").unwrap();
    assert_eq!((sort.marks, sort.question_type, sort.difficulty), (Some(10), QuestionType::Long, Difficulty::Hard));
    assert!(questions.iter().all(|q| q.session_id == session));
}

#[tokio::test]
async fn unknown_document_reports_failure_without_side_effects() {
    let (db, files) = (MemoryDb::new(), MemoryFiles::new());
    let report = processor(&db, &files)
        .process_document(Uuid::new_v4(), Uuid::new_v4())
        .await;
    assert!(!report.success);
    assert_eq!(report.error.as_deref(), Some("Document not found"));
    assert_eq!(db.question_count(), 0);
}

#[tokio::test]
async fn documents_are_scoped_to_their_session() {
    let (db, files) = (MemoryDb::new(), MemoryFiles::new());
    let owner = Uuid::new_v4();
    let doc = upload(&db, &files, owner, "paper.txt", DocumentType::Txt, EXAM_PAPER.as_bytes()).await;

    let report = processor(&db, &files).process_document(Uuid::new_v4(), doc.id).await;
    assert!(!report.success);
    assert_eq!(db.document(doc.id).status, DocumentStatus::Pending);
}

#[tokio::test]
async fn unsupported_format_marks_the_document_failed() {
    let (db, files) = (MemoryDb::new(), MemoryFiles::new());
    let session = Uuid::new_v4();
    let doc = upload(&db, &files, session, "slides.pptx", DocumentType::Pptx, b"PK\x03\x04").await;

    let report = processor(&db, &files).process_document(session, doc.id).await;
    assert!(!report.success);

    let stored = db.document(doc.id);
    assert_eq!(stored.status, DocumentStatus::Failed);
    assert!(stored.error_message.unwrap().contains("no text extractor"));
    assert!(db.questions_for(doc.id).is_empty());
}

#[tokio::test]
async fn failed_insert_leaves_no_questions() {
    let (db, files) = (MemoryDb::new(), MemoryFiles::new());
    let session = Uuid::new_v4();
    let doc = upload(&db, &files, session, "paper.txt", DocumentType::Txt, EXAM_PAPER.as_bytes()).await;
    *db.fail_saves.lock().unwrap() = Some("disk full".to_string());

    let report = processor(&db, &files).process_document(session, doc.id).await;
    assert!(!report.success);
    assert!(report.error.unwrap().contains("disk full"));
    assert_eq!(db.document(doc.id).status, DocumentStatus::Failed);
    assert_eq!(db.question_count(), 0);
}

#[tokio::test]
async fn images_complete_with_the_placeholder_and_no_questions() {
    let (db, files) = (MemoryDb::new(), MemoryFiles::new());
    let session = Uuid::new_v4();
    let doc = upload(&db, &files, session, "scan.png", DocumentType::Image, &[0x89, b'P', b'N', b'G']).await;

    let report = processor(&db, &files).process_document(session, doc.id).await;
    assert!(report.success);
    assert_eq!(report.questions_found, 0);
    assert_eq!(
        db.document(doc.id).extracted_text.as_deref(),
        Some(examease_core::extract::IMAGE_PLACEHOLDER)
    );
}

#[tokio::test]
async fn reprocessing_replaces_previous_questions() {
    let (db, files) = (MemoryDb::new(), MemoryFiles::new());
    let session = Uuid::new_v4();
    let doc = upload(&db, &files, session, "paper.txt", DocumentType::Txt, EXAM_PAPER.as_bytes()).await;
    let processor = processor(&db, &files);

    processor.process_document(session, doc.id).await;
    let report = processor.reprocess_document(session, doc.id).await;
    assert!(report.success);
    assert_eq!(db.questions_for(doc.id).len(), 2);
    assert_eq!(db.document(doc.id).status, DocumentStatus::Completed);
}

#[tokio::test]
async fn simultaneous_reprocess_calls_do_not_duplicate_questions() {
    let (db, files) = (MemoryDb::new(), MemoryFiles::new());
    let session = Uuid::new_v4();
    let doc = upload(&db, &files, session, "paper.txt", DocumentType::Txt, EXAM_PAPER.as_bytes()).await;
    let processor = processor(&db, &files);

    let (a, b) = tokio::join!(
        processor.reprocess_document(session, doc.id),
        processor.reprocess_document(session, doc.id)
    );
    assert!(a.success && b.success);
    assert_eq!(db.questions_for(doc.id).len(), 2);
}

#[tokio::test]
async fn batch_processes_only_pending_documents() {
    let (db, files) = (MemoryDb::new(), MemoryFiles::new());
    let session = Uuid::new_v4();
    let first = upload(&db, &files, session, "a.txt", DocumentType::Txt, EXAM_PAPER.as_bytes()).await;
    let second = upload(
        &db,
        &files,
        session,
        "b.txt",
        DocumentType::Txt,
        b"Q1. Define a binary search tree with an example.\nQ2) State the master theorem.",
    )
    .await;
    let broken = upload(&db, &files, session, "c.zip", DocumentType::Zip, b"PK").await;
    let processor = processor(&db, &files);
    processor.process_document(session, first.id).await;

    let reports = processor.process_all_pending(session).await.unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].document_id, second.id);
    assert!(reports[0].success);
    assert_eq!(reports[0].questions_found, 2);
    assert_eq!(reports[1].document_id, broken.id);
    assert!(!reports[1].success);

    assert!(processor.process_all_pending(session).await.unwrap().is_empty());
}

#[tokio::test]
async fn byte_order_mark_does_not_hide_the_first_question() {
    let (db, files) = (MemoryDb::new(), MemoryFiles::new());
    let session = Uuid::new_v4();
    let doc = upload(
        &db,
        &files,
        session,
        "bom.txt",
        DocumentType::Txt,
        b"\xEF\xBB\xBFQ1. Define an operating system kernel.\nQ2. Describe virtual memory paging.",
    )
    .await;

    let report = processor(&db, &files).process_document(session, doc.id).await;
    assert!(report.success, "{:?}", report.error);
    assert_eq!(report.questions_found, 2);

    let texts: Vec<String> = db.questions_for(doc.id).into_iter().map(|q| q.text).collect();
    assert!(texts.contains(&"Define an operating system kernel.".to_string()));
    assert!(!db.document(doc.id).extracted_text.unwrap().starts_with('\u{feff}'));
}

fn manual_question(source_doc_id: Uuid) -> CreateQuestionInput {
    CreateQuestionInput {
        text: "Compare paging with segmentation.".to_string(),
        answer: None,
        marks: Some(5),
        difficulty: None,
        question_type: None,
        topic: None,
        source_doc_id: Some(source_doc_id),
    }
}

#[tokio::test]
async fn question_counts_follow_deletes_and_manual_additions() {
    let (db, files) = (MemoryDb::new(), MemoryFiles::new());
    let session = Uuid::new_v4();
    let doc = upload(&db, &files, session, "paper.txt", DocumentType::Txt, EXAM_PAPER.as_bytes()).await;
    processor(&db, &files).process_document(session, doc.id).await;
    let bank = QuestionBankService::new(db.clone());

    let first = db.questions_for(doc.id)[0].id;
    bank.delete(session, first).await.unwrap();
    let listed = db.list_documents(session).await.unwrap();
    assert_eq!(listed[0].question_count, 1);

    bank.create(session, manual_question(doc.id)).await.unwrap();
    let fetched = db.get_document_by_id(session, doc.id).await.unwrap();
    assert_eq!(fetched.question_count, 2);
}

#[tokio::test]
async fn manual_questions_cannot_cite_another_sessions_document() {
    let (db, files) = (MemoryDb::new(), MemoryFiles::new());
    let owner = Uuid::new_v4();
    let doc = upload(&db, &files, owner, "paper.txt", DocumentType::Txt, EXAM_PAPER.as_bytes()).await;
    let bank = QuestionBankService::new(db.clone());

    let err = bank.create(Uuid::new_v4(), manual_question(doc.id)).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(msg) if msg.contains("Source document")));
    assert_eq!(db.question_count(), 0);
}
