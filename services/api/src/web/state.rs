//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use examease_core::extract::ExtractorRegistry;
use examease_core::ports::{DatabaseService, FileStore};
use examease_core::{
    DocumentProcessor, FocusService, PrepPackService, QuestionBankService, StudyPlanService,
};
use std::sync::Arc;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub files: Arc<dyn FileStore>,
    pub processor: Arc<DocumentProcessor>,
    pub questions: QuestionBankService,
    pub prep_packs: PrepPackService,
    pub study_plans: StudyPlanService,
    pub focus: FocusService,
}

impl AppState {
    /// Wires the core services onto the given adapters.
    pub fn new(
        db: Arc<dyn DatabaseService>,
        files: Arc<dyn FileStore>,
        extractors: ExtractorRegistry,
        config: Arc<Config>,
    ) -> Self {
        Self {
            processor: Arc::new(DocumentProcessor::new(db.clone(), files.clone(), extractors)),
            questions: QuestionBankService::new(db.clone()),
            prep_packs: PrepPackService::new(db.clone()),
            study_plans: StudyPlanService::new(db.clone()),
            focus: FocusService::new(db.clone()),
            db,
            config,
            files,
        }
    }
}

/// The anonymous session a request acts for, resolved by `require_session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub Uuid);
