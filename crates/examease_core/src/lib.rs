pub mod classify;
pub mod domain;
pub mod error;
pub mod extract;
pub mod focus;
pub mod normalize;
pub mod pipeline;
pub mod planner;
pub mod ports;
pub mod prep_pack;
pub mod questions;
pub mod sections;
pub mod segment;
pub mod topic;
pub mod validation;

pub use domain::{
    Difficulty, Document, DocumentStatus, DocumentType, NewDocument, NewQuestion, PrepPack,
    PrepPackStatus, Question, QuestionFilter, QuestionPatch, QuestionType, ScheduleItem, StudyPlan,
};
pub use error::{ServiceError, ServiceResult};
pub use extract::ExtractorRegistry;
pub use focus::FocusService;
pub use pipeline::{DocumentProcessor, ProcessReport};
pub use planner::StudyPlanService;
pub use ports::{DatabaseService, FileStore, PortError, PortResult, TextExtractor};
pub use prep_pack::PrepPackService;
pub use questions::QuestionBankService;
pub use validation::ValidationError;
