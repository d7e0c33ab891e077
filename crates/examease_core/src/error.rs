//! crates/examease_core/src/error.rs
//!
//! Errors returned by the core services. Every variant is an ordinary value a
//! caller can render; none of them represent a crash.

use crate::ports::PortError;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No questions available. Upload and process documents first.")]
    NoQuestions,

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Port(PortError),
}

impl From<PortError> for ServiceError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => Self::NotFound(what),
            other => Self::Port(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
