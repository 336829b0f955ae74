//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from stores and services so transport adapters can map
//! every error to one wire-level code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("missing or unknown participant credential")]
    Unauthorized,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    /// The versioned state write kept losing to concurrent writers.
    /// Safe to retry: an attempt only counts once its write commits.
    #[error("artifact state contention persisted after {retries} retries")]
    Contention { retries: u32 },

    #[error("runtime requires a {0} collaborator before building")]
    MissingCollaborator(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RuntimeError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        RuntimeError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Wire-level code for the API envelope.
    pub fn code(&self) -> ErrorCode {
        match self {
            RuntimeError::InvalidId(_) => ErrorCode::InvalidId,
            RuntimeError::Unauthorized => ErrorCode::Unauthorized,
            RuntimeError::NotFound { .. } => ErrorCode::NotFound,
            RuntimeError::Validation(_) => ErrorCode::ValidationError,
            RuntimeError::Contention { .. }
            | RuntimeError::MissingCollaborator(_)
            | RuntimeError::Store(_) => ErrorCode::ServerError,
        }
    }
}

/// Wire-level error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidId,
    Unauthorized,
    NotFound,
    ValidationError,
    ServerError,
}

/// JSON error envelope returned by transport adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&RuntimeError> for ErrorEnvelope {
    fn from(err: &RuntimeError) -> Self {
        Self {
            error: ErrorBody {
                code: err.code(),
                message: err.to_string(),
            },
        }
    }
}
