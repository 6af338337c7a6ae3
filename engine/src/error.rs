//! Error types for the todosync engine.

use crate::RecordKey;
use thiserror::Error;

/// All possible errors from the record store and reconciler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Input errors
    #[error("invalid record: {0}")]
    Validation(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Store errors
    #[error("record already exists: {0}")]
    ConstraintViolation(RecordKey),

    #[error("record not found: {0}")]
    NotFound(RecordKey),

    // Collaborator errors
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),
}

impl Error {
    /// Whether the failure came from a collaborator rather than the input.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Error::StorageUnavailable(_) | Error::NetworkUnavailable(_)
        )
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
