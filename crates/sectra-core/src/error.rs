//! Error types for sectra.

use thiserror::Error;

use crate::models::JobStatus;

/// Result type alias using sectra's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sectra operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad submission input, rejected before a job record exists.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Document extraction failed. Fatal to the owning job.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Text generation failed. Always recoverable via fallback content,
    /// never surfaced as a job failure.
    #[error("Generation error: {0}")]
    Generation(String),

    /// Text generation exceeded its timeout. Recoverable via fallback.
    #[error("Generation timed out after {0}s")]
    GenerationTimeout(u64),

    /// Attempted a state transition not permitted by the job state machine.
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: JobStatus, to: JobStatus },

    /// Unknown job id.
    #[error("Job not found: {0}")]
    JobNotFound(uuid::Uuid),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation not valid for the job's current state (e.g. cancel on a
    /// terminal job).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Blob/file storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// File I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error is absorbed by fallback content rather than
    /// failing the owning job.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Generation(_) | Error::GenerationTimeout(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
