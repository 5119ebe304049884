//! Error kinds shared across the engine
//!
//! Player-facing diagnostics (wrong output, diffs) are not errors; they live
//! in the comparator module. The types here cover pre-execution rejection and
//! persistence failures.

use thiserror::Error;

/// Submitted source rejected by the task's pre-check, before any execution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Persistence layer failure during a score or audit write.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Fatal pipeline error surfaced to the caller.
///
/// The score write and the audit append are independent; when both fail the
/// caller learns about each on its own rather than one masking the other.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to record score: {0}")]
    Score(StorageError),
    #[error("failed to append audit record: {0}")]
    Audit(StorageError),
    #[error("failed to record score ({score}) and audit record ({audit})")]
    ScoreAndAudit {
        score: StorageError,
        audit: StorageError,
    },
}
