//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from repositories and the belief grid so clients can
//! bubble them up with consistent context.
use scout_core::{CoreError, ErrorSeverity, GridError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("belief update rejected: {0}")]
    Grid(#[from] GridError),
}

impl RuntimeError {
    /// Severity as seen by the caller; grid errors keep their own.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Repository(_) => ErrorSeverity::Internal,
            RuntimeError::Grid(error) => error.severity(),
        }
    }
}
