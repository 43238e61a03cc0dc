use bollytics_core::ValidationError;
use bollytics_db::DbError;
use thiserror::Error;

/// Failure of a read-side report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Query failure or deadline overrun. Never retried here.
    #[error("storage error: {0}")]
    Storage(#[from] DbError),
}

impl ReportError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReportError::Storage(DbError::Timeout(_)))
    }
}
