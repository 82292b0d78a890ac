//! Centralized error types for intake operations.

use thiserror::Error;

/// Main error type for intake operations.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    #[error("Invalid timestamp in storage: {0}")]
    InvalidTimestamp(String),

    #[error("Database error: {0}")]
    Database(#[from] intake_db::DbError),
}

/// Result type for intake operations.
pub type IntakeResult<T> = Result<T, IntakeError>;

impl IntakeError {
    /// Map a database not-found into the record-specific variant.
    pub(crate) fn from_db(err: intake_db::DbError, id: i64) -> Self {
        match err {
            intake_db::DbError::NotFound(_) => Self::RecordNotFound(id),
            e => Self::Database(e),
        }
    }
}
