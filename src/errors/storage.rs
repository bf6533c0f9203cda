use std::io::Error as IoError;

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Error type shared by both link store backends.
///
/// A duplicate code is not an error at this layer; backends report it
/// through `CreateOutcome::Duplicate` so callers can retry with a new code.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    /// File I/O errors from the JSON store
    #[error("File store error: {0}")]
    Io(#[from] IoError),

    /// The JSON store could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Checks whether a sqlx error is a unique-constraint violation.
///
/// PostgreSQL reports these with SQLSTATE 23505.
pub fn is_unique_violation(err: &SqlxError) -> bool {
    match err {
        SqlxError::Database(db_err) => db_err
            .code()
            .map(|code| code.as_ref() == "23505")
            .unwrap_or(false),
        _ => false,
    }
}
