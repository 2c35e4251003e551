//! Metadata store error types

use thiserror::Error;

/// Errors from the file-record metadata store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate file id: {0}")]
    DuplicateId(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
