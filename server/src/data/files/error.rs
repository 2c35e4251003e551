//! File lifecycle error types

use thiserror::Error;

use crate::data::sqlite::StoreError;

/// Errors from the low-level byte cache
#[derive(Error, Debug)]
pub enum FileCacheError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the high-level files service
#[derive(Error, Debug)]
pub enum FilesError {
    /// No unexpired record (or no bytes) for the id
    #[error("file `{0}` not found")]
    NotFound(String),

    #[error("invalid file purpose: {0}")]
    InvalidPurpose(String),

    /// Intentionally unsupported operation
    #[error("{0} is not supported")]
    NotImplemented(&'static str),

    #[error("metadata store error: {0}")]
    Store(#[from] StoreError),

    #[error("file cache error: {0}")]
    Cache(#[from] FileCacheError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = FilesError::NotFound("file-abc".to_string());
        assert_eq!(err.to_string(), "file `file-abc` not found");
    }

    #[test]
    fn test_cache_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: FilesError = FileCacheError::from(io_err).into();
        assert!(matches!(err, FilesError::Cache(_)));
    }
}
