//! Storage error types.

use thiserror::Error;

/// Storage-specific errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A graph file could not be read.
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// A graph document is not a JSON object of title to link list.
    #[error("invalid graph document {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Invalid input error.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
