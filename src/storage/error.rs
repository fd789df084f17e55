//! Error types for storage operations

use std::fmt;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations
#[derive(Debug)]
pub enum StorageError {
    /// Malformed key or sample, rejected synchronously
    Validation(String),

    /// The backend cannot be reached right now (transient)
    Unavailable(String),

    /// Backend-specific error
    Backend(String),

    /// I/O error (file access, etc.)
    Io(std::io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Validation(msg) => write!(f, "validation error: {}", msg),
            StorageError::Unavailable(msg) => {
                write!(f, "storage backend unavailable: {}", msg)
            }
            StorageError::Backend(msg) => write!(f, "storage backend error: {}", msg),
            StorageError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}
