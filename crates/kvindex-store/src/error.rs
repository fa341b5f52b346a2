//! Error types for the storage layer.

use thiserror::Error;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
///
/// A missing entry is never an error: reads return `None` and removals
/// against absent entries succeed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A table name or hash value cannot be encoded as an entry key.
    #[error("invalid entry key: {0}")]
    InvalidKey(String),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}
