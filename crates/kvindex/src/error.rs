//! Error types for index definition and maintenance.
//!
//! Definition errors (`InvalidField`, `EmptyKeys`, `InvalidRange`,
//! `DuplicateIndex`) signal a schema mistake and are raised when an index is
//! declared. Maintenance operations only fail when the store fails.

use thiserror::Error;

/// A result type using `IndexError`.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur when declaring or maintaining an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A key named for the index is not an attribute of the source type.
    #[error("{field:?} is not a field of {source_type}")]
    InvalidField {
        /// The unknown attribute name.
        field: String,
        /// The source record type.
        source_type: String,
    },

    /// The index was declared without any hash key.
    #[error("an index needs at least one hash key")]
    EmptyKeys,

    /// The range key configuration does not name exactly one attribute.
    #[error("invalid range key: {0}")]
    InvalidRange(String),

    /// An index over the same keys is already declared.
    #[error("index already declared: {0}")]
    DuplicateIndex(String),

    /// A lookup supplied a range value to a hash-only index, or omitted it for a ranged one.
    #[error("range value mismatch for index {table} (range key configured: {expected})")]
    RangeMismatch {
        /// The index table.
        table: String,
        /// Whether the index expects a range value.
        expected: bool,
    },

    /// The record has no identity to store in the index.
    #[error("record has no id")]
    MissingRecordId,

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] kvindex_store::StoreError),
}
