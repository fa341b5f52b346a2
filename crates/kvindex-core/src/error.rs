//! Common error types for kvindex.
//!
//! This module provides shared error types that are used across multiple crates.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur throughout kvindex.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An attribute assignment could not be parsed (expected `name=value`).
    #[error("malformed attribute assignment: {0:?}")]
    MalformedAttribute(String),
}
