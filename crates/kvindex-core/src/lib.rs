//! Core types and utilities for kvindex.
//!
//! This crate provides the foundational types shared by the store and the
//! index maintenance layer:
//!
//! - **Identifiers**: `RecordId`, the primary key of a source record
//! - **Values**: `Value`, a single schemaless attribute value
//! - **Attributes**: `Attributes` and `ChangeSet`, a record's current state and its pending changes
//! - **Error types**: Common error definitions shared across crates
//!
//! # Example
//!
//! ```
//! use kvindex_core::{Attributes, ChangeSet, RecordId, Value};
//!
//! let id: RecordId = "test123".parse().unwrap();
//!
//! let mut attrs = Attributes::new();
//! attrs.insert("name", Value::from("Justin"));
//!
//! let mut changes = ChangeSet::new();
//! changes.record("name", Some(Value::from("Josh")), Some(Value::from("Justin")));
//!
//! // The state the record had before the change.
//! let before = attrs.overlay(&changes);
//! assert_eq!(before.get("name"), Some(&Value::from("Josh")));
//! # let _ = id;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod attributes;
pub mod error;
pub mod ids;
pub mod value;

pub use attributes::{Attributes, Change, ChangeSet};
pub use error::{CoreError, Result};
pub use ids::{IdError, RecordId};
pub use value::Value;
