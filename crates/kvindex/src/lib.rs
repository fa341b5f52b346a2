//! Derived secondary indexes over a key-value store.
//!
//! This crate keeps materialized index entries consistent with the records
//! they are derived from. An index maps the `.`-joined values of one or more
//! hash key attributes (optionally with a numeric range attribute) to the
//! set of IDs of the records currently holding those values.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │          Record layer (save / delete / destroy)        │
//! └───────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌───────────────────────────────────────────────────────┐
//! │                    IndexRegistry                       │
//! │  ┌─────────────────┐ ┌───────────┐ ┌───────────────┐  │
//! │  │ IndexDescriptor │ │  derive   │ │IndexMaintainer│  │
//! │  │ keys, table     │ │ locations │ │ remove → add  │  │
//! │  └─────────────────┘ └───────────┘ └───────────────┘  │
//! └───────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//!                 ┌─────────────────────┐
//!                 │ IndexStore          │
//!                 │ (RocksDB / memory)  │
//!                 └─────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use kvindex::{Document, IndexConfig, IndexOptions, IndexRegistry, RecordSchema};
//! use kvindex_core::RecordId;
//! use kvindex_store::MemoryStore;
//!
//! # fn main() -> Result<(), kvindex::IndexError> {
//! let schema = RecordSchema::new("User", ["name", "password", "created_at"]);
//! let mut users = IndexRegistry::new(schema, IndexConfig::new("app"), Arc::new(MemoryStore::new()));
//! users.declare(["name"], IndexOptions::new())?;
//!
//! let mut user = Document::new().with_id(RecordId::generate());
//! user.set("name", "Josh");
//! user.mark_persisted_with_changes();
//! users.save_all(&user)?;
//! user.clear_changes();
//!
//! let by_name = users.find_index(["name"]).unwrap();
//! assert_eq!(by_name.lookup("Josh", None)?.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Maintenance rules
//!
//! - A save or delete whose record has no pending change to any indexed
//!   attribute issues no store operation.
//! - A save removes the record's id from the bucket derived from the old
//!   attribute values, then adds it to the bucket derived from the current
//!   ones. It never issues both when the two are the same bucket.
//! - A record with none of its hash key attributes set is not indexed. For a
//!   ranged index, a record without its range attribute is not indexed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod derive;
pub mod descriptor;
pub mod error;
pub mod maintainer;
pub mod naming;
pub mod record;
pub mod registry;
pub mod schema;

#[cfg(test)]
mod testing;

pub use config::IndexConfig;
pub use derive::{derive_current_location, derive_provenance_location, IndexLocation, IndexValues};
pub use descriptor::{IndexDescriptor, IndexOptions};
pub use error::{IndexError, Result};
pub use maintainer::IndexMaintainer;
pub use record::{Document, IndexedRecord};
pub use registry::IndexRegistry;
pub use schema::RecordSchema;

// Re-export commonly used types from dependencies for convenience
pub use kvindex_core::{Attributes, ChangeSet, RecordId, Value};
pub use kvindex_store::{IndexEntry, IndexStore, ItemUpdate, MemoryStore, RocksStore};
