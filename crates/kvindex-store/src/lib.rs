//! Index entry storage for kvindex.
//!
//! This crate provides the backing store for materialized index entries. An
//! entry lives at a `(table, hash value, range value)` location and holds the
//! set of record IDs mapping there plus an optional TTL.
//!
//! # Architecture
//!
//! All index tables share the `index_entries` column family; the table name
//! is the leading component of every key (see [`keys`]). Updates are
//! merge-style ([`ItemUpdate`]) and atomic per entry, so concurrent writers
//! adding different IDs to the same entry are all preserved.
//!
//! # Example
//!
//! ```no_run
//! use kvindex_core::RecordId;
//! use kvindex_store::{IndexStore, ItemUpdate, RocksStore};
//!
//! let store = RocksStore::open("/tmp/kvindex-db").unwrap();
//!
//! let id: RecordId = "test123".parse().unwrap();
//! store
//!     .update_item("app_index_user_names", "Josh", None, &ItemUpdate::new().add_id(id))
//!     .unwrap();
//!
//! let entry = store.read("app_index_user_names", "Josh", None).unwrap();
//! assert!(entry.is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
pub mod rocks;
pub mod schema;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use rocks::RocksStore;
pub use types::{IndexEntry, ItemUpdate};

use std::sync::Arc;

/// The storage trait for index entries.
///
/// This trait abstracts the backing key-value store, allowing for different
/// implementations (e.g., `RocksDB`, in-memory for testing). Implementations
/// never retry; failures are returned to the caller as is.
pub trait IndexStore: Send + Sync {
    /// Read the entry at a location.
    ///
    /// Returns `Ok(None)` if no entry has ever been written there.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be encoded or the database
    /// operation fails.
    fn read(&self, table: &str, hash_value: &str, range_value: Option<f64>)
        -> Result<Option<IndexEntry>>;

    /// Atomically apply a mutation to the entry at a location.
    ///
    /// The entry is created if it does not exist. The mutation is applied as
    /// a single step with respect to other `update_item` calls on the same
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be encoded or the database
    /// operation fails.
    fn update_item(
        &self,
        table: &str,
        hash_value: &str,
        range_value: Option<f64>,
        update: &ItemUpdate,
    ) -> Result<()>;
}

impl<S: IndexStore + ?Sized> IndexStore for Arc<S> {
    fn read(
        &self,
        table: &str,
        hash_value: &str,
        range_value: Option<f64>,
    ) -> Result<Option<IndexEntry>> {
        (**self).read(table, hash_value, range_value)
    }

    fn update_item(
        &self,
        table: &str,
        hash_value: &str,
        range_value: Option<f64>,
        update: &ItemUpdate,
    ) -> Result<()> {
        (**self).update_item(table, hash_value, range_value, update)
    }
}
