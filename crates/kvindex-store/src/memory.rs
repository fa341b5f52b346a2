//! In-memory storage implementation.
//!
//! `MemoryStore` keeps entries in a map behind a read-write lock. It is used
//! in tests and by callers that only need indexes for the lifetime of the
//! process.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::keys;
use crate::types::{IndexEntry, ItemUpdate};
use crate::IndexStore;

/// A process-local index store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<Vec<u8>, IndexEntry>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored entries, including empty ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl IndexStore for MemoryStore {
    fn read(
        &self,
        table: &str,
        hash_value: &str,
        range_value: Option<f64>,
    ) -> Result<Option<IndexEntry>> {
        let key = keys::entry_key(table, hash_value, range_value)?;
        Ok(self.entries.read().get(&key).cloned())
    }

    fn update_item(
        &self,
        table: &str,
        hash_value: &str,
        range_value: Option<f64>,
        update: &ItemUpdate,
    ) -> Result<()> {
        let key = keys::entry_key(table, hash_value, range_value)?;
        let mut entries = self.entries.write();

        if update.is_removal_only() && !entries.contains_key(&key) {
            return Ok(());
        }

        let entry = entries.entry(key).or_default();
        entry.apply(update);

        debug!(table, hash_value, range_value, ids = entry.ids.len(), "Updated index entry");
        Ok(())
    }
}
