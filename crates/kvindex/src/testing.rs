//! Store doubles for unit tests.

use kvindex_store::{IndexEntry, IndexStore, ItemUpdate, MemoryStore, Result, StoreError};
use parking_lot::Mutex;

/// One `update_item` call seen by a `RecordingStore`.
#[derive(Debug, Clone)]
pub(crate) struct RecordedUpdate {
    pub table: String,
    pub hash_value: String,
    pub range_value: Option<f64>,
    pub update: ItemUpdate,
}

/// A `MemoryStore` that records every update it applies.
#[derive(Debug, Default)]
pub(crate) struct RecordingStore {
    inner: MemoryStore,
    calls: Mutex<Vec<RecordedUpdate>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedUpdate> {
        self.calls.lock().clone()
    }

    /// Forget recorded calls, keeping the stored entries.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

impl IndexStore for RecordingStore {
    fn read(
        &self,
        table: &str,
        hash_value: &str,
        range_value: Option<f64>,
    ) -> Result<Option<IndexEntry>> {
        self.inner.read(table, hash_value, range_value)
    }

    fn update_item(
        &self,
        table: &str,
        hash_value: &str,
        range_value: Option<f64>,
        update: &ItemUpdate,
    ) -> Result<()> {
        self.calls.lock().push(RecordedUpdate {
            table: table.to_string(),
            hash_value: hash_value.to_string(),
            range_value,
            update: update.clone(),
        });
        self.inner.update_item(table, hash_value, range_value, update)
    }
}

/// A store whose every operation fails.
pub(crate) struct FailingStore;

impl IndexStore for FailingStore {
    fn read(&self, _: &str, _: &str, _: Option<f64>) -> Result<Option<IndexEntry>> {
        Err(StoreError::Database("unavailable".to_string()))
    }

    fn update_item(&self, _: &str, _: &str, _: Option<f64>, _: &ItemUpdate) -> Result<()> {
        Err(StoreError::Database("unavailable".to_string()))
    }
}
