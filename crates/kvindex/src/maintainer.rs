//! Incremental index maintenance.
//!
//! `IndexMaintainer` keeps one index consistent with its source records. On
//! save it removes the record's id from the bucket it used to occupy and adds
//! it to the bucket it occupies now; on delete it removes the id. Both
//! short-circuit when none of the index's attributes changed.
//!
//! Every store operation is a merge-style `update_item`, so records indexed
//! concurrently into the same bucket are all kept. A save issues at most two
//! operations (remove, then add) and a delete at most one. They are not
//! wrapped in a transaction; a failure between the two leaves the record in
//! both buckets or in neither until its next successful save.

use std::collections::BTreeSet;
use std::sync::Arc;

use kvindex_core::{Attributes, RecordId};
use kvindex_store::{IndexEntry, IndexStore, ItemUpdate};
use tracing::debug;

use crate::derive::{derive_current_location, derive_provenance_location, IndexLocation};
use crate::descriptor::IndexDescriptor;
use crate::error::{IndexError, Result};
use crate::record::IndexedRecord;

/// Maintains one index against a backing store.
pub struct IndexMaintainer<S: IndexStore> {
    descriptor: Arc<IndexDescriptor>,
    store: Arc<S>,
}

impl<S: IndexStore> IndexMaintainer<S> {
    /// Create a maintainer for `descriptor` writing to `store`.
    #[must_use]
    pub fn new(descriptor: IndexDescriptor, store: Arc<S>) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            store,
        }
    }

    /// The index this maintainer writes.
    #[must_use]
    pub fn descriptor(&self) -> &IndexDescriptor {
        &self.descriptor
    }

    /// The index table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        self.descriptor.table_name()
    }

    /// True if none of the attributes this index tracks has a pending change.
    pub fn is_index_current<R: IndexedRecord + ?Sized>(&self, record: &R) -> bool {
        !record
            .changes()
            .names()
            .any(|name| self.descriptor.tracks(name))
    }

    /// Move a record to the bucket matching its current attributes.
    ///
    /// The id is first removed from the record's previous bucket, then added
    /// to the current one together with the record's TTL, if any. When the
    /// previous and current bucket are the same only the add is issued. A
    /// record whose current attributes do not produce a usable location is
    /// only removed.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::MissingRecordId` if a write is needed but the
    /// record has no id, or `IndexError::Store` if the store fails.
    pub fn save<R: IndexedRecord + ?Sized>(&self, record: &R) -> Result<()> {
        if self.is_index_current(record) {
            debug!(table = self.table_name(), "Index current, skipping save");
            return Ok(());
        }

        let current = derive_current_location(&self.descriptor, record).location();
        let previous = if record.is_new() {
            None
        } else {
            derive_provenance_location(&self.descriptor, record).location()
        };

        if let Some(previous) = previous.filter(|p| current.as_ref() != Some(p)) {
            let id = record.id().ok_or(IndexError::MissingRecordId)?;
            self.remove_at(&previous, id)?;
        }

        let Some(current) = current else {
            debug!(
                table = self.table_name(),
                "Record has no usable index location, skipping add"
            );
            return Ok(());
        };

        let id = record.id().ok_or(IndexError::MissingRecordId)?;
        let mut update = ItemUpdate::new().add_id(id.clone());
        if let Some(ttl) = record.ttl() {
            update = update.set_ttl(ttl);
        }

        debug!(
            table = self.table_name(),
            hash_value = %current.hash_value,
            range_value = current.range_value,
            id = %id,
            "Adding record to index"
        );
        self.store.update_item(
            self.table_name(),
            &current.hash_value,
            current.range_value,
            &update,
        )?;
        Ok(())
    }

    /// Remove a record from the bucket matching its current attributes.
    ///
    /// Unsaved records and records whose indexed attributes have not changed
    /// are left alone. Removing an id that is not indexed succeeds.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Store` if the store fails.
    pub fn delete<R: IndexedRecord + ?Sized>(&self, record: &R) -> Result<()> {
        if record.is_new() {
            debug!(table = self.table_name(), "Record never persisted, skipping delete");
            return Ok(());
        }
        if self.is_index_current(record) {
            debug!(table = self.table_name(), "Index current, skipping delete");
            return Ok(());
        }

        match (
            derive_current_location(&self.descriptor, record).location(),
            record.id(),
        ) {
            (Some(location), Some(id)) => self.remove_at(&location, id),
            _ => Ok(()),
        }
    }

    /// Remove a destroyed record from the bucket of its last persisted state.
    ///
    /// Unlike [`IndexMaintainer::delete`] this does not short-circuit on
    /// unchanged attributes.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Store` if the store fails.
    pub fn evict<R: IndexedRecord + ?Sized>(&self, record: &R) -> Result<()> {
        if record.is_new() {
            return Ok(());
        }

        match (
            derive_provenance_location(&self.descriptor, record).location(),
            record.id(),
        ) {
            (Some(location), Some(id)) => self.remove_at(&location, id),
            _ => Ok(()),
        }
    }

    /// Read the entry at a location.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::RangeMismatch` if `range_value` is given for a
    /// hash-only index or omitted for a ranged one, or `IndexError::Store`
    /// if the store fails.
    pub fn entry(&self, hash_value: &str, range_value: Option<f64>) -> Result<Option<IndexEntry>> {
        if range_value.is_some() != self.descriptor.has_range_key() {
            return Err(IndexError::RangeMismatch {
                table: self.table_name().to_string(),
                expected: self.descriptor.has_range_key(),
            });
        }
        Ok(self
            .store
            .read(self.table_name(), hash_value, range_value)?)
    }

    /// IDs of the records indexed at a location.
    ///
    /// # Errors
    ///
    /// See [`IndexMaintainer::entry`].
    pub fn lookup(&self, hash_value: &str, range_value: Option<f64>) -> Result<BTreeSet<RecordId>> {
        Ok(self
            .entry(hash_value, range_value)?
            .map(|entry| entry.ids)
            .unwrap_or_default())
    }

    /// IDs of the records indexed under the location derived from `attributes`.
    ///
    /// Attributes that do not produce a usable location match nothing.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Store` if the store fails.
    pub fn lookup_by(&self, attributes: &Attributes) -> Result<BTreeSet<RecordId>> {
        match self.descriptor.values(attributes).location() {
            Some(location) => self.lookup(&location.hash_value, location.range_value),
            None => Ok(BTreeSet::new()),
        }
    }

    fn remove_at(&self, location: &IndexLocation, id: &RecordId) -> Result<()> {
        debug!(
            table = self.table_name(),
            hash_value = %location.hash_value,
            range_value = location.range_value,
            id = %id,
            "Removing record from index"
        );
        self.store.update_item(
            self.table_name(),
            &location.hash_value,
            location.range_value,
            &ItemUpdate::new().remove_id(id.clone()),
        )?;
        Ok(())
    }
}
