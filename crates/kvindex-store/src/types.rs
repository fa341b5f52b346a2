//! Index entry records and the mutations applied to them.

use std::collections::BTreeSet;

use kvindex_core::RecordId;
use serde::{Deserialize, Serialize};

/// The record stored at one `(table, hash value, range value)` location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// IDs of the source records currently mapping to this location.
    #[serde(default)]
    pub ids: BTreeSet<RecordId>,
    /// Expiry timestamp propagated from a source record with a time-to-live.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<f64>,
}

impl IndexEntry {
    /// Apply a mutation in place.
    ///
    /// Removals are applied before additions, then the TTL is set. Removing
    /// an id that is not present is a no-op.
    pub fn apply(&mut self, update: &ItemUpdate) {
        for id in &update.remove_ids {
            self.ids.remove(id);
        }
        self.ids.extend(update.add_ids.iter().cloned());
        if let Some(ttl) = update.set_ttl {
            self.ttl = Some(ttl);
        }
    }

    /// True if no record maps to this location any more.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A merge-style mutation of a single index entry.
///
/// Mutations never overwrite the id set; they add to or remove from it, so
/// concurrent writers targeting the same entry do not clobber each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    /// IDs to add to the entry's `ids` set.
    pub add_ids: BTreeSet<RecordId>,
    /// IDs to remove from the entry's `ids` set.
    pub remove_ids: BTreeSet<RecordId>,
    /// New value for the entry's `ttl` field.
    pub set_ttl: Option<f64>,
}

impl ItemUpdate {
    /// Create an empty mutation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an id to the entry.
    #[must_use]
    pub fn add_id(mut self, id: RecordId) -> Self {
        self.add_ids.insert(id);
        self
    }

    /// Remove an id from the entry.
    #[must_use]
    pub fn remove_id(mut self, id: RecordId) -> Self {
        self.remove_ids.insert(id);
        self
    }

    /// Set the entry's TTL.
    #[must_use]
    pub fn set_ttl(mut self, ttl: f64) -> Self {
        self.set_ttl = Some(ttl);
        self
    }

    /// True if this mutation only removes ids.
    ///
    /// A removal-only mutation of an entry that does not exist changes
    /// nothing, so stores skip it instead of creating an empty entry.
    #[must_use]
    pub fn is_removal_only(&self) -> bool {
        self.add_ids.is_empty() && self.set_ttl.is_none()
    }
}
