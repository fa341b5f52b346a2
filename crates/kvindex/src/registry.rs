//! The indexes declared for one record type.
//!
//! A record type usually carries several indexes. `IndexRegistry` holds them
//! and runs each lifecycle operation across all of them, so the record layer
//! only makes one call per save or delete.

use std::sync::Arc;

use kvindex_store::IndexStore;
use tracing::debug;

use crate::config::IndexConfig;
use crate::descriptor::{IndexDescriptor, IndexOptions};
use crate::error::{IndexError, Result};
use crate::maintainer::IndexMaintainer;
use crate::naming;
use crate::record::IndexedRecord;
use crate::schema::RecordSchema;

/// All indexes of one source record type.
pub struct IndexRegistry<S: IndexStore> {
    schema: Arc<RecordSchema>,
    config: IndexConfig,
    store: Arc<S>,
    indexes: Vec<IndexMaintainer<S>>,
}

impl<S: IndexStore> IndexRegistry<S> {
    /// Create an empty registry for `schema`.
    #[must_use]
    pub fn new(schema: RecordSchema, config: IndexConfig, store: Arc<S>) -> Self {
        Self {
            schema: Arc::new(schema),
            config,
            store,
            indexes: Vec::new(),
        }
    }

    /// The source record schema.
    #[must_use]
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Declare an index over `keys`.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::DuplicateIndex` if an index over the same
    /// attributes exists, or any error of [`IndexDescriptor::new`].
    pub fn declare<I, K>(&mut self, keys: I, options: IndexOptions) -> Result<&IndexMaintainer<S>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let descriptor =
            IndexDescriptor::new(Arc::clone(&self.schema), keys, options, &self.config)?;

        if self
            .indexes
            .iter()
            .any(|existing| existing.descriptor().name() == descriptor.name())
        {
            return Err(IndexError::DuplicateIndex(descriptor.name().join(", ")));
        }

        debug!(
            source_type = self.schema.type_name(),
            table = descriptor.table_name(),
            "Registered index"
        );
        let position = self.indexes.len();
        self.indexes
            .push(IndexMaintainer::new(descriptor, Arc::clone(&self.store)));
        Ok(&self.indexes[position])
    }

    /// Find the index covering exactly `keys` (hash and range keys together).
    #[must_use]
    pub fn find_index<I, K>(&self, keys: I) -> Option<&IndexMaintainer<S>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let wanted = naming::canonicalize(keys);
        self.indexes
            .iter()
            .find(|index| index.descriptor().name() == wanted.as_slice())
    }

    /// All declared indexes, in declaration order.
    #[must_use]
    pub fn indexes(&self) -> &[IndexMaintainer<S>] {
        &self.indexes
    }

    /// Every table the declared indexes write to.
    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        self.indexes.iter().map(IndexMaintainer::table_name).collect()
    }

    /// Save `record` to every index.
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first failure.
    pub fn save_all<R: IndexedRecord + ?Sized>(&self, record: &R) -> Result<()> {
        self.indexes.iter().try_for_each(|index| index.save(record))
    }

    /// Delete `record` from every index.
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first failure.
    pub fn delete_all<R: IndexedRecord + ?Sized>(&self, record: &R) -> Result<()> {
        self.indexes.iter().try_for_each(|index| index.delete(record))
    }

    /// Evict a destroyed `record` from every index.
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first failure.
    pub fn evict_all<R: IndexedRecord + ?Sized>(&self, record: &R) -> Result<()> {
        self.indexes.iter().try_for_each(|index| index.evict(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Document;
    use crate::testing::RecordingStore;
    use kvindex_core::RecordId;

    fn registry() -> (IndexRegistry<RecordingStore>, Arc<RecordingStore>) {
        let store = Arc::new(RecordingStore::new());
        let schema = RecordSchema::new("User", ["name", "password", "created_at"]);
        let registry = IndexRegistry::new(
            schema,
            IndexConfig::new("app"),
            Arc::clone(&store),
        );
        (registry, store)
    }

    #[test]
    fn declare_and_find() {
        let (mut registry, _store) = registry();
        registry.declare(["name"], IndexOptions::new()).unwrap();
        registry
            .declare(["password", "name"], IndexOptions::new().range_key("created_at"))
            .unwrap();

        assert_eq!(
            registry.table_names(),
            vec![
                "app_index_user_names",
                "app_index_user_created_ats_and_names_and_passwords"
            ]
        );

        let found = registry
            .find_index(["password", "created_at", "name"])
            .unwrap();
        assert_eq!(found.descriptor().range_key(), Some("created_at"));
        assert!(registry.find_index(["password"]).is_none());
    }

    #[test]
    fn duplicate_declaration_fails() {
        let (mut registry, _store) = registry();
        registry.declare(["name", "password"], IndexOptions::new()).unwrap();

        let result = registry.declare(["password", "name"], IndexOptions::new().prefix("other"));
        assert!(matches!(result, Err(IndexError::DuplicateIndex(_))));
        assert_eq!(registry.indexes().len(), 1);
    }

    #[test]
    fn invalid_declaration_is_not_registered() {
        let (mut registry, _store) = registry();
        let result = registry.declare(["email"], IndexOptions::new());
        assert!(matches!(result, Err(IndexError::InvalidField { .. })));
        assert!(registry.indexes().is_empty());
    }

    #[test]
    fn lifecycle_runs_across_indexes() {
        let (mut registry, store) = registry();
        registry.declare(["name"], IndexOptions::new()).unwrap();
        registry.declare(["password"], IndexOptions::new()).unwrap();

        let mut user = Document::new().with_id(RecordId::new("u1").unwrap());
        user.set("name", "Josh");
        user.set("password", "secret");
        user.mark_persisted_with_changes();

        registry.save_all(&user).unwrap();
        assert_eq!(store.calls().len(), 2);

        user.clear_changes();
        store.reset();
        registry.delete_all(&user).unwrap();
        assert!(store.calls().is_empty());

        registry.evict_all(&user).unwrap();
        assert_eq!(store.calls().len(), 2);
        for index in registry.indexes() {
            assert!(index.lookup_by(user.attributes()).unwrap().is_empty());
        }
    }
}
