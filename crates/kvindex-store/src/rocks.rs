//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `IndexStore` trait.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rocksdb::{BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::types::{IndexEntry, ItemUpdate};
use crate::IndexStore;

/// Number of update lock stripes.
const LOCK_STRIPES: usize = 64;

/// RocksDB-backed storage implementation.
///
/// `update_item` is a read-merge-write of one entry performed under the lock
/// stripe its key hashes to, so it is atomic with respect to every other
/// update of the same entry issued through the same `RocksStore`. Updates of
/// entries in different stripes run in parallel. Reads do not lock.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    update_locks: Box<[Mutex<()>]>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path.as_ref(), cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        info!(path = %path.as_ref().display(), "Opened index store");

        Ok(Self {
            db: Arc::new(db),
            update_locks: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        })
    }

    /// The lock guarding updates of the entry at `key`.
    #[allow(clippy::cast_possible_truncation)]
    fn lock_for(&self, key: &[u8]) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.update_locks[hasher.finish() as usize % self.update_locks.len()]
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get_entry(&self, key: &[u8]) -> Result<Option<IndexEntry>> {
        let cf = self.cf(cf::INDEX_ENTRIES)?;

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }
}

impl IndexStore for RocksStore {
    fn read(
        &self,
        table: &str,
        hash_value: &str,
        range_value: Option<f64>,
    ) -> Result<Option<IndexEntry>> {
        let key = keys::entry_key(table, hash_value, range_value)?;
        self.get_entry(&key)
    }

    fn update_item(
        &self,
        table: &str,
        hash_value: &str,
        range_value: Option<f64>,
        update: &ItemUpdate,
    ) -> Result<()> {
        let key = keys::entry_key(table, hash_value, range_value)?;
        let cf = self.cf(cf::INDEX_ENTRIES)?;

        let _guard = self.lock_for(&key).lock();

        let existing = self.get_entry(&key)?;
        if existing.is_none() && update.is_removal_only() {
            // Nothing to remove from an entry that was never written.
            return Ok(());
        }

        let mut entry = existing.unwrap_or_default();
        entry.apply(update);
        let value = Self::serialize(&entry)?;

        self.db
            .put_cf(&cf, &key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(
            table,
            hash_value,
            range_value,
            ids = entry.ids.len(),
            "Updated index entry"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvindex_core::RecordId;
    use std::collections::BTreeSet;
    use std::thread;
    use tempfile::TempDir;

    const TABLE: &str = "tests_index_user_names";

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn id(s: &str) -> RecordId {
        RecordId::new(s).unwrap()
    }

    #[test]
    fn read_missing_entry() {
        let (store, _dir) = create_test_store();
        assert!(store.read(TABLE, "Josh", None).unwrap().is_none());
    }

    #[test]
    fn add_and_remove_ids() {
        let (store, _dir) = create_test_store();

        store
            .update_item(TABLE, "Josh", None, &ItemUpdate::new().add_id(id("a")))
            .unwrap();
        store
            .update_item(TABLE, "Josh", None, &ItemUpdate::new().add_id(id("b")))
            .unwrap();

        let entry = store.read(TABLE, "Josh", None).unwrap().unwrap();
        assert_eq!(entry.ids, BTreeSet::from([id("a"), id("b")]));

        store
            .update_item(TABLE, "Josh", None, &ItemUpdate::new().remove_id(id("a")))
            .unwrap();
        store
            .update_item(TABLE, "Josh", None, &ItemUpdate::new().remove_id(id("b")))
            .unwrap();

        // The entry stays, empty.
        let entry = store.read(TABLE, "Josh", None).unwrap().unwrap();
        assert!(entry.is_empty());
    }

    #[test]
    fn removing_from_missing_entry_does_not_create_it() {
        let (store, _dir) = create_test_store();

        store
            .update_item(TABLE, "Nobody", None, &ItemUpdate::new().remove_id(id("a")))
            .unwrap();

        assert!(store.read(TABLE, "Nobody", None).unwrap().is_none());
    }

    #[test]
    fn range_values_address_distinct_entries() {
        let (store, _dir) = create_test_store();

        store
            .update_item(TABLE, "Josh", Some(1.0), &ItemUpdate::new().add_id(id("a")))
            .unwrap();
        store
            .update_item(TABLE, "Josh", Some(2.0), &ItemUpdate::new().add_id(id("b")))
            .unwrap();

        let first = store.read(TABLE, "Josh", Some(1.0)).unwrap().unwrap();
        assert_eq!(first.ids, BTreeSet::from([id("a")]));
        assert!(store.read(TABLE, "Josh", None).unwrap().is_none());
    }

    #[test]
    fn ttl_is_persisted() {
        let (store, _dir) = create_test_store();

        store
            .update_item(
                TABLE,
                "Josh",
                None,
                &ItemUpdate::new().add_id(id("a")).set_ttl(1_700_000_000.0),
            )
            .unwrap();

        let entry = store.read(TABLE, "Josh", None).unwrap().unwrap();
        assert_eq!(entry.ttl, Some(1_700_000_000.0));
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = RocksStore::open(dir.path()).unwrap();
            store
                .update_item(TABLE, "Josh", None, &ItemUpdate::new().add_id(id("a")))
                .unwrap();
        }

        let store = RocksStore::open(dir.path()).unwrap();
        let entry = store.read(TABLE, "Josh", None).unwrap().unwrap();
        assert_eq!(entry.ids, BTreeSet::from([id("a")]));
    }

    #[test]
    fn concurrent_adds_are_all_kept() {
        let (store, _dir) = create_test_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..25 {
                        let update = ItemUpdate::new().add_id(id(&format!("{t}-{i}")));
                        store.update_item(TABLE, "shared", None, &update).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let entry = store.read(TABLE, "shared", None).unwrap().unwrap();
        assert_eq!(entry.ids.len(), 200);
    }

    #[test]
    fn concurrent_updates_of_distinct_entries() {
        let (store, _dir) = create_test_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let bucket = format!("bucket-{t}");
                    for i in 0..25 {
                        let update = ItemUpdate::new().add_id(id(&format!("{t}-{i}")));
                        store.update_item(TABLE, &bucket, None, &update).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        for t in 0..8 {
            let entry = store
                .read(TABLE, &format!("bucket-{t}"), None)
                .unwrap()
                .unwrap();
            let expected: BTreeSet<_> = (0..25).map(|i| id(&format!("{t}-{i}"))).collect();
            assert_eq!(entry.ids, expected);
        }
    }

    #[test]
    fn concurrent_removes_and_adds_on_one_entry() {
        let (store, _dir) = create_test_store();
        let store = Arc::new(store);

        for i in 0..100 {
            store
                .update_item(TABLE, "shared", None, &ItemUpdate::new().add_id(id(&format!("old-{i}"))))
                .unwrap();
        }

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    if t % 2 == 0 {
                        // Removers split the old ids between them.
                        for i in (t / 2..100).step_by(4) {
                            let update = ItemUpdate::new().remove_id(id(&format!("old-{i}")));
                            store.update_item(TABLE, "shared", None, &update).unwrap();
                        }
                    } else {
                        for i in 0..25 {
                            let update = ItemUpdate::new().add_id(id(&format!("new-{t}-{i}")));
                            store.update_item(TABLE, "shared", None, &update).unwrap();
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let expected: BTreeSet<_> = [1, 3, 5, 7]
            .iter()
            .flat_map(|t| (0..25).map(move |i| id(&format!("new-{t}-{i}"))))
            .collect();
        let entry = store.read(TABLE, "shared", None).unwrap().unwrap();
        assert_eq!(entry.ids, expected);
    }

    #[test]
    fn hash_values_with_nul_bytes() {
        let (store, _dir) = create_test_store();

        store
            .update_item(TABLE, "Jo\0sh", None, &ItemUpdate::new().add_id(id("a")))
            .unwrap();
        store
            .update_item(TABLE, "Jo", None, &ItemUpdate::new().add_id(id("b")))
            .unwrap();

        let entry = store.read(TABLE, "Jo\0sh", None).unwrap().unwrap();
        assert_eq!(entry.ids, BTreeSet::from([id("a")]));
        assert!(store.read(TABLE, "Josh", None).unwrap().is_none());
    }
}
