//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Index entries of every index table, keyed by `table || hash || range`.
    pub const INDEX_ENTRIES: &str = "index_entries";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::INDEX_ENTRIES]
}
