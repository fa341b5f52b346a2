//! Index descriptors.
//!
//! An `IndexDescriptor` is the identity of one index: which attributes form
//! its hash key, which (if any) forms its range key, and the table it is
//! materialized in. Descriptors are built once, when the record type's
//! indexes are declared, and never change afterwards.

use std::sync::Arc;

use kvindex_core::Attributes;
use tracing::debug;

use crate::config::IndexConfig;
use crate::derive::{self, IndexValues};
use crate::error::{IndexError, Result};
use crate::naming;
use crate::schema::RecordSchema;

/// Options accepted when declaring an index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexOptions {
    /// Use the hash key attribute as the range key too.
    pub range: bool,
    /// A distinct attribute to use as the range key.
    pub range_key: Option<String>,
    /// Overrides the table-name prefix (defaults to the lowercased type name).
    pub prefix: Option<String>,
}

impl IndexOptions {
    /// Options for a hash-only index with the default prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Range the index on its own hash key.
    #[must_use]
    pub fn self_range(mut self) -> Self {
        self.range = true;
        self
    }

    /// Range the index on `name`.
    #[must_use]
    pub fn range_key(mut self, name: impl Into<String>) -> Self {
        self.range_key = Some(name.into());
        self
    }

    /// Use `prefix` in the table name instead of the type name.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// The identity of an index over a source record type.
#[derive(Debug, Clone)]
pub struct IndexDescriptor {
    source: Arc<RecordSchema>,
    prefix: String,
    hash_keys: Vec<String>,
    range_keys: Vec<String>,
    name: Vec<String>,
    table_name: String,
}

impl IndexDescriptor {
    /// Declare an index over `keys` of the `source` record type.
    ///
    /// Keys are canonicalized, so `["b", "a"]` and `["a", "b"]` describe the
    /// same index.
    ///
    /// # Errors
    ///
    /// - `IndexError::EmptyKeys` if no hash key is given.
    /// - `IndexError::InvalidRange` if a self-ranged index has more than one key.
    /// - `IndexError::InvalidField` if a key is not an attribute of `source`.
    pub fn new<I, S>(
        source: Arc<RecordSchema>,
        keys: I,
        options: IndexOptions,
        config: &IndexConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hash_keys = naming::canonicalize(keys);
        if hash_keys.is_empty() {
            return Err(IndexError::EmptyKeys);
        }

        let range_keys = if options.range {
            hash_keys.clone()
        } else {
            options.range_key.iter().cloned().collect()
        };
        if range_keys.len() > 1 {
            return Err(IndexError::InvalidRange(format!(
                "a range key must be a single attribute, got {}",
                range_keys.join(", ")
            )));
        }

        let name = naming::canonicalize(hash_keys.iter().chain(&range_keys));
        if let Some(field) = name.iter().find(|k| !source.has_attribute(k)) {
            return Err(IndexError::InvalidField {
                field: field.clone(),
                source_type: source.type_name().to_string(),
            });
        }

        let prefix = options
            .prefix
            .unwrap_or_else(|| source.default_prefix());
        let table_name = naming::table_name(&config.namespace, &prefix, &name);

        debug!(
            source_type = source.type_name(),
            table = %table_name,
            "Declared index"
        );

        Ok(Self {
            source,
            prefix,
            hash_keys,
            range_keys,
            name,
            table_name,
        })
    }

    /// The source record schema.
    #[must_use]
    pub fn source(&self) -> &RecordSchema {
        &self.source
    }

    /// The table-name prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Hash key attributes, in canonical order.
    #[must_use]
    pub fn hash_keys(&self) -> &[String] {
        &self.hash_keys
    }

    /// Range key attributes: empty, or exactly one name.
    #[must_use]
    pub fn range_keys(&self) -> &[String] {
        &self.range_keys
    }

    /// The range key attribute, if the index is ranged.
    #[must_use]
    pub fn range_key(&self) -> Option<&str> {
        self.range_keys.first().map(String::as_str)
    }

    /// True if the index has a range key.
    #[must_use]
    pub fn has_range_key(&self) -> bool {
        !self.range_keys.is_empty()
    }

    /// Every attribute the index tracks, sorted.
    #[must_use]
    pub fn name(&self) -> &[String] {
        &self.name
    }

    /// Check whether the index depends on `attribute`.
    #[must_use]
    pub fn tracks(&self, attribute: &str) -> bool {
        self.name.iter().any(|k| k == attribute)
    }

    /// The table the index is materialized in.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Derive the hash and range value for a set of attributes.
    ///
    /// Attributes the index does not track are ignored.
    #[must_use]
    pub fn values(&self, attributes: &Attributes) -> IndexValues {
        derive::derive_values(self, attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Arc<RecordSchema> {
        Arc::new(RecordSchema::new(
            "User",
            ["name", "password", "email", "created_at", "last_logged_in_at"],
        ))
    }

    fn config() -> IndexConfig {
        IndexConfig::new("dynamoid_tests")
    }

    fn ranged_index() -> IndexDescriptor {
        IndexDescriptor::new(
            user(),
            ["password", "name"],
            IndexOptions::new().range_key("created_at"),
            &config(),
        )
        .unwrap()
    }

    #[test]
    fn assigns_hash_keys() {
        assert_eq!(ranged_index().hash_keys(), ["name", "password"]);
    }

    #[test]
    fn assigns_range_keys() {
        let index = ranged_index();
        assert_eq!(index.range_keys(), ["created_at"]);
        assert_eq!(index.range_key(), Some("created_at"));
    }

    #[test]
    fn reorders_its_name() {
        assert_eq!(ranged_index().name(), ["created_at", "name", "password"]);
    }

    #[test]
    fn determines_table_name() {
        assert_eq!(
            ranged_index().table_name(),
            "dynamoid_tests_index_user_created_ats_and_names_and_passwords"
        );
    }

    #[test]
    fn uses_prefix_if_provided() {
        let index = IndexDescriptor::new(
            user(),
            ["password", "name"],
            IndexOptions::new().range_key("created_at").prefix("prefixed"),
            &config(),
        )
        .unwrap();
        assert_eq!(
            index.table_name(),
            "dynamoid_tests_index_prefixed_created_ats_and_names_and_passwords"
        );
    }

    #[test]
    fn key_order_does_not_matter() {
        let a = IndexDescriptor::new(user(), ["name", "password"], IndexOptions::new(), &config())
            .unwrap();
        let b = IndexDescriptor::new(user(), ["password", "name", "name"], IndexOptions::new(), &config())
            .unwrap();
        assert_eq!(a.name(), b.name());
        assert_eq!(a.table_name(), b.table_name());
    }

    #[test]
    fn self_range_index() {
        let index = IndexDescriptor::new(
            user(),
            ["last_logged_in_at"],
            IndexOptions::new().self_range(),
            &config(),
        )
        .unwrap();
        assert_eq!(index.hash_keys(), ["last_logged_in_at"]);
        assert_eq!(index.range_keys(), ["last_logged_in_at"]);
        assert_eq!(index.name(), ["last_logged_in_at"]);
        assert_eq!(
            index.table_name(),
            "dynamoid_tests_index_user_last_logged_in_ats"
        );
    }

    #[test]
    fn raises_if_field_does_not_exist() {
        let result = IndexDescriptor::new(user(), ["password", "text"], IndexOptions::new(), &config());
        assert!(matches!(
            result,
            Err(IndexError::InvalidField { ref field, .. }) if field == "text"
        ));

        let result = IndexDescriptor::new(
            user(),
            ["name"],
            IndexOptions::new().range_key("missing"),
            &config(),
        );
        assert!(matches!(result, Err(IndexError::InvalidField { .. })));
    }

    #[test]
    fn rejects_empty_keys() {
        let result = IndexDescriptor::new(user(), Vec::<String>::new(), IndexOptions::new(), &config());
        assert!(matches!(result, Err(IndexError::EmptyKeys)));
    }

    #[test]
    fn rejects_compound_self_range() {
        let result = IndexDescriptor::new(
            user(),
            ["name", "password"],
            IndexOptions::new().self_range(),
            &config(),
        );
        assert!(matches!(result, Err(IndexError::InvalidRange(_))));
    }

    #[test]
    fn tracks_hash_and_range_attributes() {
        let index = ranged_index();
        assert!(index.tracks("name"));
        assert!(index.tracks("created_at"));
        assert!(!index.tracks("email"));
    }
}
