//! Source record schemas.
//!
//! A `RecordSchema` names a record type and the attributes it declares. Index
//! descriptors validate their keys against it.

use std::collections::BTreeSet;

/// The declared shape of a source record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    type_name: String,
    attributes: BTreeSet<String>,
}

impl RecordSchema {
    /// Create a schema for `type_name` declaring the given attributes.
    #[must_use]
    pub fn new<I, S>(type_name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_name: type_name.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// The record type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Check whether `name` is a declared attribute.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    /// Declared attribute names, sorted.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    /// The default table-name prefix: the lowercased type name.
    #[must_use]
    pub fn default_prefix(&self) -> String {
        self.type_name.to_lowercase()
    }
}
