//! Record attribute maps and pending-change tracking.
//!
//! `Attributes` is the current state of a record. `ChangeSet` records, per
//! attribute, the value it had before the record was last modified and the
//! value it has now. Together they let callers reconstruct the record as it
//! was before the change without mutating anything.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::value::Value;

/// The named attribute values of a record.
///
/// An attribute that is absent and an attribute that was never declared are
/// indistinguishable here; schema checks happen in the index layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, Value>);

impl Attributes {
    /// Create an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Set an attribute, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    /// Remove an attribute, returning the previous value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Check whether an attribute has a value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of attributes with a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no attribute has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Reconstruct the attributes as they were before `changes` were applied.
    ///
    /// Every changed attribute takes its old value; an attribute whose old
    /// value was absent is removed. Unchanged attributes are kept as is.
    #[must_use]
    pub fn overlay(&self, changes: &ChangeSet) -> Self {
        let mut before = self.clone();
        for (name, change) in changes.iter() {
            match &change.old {
                Some(old) => {
                    before.insert(name.clone(), old.clone());
                }
                None => {
                    before.remove(name);
                }
            }
        }
        before
    }

    /// Parse a `name=value` assignment, inferring the value's type.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MalformedAttribute` if there is no `=` or the name is empty.
    pub fn parse_assignment(input: &str) -> Result<(String, Value)> {
        match input.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), Value::parse(value)))
            }
            _ => Err(CoreError::MalformedAttribute(input.to_string())),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The old and new value of one changed attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// Value before the change (`None` if the attribute was unset).
    pub old: Option<Value>,
    /// Value after the change (`None` if the attribute is now unset).
    pub new: Option<Value>,
}

/// Pending changes of a record, keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet(BTreeMap<String, Change>);

impl ChangeSet {
    /// Create an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transition of `name` from `old` to `new`.
    ///
    /// Successive changes to the same attribute keep the first recorded old
    /// value. A change that ends up back at its original value is dropped.
    pub fn record(&mut self, name: impl Into<String>, old: Option<Value>, new: Option<Value>) {
        let name = name.into();
        let original = match self.0.remove(&name) {
            Some(existing) => existing.old,
            None => old,
        };
        if original != new {
            self.0.insert(
                name,
                Change {
                    old: original,
                    new,
                },
            );
        }
    }

    /// Get the change recorded for an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Change> {
        self.0.get(name)
    }

    /// Check whether an attribute has a pending change.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Names of all changed attributes, in name order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over `(name, change)` pairs in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Change> {
        self.0.iter()
    }

    /// Number of changed attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if nothing has changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Forget all pending changes.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}
