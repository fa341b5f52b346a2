//! Index value derivation.
//!
//! Given a record, compute where it belongs in an index. Two locations
//! matter during maintenance:
//!
//! - the *current* location, from the record's attributes as they are now;
//! - the *provenance* location, from the attributes as they were before the
//!   pending changes, i.e. the bucket the record has to be removed from.
//!
//! Both are pure functions of an immutable record snapshot.

use kvindex_core::{Attributes, Value};

use crate::descriptor::IndexDescriptor;
use crate::record::IndexedRecord;

/// The hash and range value derived for one index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexValues {
    /// `.`-joined hash key values; `None` when no hash key attribute has a value.
    pub hash_value: Option<String>,
    /// Numeric range value; `Some` whenever the index has a range key.
    pub range_value: Option<f64>,
    range_supplied: bool,
}

impl IndexValues {
    /// The entry location these values address, if it is usable.
    ///
    /// A missing or blank hash value is not usable. For a ranged index, a
    /// range value that was defaulted because the range attribute is absent
    /// is not usable either.
    #[must_use]
    pub fn location(&self) -> Option<IndexLocation> {
        let hash_value = self.hash_value.as_deref().filter(|h| !h.trim().is_empty())?;
        if self.range_value.is_some() && !self.range_supplied {
            return None;
        }
        Some(IndexLocation {
            hash_value: hash_value.to_string(),
            range_value: self.range_value,
        })
    }
}

/// A usable `(hash value, range value)` pair within one index table.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexLocation {
    /// The entry's hash value.
    pub hash_value: String,
    /// The entry's range value, for ranged indexes.
    pub range_value: Option<f64>,
}

/// Derive index values from a raw attribute map.
#[must_use]
pub fn derive_values(descriptor: &IndexDescriptor, attributes: &Attributes) -> IndexValues {
    let hash_keys = descriptor.hash_keys();

    let hash_value = hash_keys
        .iter()
        .any(|key| attributes.contains(key))
        .then(|| {
            hash_keys
                .iter()
                .map(|key| attributes.get(key).map(Value::to_string).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(".")
        });

    let range = descriptor.range_key().map(|key| attributes.get(key));
    let range_value = range.map(|value| value.map_or(0.0, Value::to_f64));
    let range_supplied = matches!(range, Some(Some(_)));

    IndexValues {
        hash_value,
        range_value,
        range_supplied,
    }
}

/// Derive the location a record occupies with its current attribute values.
#[must_use]
pub fn derive_current_location<R>(descriptor: &IndexDescriptor, record: &R) -> IndexValues
where
    R: IndexedRecord + ?Sized,
{
    derive_values(descriptor, record.attributes())
}

/// Derive the location a record occupied before its pending changes.
#[must_use]
pub fn derive_provenance_location<R>(descriptor: &IndexDescriptor, record: &R) -> IndexValues
where
    R: IndexedRecord + ?Sized,
{
    let before = record.attributes().overlay(record.changes());
    derive_values(descriptor, &before)
}
