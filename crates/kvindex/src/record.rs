//! The record capability consumed by index maintenance.
//!
//! Index maintenance never touches a concrete model type. It depends on
//! `IndexedRecord`: current attribute values, pending changes, identity and
//! an optional time-to-live. `Document` is a ready-made implementation with
//! dirty tracking, used by callers without a model layer of their own.

use kvindex_core::{Attributes, ChangeSet, RecordId, Value};

/// What index maintenance needs to know about a source record.
pub trait IndexedRecord {
    /// Current attribute values.
    fn attributes(&self) -> &Attributes;

    /// Attributes modified since the record was last persisted.
    fn changes(&self) -> &ChangeSet;

    /// The record's primary key, once assigned.
    fn id(&self) -> Option<&RecordId>;

    /// True if the record has never been persisted.
    fn is_new(&self) -> bool;

    /// Expiry timestamp to propagate to index entries, if the record has one.
    fn ttl(&self) -> Option<f64> {
        None
    }

    /// Current value of one attribute.
    fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes().get(name)
    }
}

/// A schemaless record with dirty tracking.
#[derive(Debug, Clone, Default)]
pub struct Document {
    id: Option<RecordId>,
    persisted: bool,
    attributes: Attributes,
    changes: ChangeSet,
    ttl: Option<Value>,
}

impl Document {
    /// Create an empty, unsaved document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unsaved document with every attribute pending as a change.
    #[must_use]
    pub fn from_attributes(attributes: Attributes) -> Self {
        let mut doc = Self::new();
        for (name, value) in &attributes {
            doc.set(name.clone(), value.clone());
        }
        doc
    }

    /// Assign the record's primary key.
    #[must_use]
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Give the record a time-to-live.
    #[must_use]
    pub fn with_ttl(mut self, ttl: impl Into<Value>) -> Self {
        self.ttl = Some(ttl.into());
        self
    }

    /// Set an attribute, recording the change.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        let old = self.attributes.insert(name.clone(), value.clone());
        self.changes.record(name, old, Some(value));
    }

    /// Unset an attribute, recording the change.
    pub fn unset(&mut self, name: &str) {
        if let Some(old) = self.attributes.remove(name) {
            self.changes.record(name, Some(old), None);
        }
    }

    /// Forget pending changes without persisting.
    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }

    /// Mark the record as persisted: assign an id if it has none and clear
    /// pending changes.
    pub fn mark_persisted(&mut self) {
        if self.id.is_none() {
            self.id = Some(RecordId::generate());
        }
        self.persisted = true;
        self.changes.clear();
    }

    /// Mark the record as persisted without clearing changes.
    ///
    /// Indexes are saved while the record still carries the changes being
    /// persisted; call [`Document::clear_changes`] once they are.
    pub fn mark_persisted_with_changes(&mut self) {
        if self.id.is_none() {
            self.id = Some(RecordId::generate());
        }
        self.persisted = true;
    }
}

impl IndexedRecord for Document {
    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn is_new(&self) -> bool {
        !self.persisted
    }

    fn ttl(&self) -> Option<f64> {
        self.ttl.as_ref().map(Value::to_f64)
    }
}
