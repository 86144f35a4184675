//! Record in the hierarchy.

use serde::{Deserialize, Serialize};
use super::{PropertyMap, Value};

/// Opaque record identifier, assigned by the store on first persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed pointer to a persisted record. Foreign-key fields hold these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub type_name: String,
    pub id: RecordId,
}

impl RecordRef {
    pub fn new(type_name: impl Into<String>, id: RecordId) -> Self {
        Self { type_name: type_name.into(), id }
    }
}

impl std::fmt::Display for RecordRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.type_name, self.id)
    }
}

/// A record: a type name plus named field values.
///
/// `id` is `None` until the store has persisted the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Option<RecordId>,
    pub type_name: String,
    pub fields: PropertyMap,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            id: None,
            type_name: type_name.into(),
            fields: PropertyMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Reference to this record, available once it has been persisted.
    pub fn reference(&self) -> Option<RecordRef> {
        self.id.map(|id| RecordRef::new(self.type_name.clone(), id))
    }

    /// The record referenced by `field`, if that field holds a foreign key.
    pub fn ref_at(&self, field: &str) -> Option<&RecordRef> {
        self.get(field).and_then(Value::as_ref)
    }

    /// Shallow copy: same type and field values, no identity.
    ///
    /// Foreign keys are copied as-is; the caller re-points whichever one
    /// has to reference a new connecting record.
    pub fn duplicate(&self) -> Record {
        Record {
            id: None,
            type_name: self.type_name.clone(),
            fields: self.fields.clone(),
        }
    }
}
