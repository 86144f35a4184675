//! # Record Type Metadata
//!
//! A typed table describing each record type once: its scalar fields, its
//! relations (in declaration order) and, optionally, its propagation
//! configuration and a custom duplication hook. The propagation engine only
//! ever looks things up here; nothing is probed at runtime.

pub mod relation;
pub mod config;

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::model::Record;
use crate::{Error, Result};

pub use relation::{Cardinality, Relation, RelationKind, RelationMeta};
pub use config::InheritableConfig;

/// Field holding the parent back reference unless a type overrides it.
pub const DEFAULT_PARENT_FIELD: &str = "parent";

// ============================================================================
// Duplication hook
// ============================================================================

/// Custom duplication for a record type.
///
/// When registered, the engine calls this instead of the default shallow
/// copy whenever it duplicates a record of the type across an owning
/// relation. The returned record must not carry an id.
pub trait Duplicate: Send + Sync {
    fn duplicate(&self, original: &Record) -> Record;
}

impl<F> Duplicate for F
where
    F: Fn(&Record) -> Record + Send + Sync,
{
    fn duplicate(&self, original: &Record) -> Record {
        self(original)
    }
}

// ============================================================================
// RecordType
// ============================================================================

/// Metadata for one record type.
#[derive(Clone)]
pub struct RecordType {
    name: String,
    fields: HashSet<String>,
    relations: SmallVec<[Relation; 4]>,
    parent_field: String,
    config: Option<InheritableConfig>,
    duplicator: Option<Arc<dyn Duplicate>>,
}

impl RecordType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: HashSet::new(),
            relations: SmallVec::new(),
            parent_field: DEFAULT_PARENT_FIELD.to_string(),
            config: None,
            duplicator: None,
        }
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into());
        self
    }

    pub fn fields(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn relation(mut self, name: impl Into<String>, meta: RelationMeta) -> Self {
        self.relations.push(Relation { name: name.into(), meta });
        self
    }

    pub fn belongs_to(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relation(name, RelationMeta::belongs_to(target))
    }

    pub fn has_one(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relation(name, RelationMeta::has_one(target))
    }

    pub fn has_many(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relation(name, RelationMeta::has_many(target))
    }

    pub fn parent_field(mut self, name: impl Into<String>) -> Self {
        self.parent_field = name.into();
        self
    }

    /// Attach a propagation configuration. Fails when it declares nothing.
    pub fn inheritable(mut self, config: InheritableConfig) -> Result<Self> {
        if config.attributes.is_empty() && config.associations.is_empty() {
            return Err(Error::Configuration(format!(
                "{}: no attributes or associations declared",
                self.name
            )));
        }
        self.config = Some(config);
        Ok(self)
    }

    pub fn duplicator(mut self, hook: impl Duplicate + 'static) -> Self {
        self.duplicator = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn relation_meta(&self, name: &str) -> Option<&RelationMeta> {
        self.relations.iter().find(|r| r.name == name).map(|r| &r.meta)
    }

    /// Names of relations where this type holds the foreign key.
    pub fn owning_relation_names(&self) -> impl Iterator<Item = &str> {
        self.relations
            .iter()
            .filter(|r| r.meta.is_owning())
            .map(|r| r.name.as_str())
    }

    pub fn parent_field_name(&self) -> &str {
        &self.parent_field
    }

    pub fn config(&self) -> Option<&InheritableConfig> {
        self.config.as_ref()
    }

    /// Whether records of this type carry a field called `name`: a scalar
    /// field, the parent field, or an owning relation.
    pub fn exposes(&self, name: &str) -> bool {
        self.fields.contains(name)
            || self.parent_field == name
            || self.owning_relation_names().any(|r| r == name)
    }
}

impl std::fmt::Debug for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("relations", &self.relations)
            .field("parent_field", &self.parent_field)
            .field("config", &self.config)
            .field("duplicator", &self.duplicator.is_some())
            .finish()
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Registry of record types, keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: HashMap<String, RecordType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing any previous registration of the same name.
    pub fn register(&mut self, record_type: RecordType) -> &mut Self {
        self.types.insert(record_type.name.clone(), record_type);
        self
    }

    pub fn with(mut self, record_type: RecordType) -> Self {
        self.register(record_type);
        self
    }

    pub fn get(&self, type_name: &str) -> Option<&RecordType> {
        self.types.get(type_name)
    }

    pub fn require(&self, type_name: &str) -> Result<&RecordType> {
        self.get(type_name)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))
    }

    /// Propagation configuration of a type; `None` when the type is unknown
    /// or was never made inheritable.
    pub fn config(&self, type_name: &str) -> Option<&InheritableConfig> {
        self.get(type_name).and_then(RecordType::config)
    }

    pub fn duplicator(&self, type_name: &str) -> Option<&dyn Duplicate> {
        self.get(type_name)
            .and_then(|t| t.duplicator.as_deref())
    }

    pub fn relation(&self, type_name: &str, relation: &str) -> Result<&RelationMeta> {
        self.require(type_name)?
            .relation_meta(relation)
            .ok_or_else(|| Error::UnknownRelation {
                type_name: type_name.to_string(),
                relation: relation.to_string(),
            })
    }
}
