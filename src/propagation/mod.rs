//! # Propagation Engine
//!
//! Moves configured attribute values and duplicated sub-record trees
//! between a record and its parent.
//!
//! | Operation | Reads from | Writes to | Associations read from |
//! |-----------|-----------|-----------|------------------------|
//! | `inherit_attributes` | parent | child | child's type |
//! | `apply_attributes_to_parent` | child | parent | child's type |
//! | `inherit_relations` | parent | child | child's type |
//! | `apply_relations_to_parent` | child | parent | child's type |
//!
//! Below the top level every duplicate walks its own type's associations.
//! A record without a parent, or a type without configuration, makes every
//! operation a no-op.

pub mod attributes;
pub mod resolver;
pub mod relations;

use tracing::debug;

use crate::model::{Record, RecordRef};
use crate::schema::{DEFAULT_PARENT_FIELD, Schema};
use crate::storage::RecordStore;
use crate::{Error, Result};

pub use attributes::{AttributeCopy, CopyOptions, UpdateStrategy, assign_attributes};
pub use resolver::resolve_back_reference;

// ============================================================================
// Failure policy & report
// ============================================================================

/// What the relation walk does when one branch fails validation or cannot
/// be linked back to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure, skip that branch's sub-tree, keep going.
    #[default]
    BestEffort,
    /// Stop at the first failure and return it. Nothing already written is
    /// undone.
    Abort,
}

/// One branch of a relation walk that was skipped.
#[derive(Debug)]
pub struct BranchFailure {
    pub relation: String,
    /// The sub-record that could not be duplicated.
    pub original: Option<RecordRef>,
    pub error: Error,
}

/// Outcome of a relation walk.
#[derive(Debug, Default)]
pub struct PropagationReport {
    /// Every duplicate persisted, in creation (pre-)order. An owning copy
    /// stays listed even when its anchor then failed to save.
    pub created: Vec<RecordRef>,
    pub failures: Vec<BranchFailure>,
}

impl PropagationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn created_of_type(&self, type_name: &str) -> usize {
        self.created.iter().filter(|r| r.type_name == type_name).count()
    }
}

// ============================================================================
// Propagator
// ============================================================================

/// The propagation engine: a store, the type metadata, and a failure policy.
pub struct Propagator<S: RecordStore> {
    store: S,
    schema: Schema,
    policy: FailurePolicy,
}

impl<S: RecordStore> Propagator<S> {
    pub fn new(store: S, schema: Schema) -> Self {
        Self { store, schema, policy: FailurePolicy::default() }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn parent_field<'r>(&'r self, record: &Record) -> &'r str {
        self.schema
            .get(&record.type_name)
            .map_or(DEFAULT_PARENT_FIELD, |t| t.parent_field_name())
    }

    /// Load the record's parent. `None` when the parent field is unset or
    /// points at a record that no longer exists.
    pub async fn parent_of(&self, record: &Record) -> Result<Option<Record>> {
        match record.ref_at(self.parent_field(record)) {
            Some(reference) => self.store.fetch(reference).await,
            None => Ok(None),
        }
    }

    /// Whether `parent` is `child`'s parent. `Ok(false)` when the child has
    /// none; an error when it has a different one.
    fn is_parent(&self, child: &Record, parent: &Record) -> Result<bool> {
        let Some(expected) = child.ref_at(self.parent_field(child)) else {
            return Ok(false);
        };
        if parent.reference().as_ref() == Some(expected) {
            Ok(true)
        } else {
            Err(Error::NotParent {
                child: describe(child),
                parent: describe(parent),
            })
        }
    }

    fn configured_attributes(&self, record: &Record) -> Option<&[String]> {
        self.schema.config(&record.type_name)
            .map(|c| c.attributes.as_slice())
            .filter(|names| !names.is_empty())
    }

    fn configured_associations(&self, record: &Record) -> Option<&[String]> {
        self.schema.config(&record.type_name)
            .map(|c| c.associations.as_slice())
            .filter(|names| !names.is_empty())
    }

    // ========================================================================
    // Inherit (parent → child)
    // ========================================================================

    /// Copy the child type's configured attributes from the stored parent.
    pub async fn inherit_attributes(
        &self,
        child: &mut Record,
        options: &CopyOptions,
    ) -> Result<AttributeCopy> {
        let Some(names) = self.configured_attributes(child) else {
            debug!(type_name = %child.type_name, "no inheritable attributes");
            return Ok(AttributeCopy::default());
        };
        let Some(parent) = self.parent_of(child).await? else {
            debug!(record = %describe(child), "no parent, nothing to inherit");
            return Ok(AttributeCopy::default());
        };
        self.copy_attributes(&parent, child, names, options).await
    }

    /// Duplicate the parent's configured relations onto the child.
    ///
    /// Owning relations re-point (and re-persist) the child itself. A child
    /// that has a parent but was never stored is `Error::NotPersisted`,
    /// raised before anything is written.
    pub async fn inherit_relations(&self, child: &mut Record) -> Result<PropagationReport> {
        let Some(names) = self.configured_associations(child) else {
            debug!(type_name = %child.type_name, "no inheritable associations");
            return Ok(PropagationReport::default());
        };
        let Some(parent) = self.parent_of(child).await? else {
            debug!(record = %describe(child), "no parent, nothing to inherit");
            return Ok(PropagationReport::default());
        };
        if child.id.is_none() {
            return Err(Error::NotPersisted(child.type_name.clone()));
        }
        self.propagate_relations(child, &parent, names).await
    }

    // ========================================================================
    // Apply (child → parent)
    // ========================================================================

    /// Copy the child type's configured attributes onto `parent`.
    ///
    /// `parent` must be the record the child's parent field references.
    pub async fn apply_attributes_to_parent(
        &self,
        child: &Record,
        parent: &mut Record,
        options: &CopyOptions,
    ) -> Result<AttributeCopy> {
        let Some(names) = self.configured_attributes(child) else {
            return Ok(AttributeCopy::default());
        };
        if !self.is_parent(child, parent)? {
            debug!(record = %describe(child), "no parent, nothing to apply");
            return Ok(AttributeCopy::default());
        }
        self.copy_attributes(child, parent, names, options).await
    }

    /// Duplicate the child's configured relations onto `parent`.
    pub async fn apply_relations_to_parent(
        &self,
        child: &Record,
        parent: &mut Record,
    ) -> Result<PropagationReport> {
        let Some(names) = self.configured_associations(child) else {
            return Ok(PropagationReport::default());
        };
        if !self.is_parent(child, parent)? {
            debug!(record = %describe(child), "no parent, nothing to apply");
            return Ok(PropagationReport::default());
        }
        self.propagate_relations(parent, child, names).await
    }
}

fn describe(record: &Record) -> String {
    match record.id {
        Some(id) => format!("{}#{id}", record.type_name),
        None => format!("{} (unsaved)", record.type_name),
    }
}
