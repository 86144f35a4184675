//! # inherit-rs — Parent/Child Propagation for Hierarchical Records
//!
//! Records form a hierarchy: each one may point at a parent of a compatible
//! type. This crate copies configured field values between a record and its
//! parent, and duplicates whole sub-record trees across that link, in both
//! directions:
//!
//! - **inherit** — parent → child
//! - **apply** — child → parent
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `RecordStore` is the contract between the engine and storage
//! 2. **Static metadata**: relation shapes live in a `Schema` table, looked up, never probed
//! 3. **Best effort by default**: a failed branch is reported, its siblings still run
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use inherit_rs::{InheritableConfig, MemoryStore, Propagator, RecordType, Schema};
//!
//! # async fn example(mut child: inherit_rs::Record) -> inherit_rs::Result<()> {
//! let schema = Schema::new().with(
//!     RecordType::new("Person")
//!         .fields(["last_name", "favorite_color"])
//!         .has_many("shoes", "Shoe")
//!         .inheritable(InheritableConfig::new(["last_name"], ["shoes"])?)?,
//! );
//! let engine = Propagator::new(MemoryStore::new(), schema);
//!
//! engine.inherit_attributes(&mut child, &Default::default()).await?;
//! let report = engine.inherit_relations(&mut child).await?;
//! println!("created {} records", report.created.len());
//! # Ok(())
//! # }
//! ```
//!
//! Nothing here opens a transaction. Callers that need the whole
//! propagation to be atomic wrap the call in a transaction of their store.

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod schema;
pub mod storage;
pub mod propagation;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{Record, RecordId, RecordRef, Value, PropertyMap};

// ============================================================================
// Re-exports: Schema
// ============================================================================

pub use schema::{
    Schema, RecordType, Relation, RelationMeta, RelationKind, Cardinality,
    InheritableConfig, Duplicate,
};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use storage::{RecordStore, MemoryStore, PersistOutcome, ConstraintType};

// ============================================================================
// Re-exports: Propagation
// ============================================================================

pub use propagation::{
    Propagator, FailurePolicy, PropagationReport, BranchFailure,
    CopyOptions, UpdateStrategy, AttributeCopy,
    assign_attributes, resolve_back_reference,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown record type: {0}")]
    UnknownType(String),

    #[error("Unknown relation {relation} on {type_name}")]
    UnknownRelation { type_name: String, relation: String },

    #[error("Record of type {0} has not been persisted")]
    NotPersisted(String),

    #[error("{parent} is not the parent of {child}")]
    NotParent { child: String, parent: String },

    #[error("Validation failed for {type_name}: {}", .violations.join(", "))]
    Validation { type_name: String, violations: Vec<String> },

    #[error("No field on {record_type} points back at {anchor_type}")]
    UnresolvedBackReference { record_type: String, anchor_type: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Failures confined to one branch of a relation walk: the record did
    /// not validate, or nothing on it can point back at its anchor.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::UnresolvedBackReference { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
