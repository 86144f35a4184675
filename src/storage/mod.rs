//! # Record Store Trait
//!
//! The contract between the propagation engine and whatever persists the
//! records. The engine reads records, asks for related ones by foreign key,
//! and writes duplicates and updated records back; it never manages
//! transactions. Callers needing atomicity wrap the top-level call in a
//! transaction of their own store.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory, for testing/embedding |

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::*;
use crate::{Error, Result};

pub use memory::MemoryStore;

// ============================================================================
// Constraint types
// ============================================================================

/// Validation rule checked by `persist` for a type+field pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    /// No two records of the type may hold equal non-blank values.
    Unique,
    /// The field must be present and non-blank.
    Exists,
}

// ============================================================================
// Persist outcome
// ============================================================================

/// Result of a validated write.
///
/// Validation failures are data, not errors: the engine recovers from
/// them per branch. `Err(Error)` is reserved for store faults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistOutcome {
    Saved(RecordId),
    Invalid(Vec<String>),
}

impl PersistOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, PersistOutcome::Saved(_))
    }

    pub fn violations(&self) -> &[String] {
        match self {
            PersistOutcome::Saved(_) => &[],
            PersistOutcome::Invalid(v) => v,
        }
    }
}

// ============================================================================
// RecordStore Trait
// ============================================================================

/// The persistent-record contract.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Load a record by reference. Returns None if not found.
    async fn fetch(&self, reference: &RecordRef) -> Result<Option<Record>>;

    /// Validate and write a record.
    ///
    /// A record without an id is inserted and receives its id here; one
    /// with an id replaces the stored version. On `Invalid` nothing is
    /// written and `record.id` is left untouched.
    async fn persist(&self, record: &mut Record) -> Result<PersistOutcome>;

    /// Write the named fields of an already persisted record, skipping
    /// validation.
    async fn persist_raw(&self, record: &Record, fields: &[&str]) -> Result<()>;

    /// All records of `type_name` whose `field` references `target`.
    async fn find_referencing(
        &self,
        type_name: &str,
        field: &str,
        target: &RecordRef,
    ) -> Result<Vec<Record>>;

    /// All records of a type.
    async fn records_of_type(&self, type_name: &str) -> Result<Vec<Record>>;

    /// Number of records of a type.
    async fn count(&self, type_name: &str) -> Result<u64>;

    /// Register a validation constraint.
    ///
    /// Default returns "not supported".
    async fn create_constraint(
        &self,
        _type_name: &str,
        _field: &str,
        _constraint_type: ConstraintType,
    ) -> Result<()> {
        Err(Error::Storage("constraints not supported".into()))
    }

    /// Drop all constraints on a type+field pair.
    ///
    /// Default returns "not supported".
    async fn drop_constraint(&self, _type_name: &str, _field: &str) -> Result<()> {
        Err(Error::Storage("constraints not supported".into()))
    }
}
