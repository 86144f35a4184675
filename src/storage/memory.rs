//! In-memory record store.
//!
//! This is the reference implementation of `RecordStore`.
//! It uses simple HashMaps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No transactions**: every `persist` is applied immediately and cannot
//!   be undone.
//! - **Single-writer only**: validation and the write that follows it take
//!   separate locks, so concurrent writers can race past a `Unique`
//!   constraint. Safe for single-threaded or read-heavy use only.
//! - **No field indexes**: `find_referencing()` scans every record of the
//!   requested type.
//!
//! Cloning a `MemoryStore` yields another handle onto the same data.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use parking_lot::RwLock;
use async_trait::async_trait;

use crate::model::*;
use crate::{Error, Result};
use super::{ConstraintType, PersistOutcome, RecordStore};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory record storage.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    records: RwLock<HashMap<RecordId, Record>>,
    /// type name → record IDs in insertion order
    type_index: RwLock<HashMap<String, Vec<RecordId>>>,
    constraints: RwLock<Vec<Constraint>>,
    next_record_id: AtomicU64,
}

#[derive(Debug, Clone)]
struct Constraint {
    type_name: String,
    field: String,
    kind: ConstraintType,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                records: RwLock::new(HashMap::new()),
                type_index: RwLock::new(HashMap::new()),
                constraints: RwLock::new(Vec::new()),
                next_record_id: AtomicU64::new(1),
            }),
        }
    }

    /// Check every constraint registered for the record's type.
    fn violations(&self, record: &Record) -> Vec<String> {
        let constraints: Vec<Constraint> = self.inner.constraints.read()
            .iter()
            .filter(|c| c.type_name == record.type_name)
            .cloned()
            .collect();
        if constraints.is_empty() {
            return Vec::new();
        }

        let idx = self.inner.type_index.read();
        let records = self.inner.records.read();
        let siblings: Vec<&Record> = idx.get(&record.type_name)
            .map(|ids| ids.iter().filter_map(|id| records.get(id)).collect())
            .unwrap_or_default();

        let mut violations = Vec::new();
        for c in &constraints {
            let value = record.get(&c.field);
            match c.kind {
                ConstraintType::Exists => {
                    if is_blank(value) {
                        violations.push(format!("{} can't be blank", c.field));
                    }
                }
                ConstraintType::Unique => {
                    let Some(value) = value.filter(|v| !v.is_blank()) else { continue };
                    let taken = siblings.iter()
                        .filter(|other| other.id != record.id)
                        .any(|other| other.get(&c.field) == Some(value));
                    if taken {
                        violations.push(format!("{} has already been taken", c.field));
                    }
                }
            }
        }
        violations
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// RecordStore impl
// ============================================================================

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch(&self, reference: &RecordRef) -> Result<Option<Record>> {
        Ok(self.inner.records.read()
            .get(&reference.id)
            .filter(|r| r.type_name == reference.type_name)
            .cloned())
    }

    async fn persist(&self, record: &mut Record) -> Result<PersistOutcome> {
        let violations = self.violations(record);
        if !violations.is_empty() {
            return Ok(PersistOutcome::Invalid(violations));
        }

        match record.id {
            Some(id) => {
                let mut records = self.inner.records.write();
                let stored = records.get_mut(&id)
                    .filter(|r| r.type_name == record.type_name)
                    .ok_or_else(|| Error::NotFound(format!("{} {id}", record.type_name)))?;
                stored.fields = record.fields.clone();
                Ok(PersistOutcome::Saved(id))
            }
            None => {
                let id = RecordId(self.inner.next_record_id.fetch_add(1, Ordering::Relaxed));
                record.id = Some(id);

                self.inner.type_index.write()
                    .entry(record.type_name.clone())
                    .or_default()
                    .push(id);
                self.inner.records.write().insert(id, record.clone());

                Ok(PersistOutcome::Saved(id))
            }
        }
    }

    async fn persist_raw(&self, record: &Record, fields: &[&str]) -> Result<()> {
        let id = record.id
            .ok_or_else(|| Error::NotPersisted(record.type_name.clone()))?;
        let mut records = self.inner.records.write();
        let stored = records.get_mut(&id)
            .filter(|r| r.type_name == record.type_name)
            .ok_or_else(|| Error::NotFound(format!("{} {id}", record.type_name)))?;

        for field in fields {
            match record.get(field) {
                Some(value) => { stored.fields.insert(field.to_string(), value.clone()); }
                None => { stored.fields.remove(*field); }
            }
        }
        Ok(())
    }

    async fn find_referencing(
        &self,
        type_name: &str,
        field: &str,
        target: &RecordRef,
    ) -> Result<Vec<Record>> {
        // Brute force scan (no field indexes)
        let idx = self.inner.type_index.read();
        let records = self.inner.records.read();

        let ids = idx.get(type_name).cloned().unwrap_or_default();
        Ok(ids.iter()
            .filter_map(|id| records.get(id))
            .filter(|r| r.ref_at(field) == Some(target))
            .cloned()
            .collect())
    }

    async fn records_of_type(&self, type_name: &str) -> Result<Vec<Record>> {
        let idx = self.inner.type_index.read();
        let records = self.inner.records.read();

        let ids = idx.get(type_name).cloned().unwrap_or_default();
        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }

    async fn count(&self, type_name: &str) -> Result<u64> {
        Ok(self.inner.type_index.read()
            .get(type_name)
            .map_or(0, |ids| ids.len() as u64))
    }

    async fn create_constraint(
        &self,
        type_name: &str,
        field: &str,
        constraint_type: ConstraintType,
    ) -> Result<()> {
        self.inner.constraints.write().push(Constraint {
            type_name: type_name.to_string(),
            field: field.to_string(),
            kind: constraint_type,
        });
        Ok(())
    }

    async fn drop_constraint(&self, type_name: &str, field: &str) -> Result<()> {
        self.inner.constraints.write()
            .retain(|c| !(c.type_name == type_name && c.field == field));
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_persist_assigns_id_and_fetches() {
        let db = MemoryStore::new();
        let mut pet = Record::new("Pet").with_field("name", "Rex");

        let outcome = db.persist(&mut pet).await.unwrap();
        let id = pet.id.unwrap();
        assert_eq!(outcome, PersistOutcome::Saved(id));

        let loaded = db.fetch(&RecordRef::new("Pet", id)).await.unwrap().unwrap();
        assert_eq!(loaded.get("name"), Some(&Value::from("Rex")));
        assert_eq!(db.count("Pet").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fetch_checks_type() {
        let db = MemoryStore::new();
        let mut pet = Record::new("Pet");
        db.persist(&mut pet).await.unwrap();

        let wrong = RecordRef::new("Clan", pet.id.unwrap());
        assert!(db.fetch(&wrong).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persist_updates_existing() {
        let db = MemoryStore::new();
        let mut pet = Record::new("Pet").with_field("name", "Rex");
        db.persist(&mut pet).await.unwrap();

        pet.set("name", "Fido");
        db.persist(&mut pet).await.unwrap();

        let loaded = db.fetch(&pet.reference().unwrap()).await.unwrap().unwrap();
        assert_eq!(loaded.get("name"), Some(&Value::from("Fido")));
        assert_eq!(db.count("Pet").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_exists_constraint_rejects_blank() {
        let db = MemoryStore::new();
        db.create_constraint("Clan", "name", ConstraintType::Exists).await.unwrap();

        let mut clan = Record::new("Clan").with_field("name", "  ");
        let outcome = db.persist(&mut clan).await.unwrap();

        assert_eq!(outcome.violations(), ["name can't be blank"]);
        assert!(clan.id.is_none());
        assert_eq!(db.count("Clan").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unique_constraint_ignores_self() {
        let db = MemoryStore::new();
        db.create_constraint("Clan", "name", ConstraintType::Unique).await.unwrap();

        let mut a = Record::new("Clan").with_field("name", "Stark");
        assert!(db.persist(&mut a).await.unwrap().is_saved());
        // Re-saving the same record is not a duplicate
        assert!(db.persist(&mut a).await.unwrap().is_saved());

        let mut b = Record::new("Clan").with_field("name", "Stark");
        assert!(!db.persist(&mut b).await.unwrap().is_saved());

        db.drop_constraint("Clan", "name").await.unwrap();
        assert!(db.persist(&mut b).await.unwrap().is_saved());
    }

    #[tokio::test]
    async fn test_persist_raw_skips_validation() {
        let db = MemoryStore::new();
        let mut clan = Record::new("Clan").with_field("name", "Stark").with_field("motto", "x");
        db.persist(&mut clan).await.unwrap();
        db.create_constraint("Clan", "name", ConstraintType::Exists).await.unwrap();

        clan.set("name", "");
        clan.set("motto", "Winter");
        db.persist_raw(&clan, &["name"]).await.unwrap();

        let loaded = db.fetch(&clan.reference().unwrap()).await.unwrap().unwrap();
        assert_eq!(loaded.get("name"), Some(&Value::from("")));
        // Only the named field is written
        assert_eq!(loaded.get("motto"), Some(&Value::from("x")));
    }

    #[tokio::test]
    async fn test_persist_raw_requires_id() {
        let db = MemoryStore::new();
        let clan = Record::new("Clan");
        assert!(matches!(
            db.persist_raw(&clan, &["name"]).await,
            Err(Error::NotPersisted(_))
        ));
    }

    #[tokio::test]
    async fn test_find_referencing() {
        let db = MemoryStore::new();
        let mut person = Record::new("Person");
        db.persist(&mut person).await.unwrap();
        let owner = person.reference().unwrap();

        for _ in 0..2 {
            let mut shoe = Record::new("Shoe").with_field("person", owner.clone());
            db.persist(&mut shoe).await.unwrap();
        }
        let mut stray = Record::new("Shoe");
        db.persist(&mut stray).await.unwrap();

        let shoes = db.find_referencing("Shoe", "person", &owner).await.unwrap();
        assert_eq!(shoes.len(), 2);
        assert_eq!(db.records_of_type("Shoe").await.unwrap().len(), 3);
    }
}
