//! Relation propagation: duplicating related sub-record trees onto an anchor.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, warn};

use crate::model::{Record, RecordRef, Value};
use crate::schema::{Cardinality, RelationKind, RelationMeta};
use crate::storage::{PersistOutcome, RecordStore};
use crate::{Error, Result};
use super::{BranchFailure, FailurePolicy, PropagationReport, Propagator, resolve_back_reference};

type Walk<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

impl<S: RecordStore> Propagator<S> {
    /// Duplicate every record reachable from `source` through
    /// `relation_names` onto `anchor`, then recurse into each duplicate
    /// with its own type's configured associations.
    ///
    /// The walk is sequential and depth-first: a duplicate is persisted
    /// before any of its own sub-records are copied.
    pub async fn propagate_relations(
        &self,
        anchor: &mut Record,
        source: &Record,
        relation_names: &[String],
    ) -> Result<PropagationReport> {
        let mut report = PropagationReport::default();
        self.walk(anchor, source, relation_names, &mut report).await?;
        Ok(report)
    }

    /// Records related to `source` through `relation`, as a sequence:
    /// an unset singular relation yields nothing, a set one yields one.
    pub async fn related(&self, source: &Record, relation: &str) -> Result<Vec<Record>> {
        let meta = self.schema.relation(&source.type_name, relation)?;
        self.load_related(source, relation, meta).await
    }

    async fn load_related(
        &self,
        source: &Record,
        relation: &str,
        meta: &RelationMeta,
    ) -> Result<Vec<Record>> {
        match meta.kind {
            RelationKind::Owning => match source.ref_at(relation) {
                Some(reference) => Ok(self.store.fetch(reference).await?.into_iter().collect()),
                None => Ok(Vec::new()),
            },
            RelationKind::Owned(cardinality) => {
                // Nothing can reference a record that was never stored
                let Some(owner) = source.reference() else {
                    return Ok(Vec::new());
                };
                let target = meta.target_type.as_deref().ok_or_else(|| {
                    Error::Configuration(format!(
                        "{}.{relation}: owned relation without a target type",
                        source.type_name
                    ))
                })?;
                let field = meta.inverse_field(&source.type_name);
                let mut found = self.store.find_referencing(target, &field, &owner).await?;
                if cardinality == Cardinality::One {
                    found.truncate(1);
                }
                Ok(found)
            }
        }
    }

    fn walk<'a>(
        &'a self,
        anchor: &'a mut Record,
        source: &'a Record,
        relation_names: &'a [String],
        report: &'a mut PropagationReport,
    ) -> Walk<'a> {
        Box::pin(async move {
            for relation in relation_names {
                let meta = self.schema.relation(&source.type_name, relation)?;
                let originals = self.load_related(source, relation, meta).await?;
                for original in &originals {
                    self.duplicate_into(anchor, relation, meta, original, report).await?;
                }
            }
            Ok(())
        })
    }

    async fn duplicate_into(
        &self,
        anchor: &mut Record,
        relation: &str,
        meta: &RelationMeta,
        original: &Record,
        report: &mut PropagationReport,
    ) -> Result<()> {
        let linked = if meta.is_owning() {
            self.duplicate_owning(anchor, relation, original, report).await
        } else {
            self.duplicate_owned(anchor, relation, original, report).await
        };

        let mut copy = match linked {
            Ok(copy) => copy,
            Err(error) if error.is_recoverable() => {
                return self.branch_failed(report, relation, original, error);
            }
            Err(error) => return Err(error),
        };

        if let Some(names) = self.schema.config(&copy.type_name)
            .map(|c| c.associations.as_slice())
            .filter(|names| !names.is_empty())
        {
            self.walk(&mut copy, original, names, report).await?;
        }
        Ok(())
    }

    /// The anchor holds the foreign key: store the copy, then point the
    /// anchor at it.
    ///
    /// If the anchor then fails to save, its field is put back; the stored
    /// copy stays listed in `report.created`.
    async fn duplicate_owning(
        &self,
        anchor: &mut Record,
        relation: &str,
        original: &Record,
        report: &mut PropagationReport,
    ) -> Result<Record> {
        let mut copy = match self.schema.duplicator(&original.type_name) {
            Some(hook) => hook.duplicate(original),
            None => original.duplicate(),
        };
        copy.id = None;

        let outcome = self.store.persist(&mut copy).await?;
        ensure_saved(&copy, outcome)?;
        let created = record_created(report, relation, original, &copy)?;

        let previous = anchor.fields.insert(relation.to_string(), Value::Ref(created));
        let saved = self.store.persist(anchor).await
            .and_then(|outcome| ensure_saved(anchor, outcome));
        if let Err(error) = saved {
            match previous {
                Some(value) => anchor.set(relation, value),
                None => { anchor.fields.remove(relation); }
            }
            return Err(error);
        }
        Ok(copy)
    }

    /// The copy holds the foreign key: point it at the anchor, then store it.
    async fn duplicate_owned(
        &self,
        anchor: &Record,
        relation: &str,
        original: &Record,
        report: &mut PropagationReport,
    ) -> Result<Record> {
        let anchor_ref = persisted_ref(anchor)?;
        let mut copy = original.duplicate();
        let field = resolve_back_reference(&self.schema, &copy.type_name, &anchor.type_name)?;
        copy.set(field, Value::Ref(anchor_ref));

        let outcome = self.store.persist(&mut copy).await?;
        ensure_saved(&copy, outcome)?;
        record_created(report, relation, original, &copy)?;
        Ok(copy)
    }

    fn branch_failed(
        &self,
        report: &mut PropagationReport,
        relation: &str,
        original: &Record,
        error: Error,
    ) -> Result<()> {
        match self.policy {
            FailurePolicy::Abort => Err(error),
            FailurePolicy::BestEffort => {
                warn!(relation, original = ?original.reference(), %error, "skipping branch");
                report.failures.push(BranchFailure {
                    relation: relation.to_string(),
                    original: original.reference(),
                    error,
                });
                Ok(())
            }
        }
    }
}

fn persisted_ref(record: &Record) -> Result<RecordRef> {
    record.reference()
        .ok_or_else(|| Error::NotPersisted(record.type_name.clone()))
}

fn record_created(
    report: &mut PropagationReport,
    relation: &str,
    original: &Record,
    copy: &Record,
) -> Result<RecordRef> {
    let created = persisted_ref(copy)?;
    debug!(relation, original = ?original.reference(), created = %created, "duplicated record");
    report.created.push(created.clone());
    Ok(created)
}

fn ensure_saved(record: &Record, outcome: PersistOutcome) -> Result<()> {
    match outcome {
        PersistOutcome::Saved(_) => Ok(()),
        PersistOutcome::Invalid(violations) => Err(Error::Validation {
            type_name: record.type_name.clone(),
            violations,
        }),
    }
}
