//! Attribute propagation: copying configured scalar fields between a record
//! and its parent.

use hashbrown::HashSet;
use tracing::debug;

use crate::model::{Record, Value, is_blank};
use crate::storage::{PersistOutcome, RecordStore};
use crate::Result;
use super::Propagator;

/// How copied values reach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateStrategy {
    /// Set the fields in memory only.
    #[default]
    Assign,
    /// Set the fields, then persist the target with validation.
    Update,
    /// Set the fields, then write just those columns without validation.
    UpdateColumns,
}

impl UpdateStrategy {
    /// Map a strategy name; anything unrecognised falls back to `Assign`.
    pub fn parse(name: &str) -> Self {
        match name {
            "update" => UpdateStrategy::Update,
            "update_columns" => UpdateStrategy::UpdateColumns,
            _ => UpdateStrategy::Assign,
        }
    }
}

/// Overwrite rules for one attribute copy.
#[derive(Debug, Clone, Default)]
pub struct CopyOptions {
    /// Overwrite target values that are already set.
    pub force: bool,
    /// Attributes never overwritten, even when forcing.
    pub exempt: HashSet<String>,
    pub strategy: UpdateStrategy,
}

impl CopyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn exempt(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exempt.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    fn overwrites(&self, name: &str, current: Option<&Value>) -> bool {
        is_blank(current) || (self.force && !self.exempt.contains(name))
    }
}

/// What an attribute copy did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeCopy {
    /// Attribute names written on the target, in configuration order.
    pub written: Vec<String>,
    /// Store result when the strategy persisted and something was written.
    pub outcome: Option<PersistOutcome>,
}

impl AttributeCopy {
    /// False only when a requested persist came back invalid.
    pub fn is_saved(&self) -> bool {
        self.outcome.as_ref().is_none_or(PersistOutcome::is_saved)
    }
}

/// Assign `names` from `source` onto `target` in memory, honouring the
/// overwrite rules. Returns the names actually written.
///
/// A name absent on `source` is copied as `Value::Null`.
pub fn assign_attributes(
    source: &Record,
    target: &mut Record,
    names: &[String],
    options: &CopyOptions,
) -> Vec<String> {
    let mut written = Vec::new();
    for name in names {
        if !options.overwrites(name, target.get(name)) {
            continue;
        }
        let value = source.get(name).cloned().unwrap_or(Value::Null);
        target.set(name.clone(), value);
        written.push(name.clone());
    }
    written
}

impl<S: RecordStore> Propagator<S> {
    /// Copy `names` from `source` onto `target`, then persist according to
    /// the options' strategy. One store write at most.
    pub async fn copy_attributes(
        &self,
        source: &Record,
        target: &mut Record,
        names: &[String],
        options: &CopyOptions,
    ) -> Result<AttributeCopy> {
        let written = assign_attributes(source, target, names, options);
        if written.is_empty() {
            return Ok(AttributeCopy::default());
        }
        debug!(target_type = %target.type_name, ?written, strategy = ?options.strategy, "copied attributes");

        let outcome = match options.strategy {
            UpdateStrategy::Assign => None,
            UpdateStrategy::Update => Some(self.store.persist(target).await?),
            UpdateStrategy::UpdateColumns => {
                let fields: Vec<&str> = written.iter().map(String::as_str).collect();
                self.store.persist_raw(target, &fields).await?;
                target.id.map(PersistOutcome::Saved)
            }
        };
        Ok(AttributeCopy { written, outcome })
    }
}
