//! Relation metadata between record types.

use serde::{Deserialize, Serialize};

/// How many records sit on the far side of an owned relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    One,
    Many,
}

/// Which side stores the foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// This record holds the foreign key ("belongs to").
    Owning,
    /// The related records hold the foreign key ("has one" / "has many").
    Owned(Cardinality),
}

/// Static description of one declared relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMeta {
    pub kind: RelationKind,
    /// Type on the other end. `None` for a polymorphic owning relation,
    /// which may point at any type.
    pub target_type: Option<String>,
    /// Alias under which the owning side is addressed (polymorphic `as`).
    pub role_name: Option<String>,
    /// Explicit name of the back-pointing field on the related records.
    pub foreign_key: Option<String>,
}

impl RelationMeta {
    pub fn belongs_to(target: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::Owning,
            target_type: Some(target.into()),
            role_name: None,
            foreign_key: None,
        }
    }

    pub fn polymorphic_belongs_to() -> Self {
        Self {
            kind: RelationKind::Owning,
            target_type: None,
            role_name: None,
            foreign_key: None,
        }
    }

    pub fn has_one(target: impl Into<String>) -> Self {
        Self::owned(Cardinality::One, target)
    }

    pub fn has_many(target: impl Into<String>) -> Self {
        Self::owned(Cardinality::Many, target)
    }

    fn owned(cardinality: Cardinality, target: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::Owned(cardinality),
            target_type: Some(target.into()),
            role_name: None,
            foreign_key: None,
        }
    }

    /// Mark an owned relation as polymorphic under `role`.
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role_name = Some(role.into());
        self
    }

    pub fn foreign_key(mut self, field: impl Into<String>) -> Self {
        self.foreign_key = Some(field.into());
        self
    }

    pub fn is_owning(&self) -> bool {
        self.kind == RelationKind::Owning
    }

    pub fn targets(&self, type_name: &str) -> bool {
        self.target_type.as_deref() == Some(type_name)
    }

    /// Field on the related records that points back at an owner of
    /// `owner_type`. Meaningless for owning relations.
    pub fn inverse_field(&self, owner_type: &str) -> String {
        self.foreign_key
            .clone()
            .or_else(|| self.role_name.clone())
            .unwrap_or_else(|| owner_type.to_lowercase())
    }
}

/// A named relation as declared on a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub meta: RelationMeta,
}
