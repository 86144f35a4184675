//! Back-reference resolution.
//!
//! A duplicated sub-record has to point at its new connecting record (the
//! anchor). Which of its fields plays that role depends on how the relation
//! was declared, so it is looked up in the schema:
//!
//! 1. the lower-cased anchor type name, when the duplicate exposes it
//! 2. a polymorphic role alias declared by one of the anchor type's owned
//!    relations targeting the duplicate's type
//! 3. the first owning relation on the duplicate's type that targets the
//!    anchor type (a renamed `belongs_to`)
//!
//! Inherit and apply use the same lookup; only the anchor differs.

use crate::schema::Schema;
use crate::{Error, Result};

/// Name of the field on a `duplicate_type` record that must reference an
/// `anchor_type` record.
pub fn resolve_back_reference(
    schema: &Schema,
    duplicate_type: &str,
    anchor_type: &str,
) -> Result<String> {
    let duplicate = schema.require(duplicate_type)?;

    let convention = anchor_type.to_lowercase();
    if duplicate.exposes(&convention) {
        return Ok(convention);
    }

    if let Some(anchor) = schema.get(anchor_type) {
        let alias = anchor.relations().iter()
            .filter(|r| !r.meta.is_owning() && r.meta.targets(duplicate_type))
            .filter_map(|r| r.meta.role_name.as_deref())
            .find(|role| duplicate.exposes(role));
        if let Some(alias) = alias {
            return Ok(alias.to_string());
        }
    }

    duplicate.relations().iter()
        .find(|r| r.meta.is_owning() && r.meta.targets(anchor_type))
        .map(|r| r.name.clone())
        .ok_or_else(|| Error::UnresolvedBackReference {
            record_type: duplicate_type.to_string(),
            anchor_type: anchor_type.to_string(),
        })
}
