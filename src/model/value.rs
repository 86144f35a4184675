//! Field value type shared by records, configuration and the store.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::RecordRef;

/// A scalar (or container) value stored in a record field.
///
/// Covers:
/// - Scalars: Bool, Int, Float, String, Bytes
/// - Containers: List, Map
/// - Links: Ref (a foreign key to another persisted record)
/// - Temporal: Date, DateTime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
    Ref(RecordRef),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

// ============================================================================
// Accessors
// ============================================================================

impl Value {
    /// Whether the value counts as "not set" for overwrite decisions.
    ///
    /// | Kind | Blank when |
    /// |------|------------|
    /// | Null | always |
    /// | String | empty or whitespace only |
    /// | Bytes, List, Map | empty |
    /// | Bool, Int, Float | never (`false` and `0` are real values) |
    /// | Ref, Date, DateTime | never |
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::List(l) => l.is_empty(),
            Value::Map(m) => m.is_empty(),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => false,
            Value::Ref(_) | Value::Date(_) | Value::DateTime(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The referenced record, if this value is a foreign key.
    pub fn as_ref(&self) -> Option<&RecordRef> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }
}

/// Blank check for an optional field read. Absent fields are blank.
pub fn is_blank(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_blank)
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Float(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl From<RecordRef> for Value { fn from(v: RecordRef) -> Self { Value::Ref(v) } }
impl From<NaiveDate> for Value { fn from(v: NaiveDate) -> Self { Value::Date(v) } }
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self { Value::List(v.into_iter().map(Into::into).collect()) }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Value::Null) }
}
