//! PropertyMap — the named field values on a record.

use std::collections::HashMap;
use super::Value;

/// A map of field names to values.
pub type PropertyMap = HashMap<String, Value>;
