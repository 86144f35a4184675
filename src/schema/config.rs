//! Per-type propagation configuration.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which attributes and relations of a type take part in propagation.
///
/// Both lists keep declaration order; attributes are copied and relations
/// walked in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritableConfig {
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub associations: Vec<String>,
}

impl InheritableConfig {
    pub fn new<A, R>(attributes: A, associations: R) -> Result<Self>
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
            associations: associations.into_iter().map(Into::into).collect(),
        }
        .validated()
    }

    /// Parse a configuration given as a JSON object
    /// (`{"attributes": [...], "associations": [...]}`).
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::Configuration(format!(
                "object expected, got {}",
                json_kind(value)
            )));
        }
        let config: Self = serde_json::from_value(value.clone())?;
        config.validated()
    }

    fn validated(self) -> Result<Self> {
        if self.attributes.is_empty() && self.associations.is_empty() {
            return Err(Error::Configuration(
                "no attributes or associations declared".into(),
            ));
        }
        Ok(self)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
