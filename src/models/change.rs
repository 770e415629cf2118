//! Proposed changes supplied by callers
//!
//! A proposed change is a partial mapping from attribute names to new values.
//! Insertion order is preserved because it decides statement parameter order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CustodianError, CustodianResult};

/// Partial update payload for a single user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposedChange(Map<String, Value>);

impl ProposedChange {
    /// Create an empty change
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object payload
    ///
    /// Anything other than a JSON object is rejected as a validation error.
    pub fn from_json_str(payload: &str) -> CustodianResult<Self> {
        let value: Value = serde_json::from_str(payload).map_err(|e| {
            CustodianError::Validation(vec![format!("payload is not valid JSON: {}", e)])
        })?;
        Self::try_from(value)
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Iterate fields in the order the caller supplied them
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Value> for ProposedChange {
    type Error = CustodianError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CustodianError::Validation(vec![format!(
                "payload must be a JSON object, got {}",
                json_type_name(&other)
            )])),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ProposedChange {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Short JSON type name used in validation messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
