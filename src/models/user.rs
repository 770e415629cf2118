//! User record model
//!
//! A user is a stable id plus a map of mutable attributes. The attribute set
//! comes from the configured schema, so it is stored as a JSON map rather
//! than as fixed struct fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::ids::UserId;

static NULL: Value = Value::Null;

/// A stored user row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Immutable once assigned
    pub id: UserId,

    /// Mutable attributes keyed by field name
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl User {
    /// Create a user with no attributes
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            attributes: Map::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }

    /// Current value of a field; absent fields read as null
    pub fn get(&self, field: &str) -> &Value {
        self.attributes.get(field).unwrap_or(&NULL)
    }

    /// Overwrite a single field
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.attributes.insert(field.into(), value);
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.attributes.get("full_name").and_then(Value::as_str) {
            Some(name) => write!(f, "{} (#{})", name, self.id),
            None => write!(f, "#{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uid(n: u64) -> UserId {
        UserId::new(n).unwrap()
    }

    #[test]
    fn test_absent_field_reads_null() {
        let user = User::new(uid(1)).with("email", "a@x.com");
        assert_eq!(user.get("email"), &json!("a@x.com"));
        assert_eq!(user.get("phone"), &Value::Null);
    }

    #[test]
    fn test_row_shape() {
        let user = User::new(uid(5))
            .with("full_name", "Test User")
            .with("email", "test@gmail.com");

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            json!({"id": 5, "full_name": "Test User", "email": "test@gmail.com"})
        );

        let back: User = serde_json::from_value(json).unwrap();
        assert_eq!(back, user);
        assert!(!back.attributes.contains_key("id"));
    }

    #[test]
    fn test_display() {
        let named = User::new(uid(2)).with("full_name", "Ada");
        assert_eq!(named.to_string(), "Ada (#2)");
        assert_eq!(User::new(uid(3)).to_string(), "#3");
    }
}
