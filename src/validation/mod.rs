//! Input validation for proposed changes
//!
//! Checks a payload against the attribute schema before any storage access.
//! Unknown fields are rejected outright, and every violation is collected so
//! the caller sees the whole list at once.

pub mod schema;

pub use schema::{AttributeRule, FieldRule, UserSchema};

use serde_json::Value;

use crate::error::{CustodianError, CustodianResult};
use crate::models::change::json_type_name;
use crate::models::ProposedChange;

/// Validates proposed changes against a [`UserSchema`]
#[derive(Debug, Clone, Default)]
pub struct InputValidator {
    schema: UserSchema,
}

impl InputValidator {
    pub fn new(schema: UserSchema) -> Self {
        Self { schema }
    }

    /// Validate a proposed change, returning it unchanged on success
    pub fn validate<'c>(&self, change: &'c ProposedChange) -> CustodianResult<&'c ProposedChange> {
        let violations: Vec<String> = change
            .iter()
            .filter_map(|(field, value)| self.check_field(field, value))
            .collect();

        if violations.is_empty() {
            Ok(change)
        } else {
            Err(CustodianError::Validation(violations))
        }
    }

    fn check_field(&self, field: &str, value: &Value) -> Option<String> {
        let Some(rule) = self.schema.rule(field) else {
            return Some(format!("\"{}\" is not allowed", field));
        };

        match value {
            Value::String(s) => rule.check(field, s),
            other => Some(format!(
                "\"{}\" must be a string, got {}",
                field,
                json_type_name(other)
            )),
        }
    }
}
