//! Field-level diffing between a stored user and a proposed change
//!
//! Values are compared by their canonical text, not by JSON type: a stored
//! number `5` and a proposed string `"5"` count as unchanged. This is the
//! store's equality policy for change detection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{ProposedChange, User};

/// One changed field with its old and new values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
}

/// Ordered list of changed fields, in the order the change supplied them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldDiff(Vec<FieldChange>);

impl FieldDiff {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldChange> {
        self.0.iter()
    }

    /// Names of the changed fields
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|c| c.field.as_str()).collect()
    }

    /// Human-readable summary, `None` when nothing changed
    pub fn summary(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }

        let parts: Vec<String> = self
            .0
            .iter()
            .map(|c| {
                format!(
                    "{}: {} -> {}",
                    c.field,
                    format_value(&c.old_value),
                    format_value(&c.new_value)
                )
            })
            .collect();

        Some(parts.join(", "))
    }
}

impl<'a> IntoIterator for &'a FieldDiff {
    type Item = &'a FieldChange;
    type IntoIter = std::slice::Iter<'a, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Compute which proposed fields differ from the stored row
///
/// Only fields present in `proposed` are considered. A field missing from
/// the stored row compares as null.
pub fn compute_diff(current: &User, proposed: &ProposedChange) -> FieldDiff {
    let changes = proposed
        .iter()
        .filter_map(|(field, new_value)| {
            let old_value = current.get(field);
            is_changed(old_value, new_value).then(|| FieldChange {
                field: field.clone(),
                old_value: old_value.clone(),
                new_value: new_value.clone(),
            })
        })
        .collect();

    FieldDiff(changes)
}

/// Textual inequality of two values
pub fn is_changed(old_value: &Value, new_value: &Value) -> bool {
    canonical_text(old_value) != canonical_text(new_value)
}

/// Canonical text of a value used for change detection
///
/// Strings are taken verbatim, numbers and booleans by their literal text,
/// null as `null`, arrays as their comma-joined elements and objects as
/// `[object Object]`.
pub fn canonical_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => canonical_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => {
            // Truncate long strings
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        other => canonical_text(other),
    }
}
