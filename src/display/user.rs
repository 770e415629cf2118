//! User display formatting
//!
//! Formats a user's attributes and audit trail for terminal output.

use crate::audit::{canonical_text, AuditEntry};
use crate::models::User;

/// Format a single user's attributes
pub fn format_user(user: &User) -> String {
    let label_width = user
        .attributes
        .keys()
        .map(|k| k.len())
        .max()
        .unwrap_or(0)
        + 1;

    let mut output = String::new();
    output.push_str(&format!("User: {}\n", user.id));
    for (field, value) in &user.attributes {
        output.push_str(&format!(
            "  {:<label_width$} {}\n",
            format!("{}:", field),
            canonical_text(value),
            label_width = label_width,
        ));
    }
    output
}

/// Format an audit trail as a table, oldest first
pub fn format_audit_trail(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries found.".to_string();
    }

    let field_width = entries
        .iter()
        .map(|e| e.field.len())
        .max()
        .unwrap_or(5)
        .max(5);

    let old_width = entries
        .iter()
        .map(|e| canonical_text(&e.old_value).len())
        .max()
        .unwrap_or(3)
        .max(3);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<20}  {:<field_width$}  {:<old_width$}  {}  {}\n",
        "Changed At",
        "Field",
        "Old",
        "New",
        "By",
        field_width = field_width,
        old_width = old_width,
    ));
    output.push_str(&format!(
        "{:-<20}  {:-<field_width$}  {:-<old_width$}  {:-<10}\n",
        "",
        "",
        "",
        "",
        field_width = field_width,
        old_width = old_width,
    ));

    for entry in entries {
        output.push_str(&format!(
            "{:<20}  {:<field_width$}  {:<old_width$}  {}  {}\n",
            entry.changed_at.format("%Y-%m-%d %H:%M:%S"),
            entry.field,
            canonical_text(&entry.old_value),
            canonical_text(&entry.new_value),
            entry.changed_by,
            field_width = field_width,
            old_width = old_width,
        ));
    }

    output
}
