//! Attribute schema for user records
//!
//! Declares which attributes a user row may carry and the format constraint
//! each one must satisfy. The schema is configuration; the default matches
//! the stock `users` table.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Format constraint for one attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FieldRule {
    /// Any non-empty string
    Text,
    /// Email address shape
    Email,
    /// 7-15 digits with an optional leading `+`
    Phone,
    /// String whose length in characters lies in `min..=max`
    Length { min: usize, max: usize },
}

impl FieldRule {
    /// Check a string value, returning the violation message if any
    pub(crate) fn check(&self, field: &str, value: &str) -> Option<String> {
        let allows_empty = matches!(self, FieldRule::Length { min: 0, .. });
        if value.is_empty() && !allows_empty {
            return Some(format!("\"{}\" is not allowed to be empty", field));
        }

        match self {
            FieldRule::Text => None,
            FieldRule::Email => (!email_pattern().is_match(value))
                .then(|| format!("\"{}\" must be a valid email", field)),
            FieldRule::Phone => (!phone_pattern().is_match(value)).then(|| {
                format!(
                    "\"{}\" with value \"{}\" fails to match the required pattern: /{}/",
                    field,
                    value,
                    phone_pattern().as_str()
                )
            }),
            FieldRule::Length { min, max } => {
                let len = value.chars().count();
                if len < *min {
                    Some(format!(
                        "\"{}\" length must be at least {} characters long",
                        field, min
                    ))
                } else if len > *max {
                    Some(format!(
                        "\"{}\" length must be less than or equal to {} characters long",
                        field, max
                    ))
                } else {
                    None
                }
            }
        }
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern is valid")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("phone pattern is valid"))
}

/// One named attribute and its constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRule {
    pub name: String,
    #[serde(flatten)]
    pub rule: FieldRule,
}

impl AttributeRule {
    pub fn new(name: impl Into<String>, rule: FieldRule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

/// The full set of mutable user attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserSchema {
    attributes: Vec<AttributeRule>,
}

impl UserSchema {
    pub fn new(attributes: Vec<AttributeRule>) -> Self {
        Self { attributes }
    }

    /// Look up the rule for an attribute name
    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.attributes
            .iter()
            .find(|a| a.name == field)
            .map(|a| &a.rule)
    }

    /// Check whether a field is a known mutable attribute
    pub fn knows(&self, field: &str) -> bool {
        self.rule(field).is_some()
    }

    /// Attribute names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }
}

impl Default for UserSchema {
    fn default() -> Self {
        Self::new(vec![
            AttributeRule::new("full_name", FieldRule::Text),
            AttributeRule::new("email", FieldRule::Email),
            AttributeRule::new("phone", FieldRule::Phone),
            AttributeRule::new("address", FieldRule::Length { min: 1, max: 255 }),
        ])
    }
}
