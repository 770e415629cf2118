//! The set of attributes whose changes must be audited

use std::collections::BTreeSet;
use std::fmt;

/// Fields audited by default when nothing is configured
pub const DEFAULT_SENSITIVE_FIELDS: [&str; 3] = ["email", "phone", "address"];

/// Read-only set of sensitive field names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveFields(BTreeSet<String>);

impl SensitiveFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    /// Parse a comma-separated list; entries are trimmed and empties dropped
    pub fn parse_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        )
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SensitiveFields {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_FIELDS)
    }
}

impl fmt::Display for SensitiveFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "{}", names.join(","))
    }
}
