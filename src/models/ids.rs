//! Strongly-typed ID wrappers for stored rows
//!
//! Row identifiers are positive integers. Using newtype wrappers prevents
//! accidentally mixing up a user id with an audit row id at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

/// Error returned when a raw identifier is not a positive integer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidId(pub String);

impl fmt::Display for InvalidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a positive integer", self.0)
    }
}

impl std::error::Error for InvalidId {}

/// Parse a trimmed decimal integer (optional leading `+`) greater than zero
fn parse_positive(raw: &str) -> Result<NonZeroU64, InvalidId> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidId(raw.to_string()));
    }

    digits
        .parse::<u64>()
        .ok()
        .and_then(NonZeroU64::new)
        .ok_or_else(|| InvalidId(raw.to_string()))
}

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Create an ID from a raw integer; zero is rejected
            pub fn new(value: u64) -> Option<Self> {
                NonZeroU64::new(value).map(Self)
            }

            /// The lowest valid identifier
            pub const fn first() -> Self {
                Self(NonZeroU64::MIN)
            }

            /// Get the underlying integer
            pub fn get(&self) -> u64 {
                self.0.get()
            }

            /// The identifier that follows this one
            pub fn next(&self) -> Self {
                Self(self.0.saturating_add(1))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_positive(s).map(Self)
            }
        }

        impl From<$name> for serde_json::Value {
            fn from(id: $name) -> Self {
                serde_json::Value::from(id.get())
            }
        }
    };
}

define_id!(UserId);
define_id!(AuditId);
