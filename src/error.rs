//! Custom error types for Custodian
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for Custodian operations
#[derive(Error, Debug)]
pub enum CustodianError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// A proposed change was rejected; carries every violation found
    #[error("Validation error: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// A user or actor identifier is not a positive integer
    #[error("Invalid {kind} identifier: '{value}' (expected a positive integer)")]
    InvalidIdentifier { kind: &'static str, value: String },

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// A connection could not be acquired from the provider
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement failed inside an open transaction
    #[error("Write error: {0}")]
    Write(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CustodianError {
    /// Create a "not found" error for users
    pub fn user_not_found(identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "User",
            identifier: identifier.to_string(),
        }
    }

    /// Create an identifier error for the target user
    pub fn invalid_user_id(value: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            kind: "user",
            value: value.into(),
        }
    }

    /// Create an identifier error for the acting user
    pub fn invalid_actor_id(value: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            kind: "actor",
            value: value.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Precondition failures are raised before any connection is acquired
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidIdentifier { .. })
    }

    /// Errors a caller may reasonably retry
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Write(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for CustodianError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CustodianError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Custodian operations
pub type CustodianResult<T> = Result<T, CustodianError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CustodianError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = CustodianError::user_not_found(42);
        assert_eq!(err.to_string(), "User not found: 42");
        assert!(err.is_not_found());
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_validation_lists_every_violation() {
        let err = CustodianError::Validation(vec![
            "\"role\" is not allowed".into(),
            "\"email\" must be a valid email".into(),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation error: \"role\" is not allowed, \"email\" must be a valid email"
        );
        assert!(err.is_validation());
        assert!(err.is_precondition());
    }

    #[test]
    fn test_invalid_identifier_error() {
        let err = CustodianError::invalid_actor_id("-3");
        assert_eq!(
            err.to_string(),
            "Invalid actor identifier: '-3' (expected a positive integer)"
        );
        assert!(err.is_precondition());
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(CustodianError::Write("disk full".into()).is_recoverable());
        assert!(CustodianError::Connection("refused".into()).is_recoverable());
        assert!(!CustodianError::user_not_found(1).is_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CustodianError = io_err.into();
        assert!(matches!(err, CustodianError::Io(_)));
    }
}
