//! Configuration module for Custodian
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Settings persistence
//! - Environment overrides for the database URL and sensitive fields

pub mod paths;
pub mod settings;

pub use paths::CustodianPaths;
pub use settings::{parse_database_url, RuntimeConfig, Settings};
