//! Custodian - user record store with field-level change auditing
//!
//! This library applies partial attribute changes to stored users inside a
//! single transaction. Only fields whose value really changed are written,
//! and every change to a sensitive field is recorded in an append-only audit
//! log attributed to the acting user.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (users, proposed changes, ids)
//! - `validation`: Attribute schema and input validation
//! - `audit`: Diffing and audit record building
//! - `storage`: Connection capability and the file-backed record store
//! - `services`: Identity resolution and the transactional update flow
//! - `cli`, `display`: Command-line surface
//!
//! # Example
//!
//! ```rust,ignore
//! use custodian::config::{CustodianPaths, RuntimeConfig, Settings};
//! use custodian::models::ProposedChange;
//! use custodian::services::UserService;
//! use custodian::storage::FileDatabase;
//!
//! let paths = CustodianPaths::new()?;
//! let config = RuntimeConfig::from_env(Settings::load_or_default(&paths)?)?;
//! let db = FileDatabase::open(&config.database_dir);
//!
//! let change = ProposedChange::new().with("email", "new@example.com");
//! UserService::new(&db, &config).apply_update("1", &change, "2")?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use error::CustodianError;
