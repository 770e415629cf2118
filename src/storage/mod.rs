//! Storage layer for Custodian
//!
//! Defines the connection capability the core runs against, the write
//! statements it issues, and the file-backed record store that implements it.

pub mod connection;
pub mod database;
pub mod file_io;
pub mod init;
pub mod statement;

pub use connection::{Connection, ConnectionGuard, ConnectionProvider, Transaction};
pub use database::{
    DatabaseLock, FileConnection, FileDatabase, DATABASE_FILE, DEFAULT_LOCK_TIMEOUT, LOCK_FILE,
};
pub use file_io::{read_json, write_json_atomic};
pub use init::{initialize_storage, seed_user, SeedOutcome};
pub use statement::{build_update, AuditInsert, Statement, UpdatePlan, UpdateStatement};
