//! Display formatting for terminal output
//!
//! Formats users and their audit trails for the CLI.

pub mod user;

pub use user::{format_audit_trail, format_user};
