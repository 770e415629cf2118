//! Core data models for Custodian
//!
//! This module contains the data structures of the record store domain:
//! user rows, proposed changes, and row identifiers.

pub mod change;
pub mod ids;
pub mod user;

pub use change::ProposedChange;
pub use ids::{AuditId, InvalidId, UserId};
pub use user::User;
