//! Service layer for Custodian
//!
//! The service layer composes validation, identity resolution, diffing and
//! auditing on top of the storage layer.

pub mod identity;
pub mod user;

pub use identity::{resolve_actor_id, resolve_user, resolve_user_id};
pub use user::{UpdateOutcome, UserService};
