//! Identity resolution
//!
//! Coerces raw identifiers into [`UserId`]s and loads the target user row.

use crate::error::{CustodianError, CustodianResult};
use crate::models::{User, UserId};
use crate::storage::Connection;

/// Coerce the target user's identifier
pub fn resolve_user_id(raw: &str) -> CustodianResult<UserId> {
    raw.parse()
        .map_err(|_| CustodianError::invalid_user_id(raw))
}

/// Coerce the acting user's identifier
pub fn resolve_actor_id(raw: &str) -> CustodianResult<UserId> {
    raw.parse()
        .map_err(|_| CustodianError::invalid_actor_id(raw))
}

/// Load the current row for a user, failing if it does not exist
pub fn resolve_user(conn: &mut dyn Connection, id: UserId) -> CustodianResult<User> {
    conn.fetch_user(id)?
        .ok_or_else(|| CustodianError::user_not_found(id))
}
