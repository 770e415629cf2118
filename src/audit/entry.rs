//! Audit entry data structures
//!
//! An audit entry records one field's old -> new transition on a user,
//! attributed to the acting user. Entries are append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{AuditId, UserId};

/// A single persisted audit row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Row id assigned by the store
    pub id: AuditId,

    /// User whose field changed
    pub user_id: UserId,

    /// User who made the change
    pub changed_by: UserId,

    /// Name of the changed field
    pub field: String,

    /// Value before the change
    pub old_value: Value,

    /// Value after the change
    pub new_value: Value,

    /// When the change was committed (UTC)
    pub changed_at: DateTime<Utc>,
}
