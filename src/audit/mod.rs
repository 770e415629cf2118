//! Field-level change auditing for Custodian
//!
//! Every committed change to a sensitive user attribute produces an
//! append-only audit row recording who changed what, from what, to what.
//!
//! # Architecture
//!
//! - `compute_diff`: compares a stored user against a proposed change and
//!   yields the ordered `FieldDiff` of fields that really changed.
//! - `AuditRecordBuilder`: turns the sensitive part of a diff into
//!   `AuditInsert` statements attributed to the acting user.
//! - `AuditEntry`: an audit row as persisted by the store.
//!
//! # Example
//!
//! ```rust,ignore
//! use custodian::audit::{compute_diff, AuditRecordBuilder, SensitiveFields};
//!
//! let diff = compute_diff(&user, &proposed);
//! let builder = AuditRecordBuilder::new(SensitiveFields::default());
//! let inserts = builder.build(user.id, actor_id, &diff);
//! ```

mod builder;
mod diff;
mod entry;
mod sensitive;

pub use builder::AuditRecordBuilder;
pub use diff::{canonical_text, compute_diff, is_changed, FieldChange, FieldDiff};
pub use entry::AuditEntry;
pub use sensitive::{SensitiveFields, DEFAULT_SENSITIVE_FIELDS};
