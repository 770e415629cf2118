//! User service
//!
//! Applies proposed attribute changes to a user inside one transaction,
//! recording an audit row for every sensitive field that actually changed.

use tracing::{error, info, warn};

use crate::audit::{compute_diff, AuditEntry, AuditRecordBuilder};
use crate::config::RuntimeConfig;
use crate::error::{CustodianError, CustodianResult};
use crate::models::{ProposedChange, User, UserId};
use crate::storage::{
    build_update, ConnectionGuard, ConnectionProvider, Statement, Transaction, UpdatePlan,
};
use crate::validation::InputValidator;

use super::identity::{resolve_actor_id, resolve_user, resolve_user_id};

/// Result of applying a proposed change
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The row was updated and the transaction committed
    Updated {
        user_id: UserId,
        /// Changed fields, in the order the change supplied them
        changed_fields: Vec<String>,
        /// Changed fields that produced an audit row
        audited_fields: Vec<String>,
        summary: String,
    },
    /// Every proposed value matched the stored row; nothing was written
    NoChanges { user_id: UserId },
}

impl UpdateOutcome {
    pub fn user_id(&self) -> UserId {
        match self {
            UpdateOutcome::Updated { user_id, .. } | UpdateOutcome::NoChanges { user_id } => {
                *user_id
            }
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, UpdateOutcome::NoChanges { .. })
    }
}

/// Service for reading and updating users
pub struct UserService<'a> {
    provider: &'a dyn ConnectionProvider,
    validator: InputValidator,
    auditor: AuditRecordBuilder,
}

impl<'a> UserService<'a> {
    /// Create a user service from resolved runtime configuration
    pub fn new(provider: &'a dyn ConnectionProvider, config: &RuntimeConfig) -> Self {
        Self::with_parts(
            provider,
            InputValidator::new(config.schema.clone()),
            AuditRecordBuilder::new(config.sensitive_fields.clone()),
        )
    }

    pub fn with_parts(
        provider: &'a dyn ConnectionProvider,
        validator: InputValidator,
        auditor: AuditRecordBuilder,
    ) -> Self {
        Self {
            provider,
            validator,
            auditor,
        }
    }

    /// Apply a change given raw identifiers
    ///
    /// The change is validated and both identifiers coerced before any
    /// connection is acquired.
    pub fn apply_update(
        &self,
        raw_user_id: &str,
        change: &ProposedChange,
        raw_actor_id: &str,
    ) -> CustodianResult<UpdateOutcome> {
        let change = self.validator.validate(change)?;
        let user_id = resolve_user_id(raw_user_id)?;
        let actor_id = resolve_actor_id(raw_actor_id)?;

        self.commit_change(user_id, change, actor_id)
    }

    /// Apply a change to an already-typed user id
    pub fn update_user(
        &self,
        user_id: UserId,
        change: &ProposedChange,
        actor_id: UserId,
    ) -> CustodianResult<UpdateOutcome> {
        let change = self.validator.validate(change)?;
        self.commit_change(user_id, change, actor_id)
    }

    /// Look up a user by raw identifier
    pub fn get_user(&self, raw_user_id: &str) -> CustodianResult<User> {
        let user_id = resolve_user_id(raw_user_id)?;
        let mut conn = ConnectionGuard::acquire(self.provider)?;
        resolve_user(&mut *conn, user_id)
    }

    /// Audit trail of a user, oldest first
    pub fn audit_history(&self, raw_user_id: &str) -> CustodianResult<Vec<AuditEntry>> {
        let user_id = resolve_user_id(raw_user_id)?;
        let mut conn = ConnectionGuard::acquire(self.provider)?;
        resolve_user(&mut *conn, user_id)?;
        conn.fetch_audit_entries(user_id)
    }

    fn commit_change(
        &self,
        user_id: UserId,
        change: &ProposedChange,
        actor_id: UserId,
    ) -> CustodianResult<UpdateOutcome> {
        let mut conn = ConnectionGuard::acquire(self.provider)?;
        let mut tx = conn.begin()?;

        match self.write_change(&mut tx, user_id, change, actor_id) {
            Ok(outcome @ UpdateOutcome::NoChanges { .. }) => {
                tx.rollback()?;
                info!("no changes detected for user {}", user_id);
                Ok(outcome)
            }
            Ok(outcome) => {
                if let Err(e) = tx.commit() {
                    error!(user_id = %user_id, error = %e, "commit failed");
                    return Err(e);
                }
                if let UpdateOutcome::Updated {
                    changed_fields,
                    audited_fields,
                    ..
                } = &outcome
                {
                    info!(
                        changed_by = %actor_id,
                        "user {} updated ({} fields, {} audited)",
                        user_id,
                        changed_fields.len(),
                        audited_fields.len()
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                error!(user_id = %user_id, error = %e, "update rolled back");
                Err(e)
            }
        }
    }

    fn write_change(
        &self,
        tx: &mut Transaction<'_>,
        user_id: UserId,
        change: &ProposedChange,
        actor_id: UserId,
    ) -> CustodianResult<UpdateOutcome> {
        let current = resolve_user(tx.connection(), user_id)?;
        let diff = compute_diff(&current, change);

        let update = match build_update(user_id, &diff) {
            UpdatePlan::NoOp => return Ok(UpdateOutcome::NoChanges { user_id }),
            UpdatePlan::Update(update) => update,
        };
        let audits = self.auditor.build(user_id, actor_id, &diff);

        let affected = tx
            .execute(&Statement::from(update))
            .map_err(into_write_error)?;
        if affected == 0 {
            return Err(CustodianError::Write(format!(
                "update of user {} matched no rows",
                user_id
            )));
        }

        let audited_fields = audits.iter().map(|a| a.field.clone()).collect();
        for insert in audits {
            tx.execute(&Statement::from(insert))
                .map_err(into_write_error)?;
        }

        Ok(UpdateOutcome::Updated {
            user_id,
            changed_fields: diff.fields().into_iter().map(String::from).collect(),
            audited_fields,
            summary: diff.summary().unwrap_or_default(),
        })
    }
}

fn into_write_error(err: CustodianError) -> CustodianError {
    match err {
        CustodianError::Write(_) => err,
        other => CustodianError::Write(other.to_string()),
    }
}
