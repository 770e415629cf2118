//! Builds audit inserts for the sensitive part of a diff

use crate::models::UserId;
use crate::storage::statement::AuditInsert;

use super::diff::FieldDiff;
use super::sensitive::SensitiveFields;

/// Derives audit rows from a diff, restricted to the configured sensitive fields
#[derive(Debug, Clone, Default)]
pub struct AuditRecordBuilder {
    sensitive: SensitiveFields,
}

impl AuditRecordBuilder {
    pub fn new(sensitive: SensitiveFields) -> Self {
        Self { sensitive }
    }

    /// One insert per changed sensitive field, in diff order
    pub fn build(&self, user_id: UserId, actor_id: UserId, diff: &FieldDiff) -> Vec<AuditInsert> {
        diff.iter()
            .filter(|change| self.sensitive.contains(&change.field))
            .map(|change| AuditInsert {
                user_id,
                changed_by: actor_id,
                field: change.field.clone(),
                old_value: change.old_value.clone(),
                new_value: change.new_value.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::compute_diff;
    use crate::models::{ProposedChange, User};
    use serde_json::json;

    fn uid(n: u64) -> UserId {
        UserId::new(n).unwrap()
    }

    fn stored_user() -> User {
        User::new(uid(1))
            .with("full_name", "Test User")
            .with("email", "a@x.com")
            .with("phone", "111")
            .with("address", "X")
    }

    #[test]
    fn test_only_sensitive_fields_audited() {
        let proposed = ProposedChange::new()
            .with("email", "b@x.com")
            .with("full_name", "A");
        let diff = compute_diff(&stored_user(), &proposed);

        let inserts = AuditRecordBuilder::default().build(uid(1), uid(2), &diff);
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].field, "email");
        assert_eq!(inserts[0].old_value, json!("a@x.com"));
        assert_eq!(inserts[0].new_value, json!("b@x.com"));
        assert_eq!(inserts[0].changed_by, uid(2));
        assert_eq!(inserts[0].user_id, uid(1));
    }

    #[test]
    fn test_unchanged_sensitive_fields_not_audited() {
        let proposed = ProposedChange::new()
            .with("email", "a@x.com")
            .with("address", "Y");
        let diff = compute_diff(&stored_user(), &proposed);

        let inserts = AuditRecordBuilder::default().build(uid(1), uid(2), &diff);
        let fields: Vec<_> = inserts.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["address"]);
    }

    #[test]
    fn test_follows_diff_order() {
        let proposed = ProposedChange::new()
            .with("phone", "2223334")
            .with("address", "Y")
            .with("email", "c@x.com");
        let diff = compute_diff(&stored_user(), &proposed);

        let inserts = AuditRecordBuilder::default().build(uid(1), uid(2), &diff);
        let fields: Vec<_> = inserts.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["phone", "address", "email"]);
    }

    #[test]
    fn test_configured_set() {
        let builder = AuditRecordBuilder::new(SensitiveFields::parse_list("full_name"));
        let proposed = ProposedChange::new()
            .with("email", "b@x.com")
            .with("full_name", "A");
        let diff = compute_diff(&stored_user(), &proposed);

        let inserts = builder.build(uid(1), uid(2), &diff);
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].field, "full_name");
    }
}
