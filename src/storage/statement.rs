//! Parameterized write statements
//!
//! Statements carry their target columns and bound values so a connection
//! can apply them directly, and render the equivalent SQL text for logging.

use std::fmt;

use serde_json::Value;

use crate::audit::FieldDiff;
use crate::models::{User, UserId};

/// Table holding user rows
pub const USERS_TABLE: &str = "users";

/// Table holding audit rows
pub const AUDIT_TABLE: &str = "user_audit_logs";

/// Columns written by an audit insert, in parameter order
pub const AUDIT_COLUMNS: [&str; 5] = ["user_id", "changed_by", "field", "old_value", "new_value"];

/// Update of the changed columns of one user row
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub user_id: UserId,
    /// Column assignments in parameter order
    pub assignments: Vec<(String, Value)>,
}

impl UpdateStatement {
    /// `UPDATE users SET a = $1, b = $2 WHERE id = $3`
    pub fn sql(&self) -> String {
        let set_clause = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ${}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "UPDATE {} SET {} WHERE id = ${}",
            USERS_TABLE,
            set_clause,
            self.assignments.len() + 1
        )
    }

    /// Bound values; the user id is always last
    pub fn params(&self) -> Vec<Value> {
        self.assignments
            .iter()
            .map(|(_, value)| value.clone())
            .chain(std::iter::once(Value::from(self.user_id)))
            .collect()
    }

    pub fn columns(&self) -> Vec<&str> {
        self.assignments.iter().map(|(c, _)| c.as_str()).collect()
    }
}

/// Insert of one audit row
#[derive(Debug, Clone, PartialEq)]
pub struct AuditInsert {
    pub user_id: UserId,
    pub changed_by: UserId,
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
}

impl AuditInsert {
    /// `INSERT INTO user_audit_logs (...) VALUES ($1, ..., $5)`
    pub fn sql(&self) -> String {
        let placeholders = (1..=AUDIT_COLUMNS.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            AUDIT_TABLE,
            AUDIT_COLUMNS.join(", "),
            placeholders
        )
    }

    pub fn params(&self) -> Vec<Value> {
        vec![
            Value::from(self.user_id),
            Value::from(self.changed_by),
            Value::from(self.field.clone()),
            self.old_value.clone(),
            self.new_value.clone(),
        ]
    }
}

/// Any write a connection can execute
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Update(UpdateStatement),
    AuditInsert(AuditInsert),
    /// Seed insert of a whole user row
    InsertUser(User),
}

impl Statement {
    pub fn sql(&self) -> String {
        match self {
            Statement::Update(s) => s.sql(),
            Statement::AuditInsert(s) => s.sql(),
            Statement::InsertUser(user) => {
                let columns: Vec<&str> = std::iter::once("id")
                    .chain(user.attributes.keys().map(String::as_str))
                    .collect();
                let placeholders: Vec<String> =
                    (1..=columns.len()).map(|i| format!("${}", i)).collect();
                format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    USERS_TABLE,
                    columns.join(", "),
                    placeholders.join(", ")
                )
            }
        }
    }

    pub fn params(&self) -> Vec<Value> {
        match self {
            Statement::Update(s) => s.params(),
            Statement::AuditInsert(s) => s.params(),
            Statement::InsertUser(user) => std::iter::once(Value::from(user.id))
                .chain(user.attributes.values().cloned())
                .collect(),
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Statement::Update(_) | Statement::InsertUser(_) => USERS_TABLE,
            Statement::AuditInsert(_) => AUDIT_TABLE,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}

impl From<UpdateStatement> for Statement {
    fn from(s: UpdateStatement) -> Self {
        Statement::Update(s)
    }
}

impl From<AuditInsert> for Statement {
    fn from(s: AuditInsert) -> Self {
        Statement::AuditInsert(s)
    }
}

/// Result of planning an update from a diff
#[derive(Debug, Clone, PartialEq)]
pub enum UpdatePlan {
    /// Nothing changed; no write is needed
    NoOp,
    Update(UpdateStatement),
}

/// Build the minimal update for a diff
pub fn build_update(user_id: UserId, diff: &FieldDiff) -> UpdatePlan {
    if diff.is_empty() {
        return UpdatePlan::NoOp;
    }

    UpdatePlan::Update(UpdateStatement {
        user_id,
        assignments: diff
            .iter()
            .map(|c| (c.field.clone(), c.new_value.clone()))
            .collect(),
    })
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

    #[test]
    fn test_empty_diff_is_noop() {
        assert_eq!(build_update(uid(1), &FieldDiff::default()), UpdatePlan::NoOp);
    }

    #[test]
    fn test_update_targets_only_changed_fields() {
        let user = User::new(uid(1))
            .with("email", "a@x.com")
            .with("phone", "1112223")
            .with("full_name", "Old");
        let proposed = ProposedChange::new()
            .with("email", "b@x.com")
            .with("phone", "1112223")
            .with("full_name", "A");

        let diff = compute_diff(&user, &proposed);
        let UpdatePlan::Update(update) = build_update(uid(1), &diff) else {
            panic!("expected an update");
        };

        assert_eq!(update.columns(), vec!["email", "full_name"]);
        assert_eq!(
            update.sql(),
            "UPDATE users SET email = $1, full_name = $2 WHERE id = $3"
        );
        assert_eq!(update.params(), vec![json!("b@x.com"), json!("A"), json!(1)]);
    }

    #[test]
    fn test_audit_insert_sql() {
        let insert = AuditInsert {
            user_id: uid(1),
            changed_by: uid(9),
            field: "email".into(),
            old_value: json!("a@x.com"),
            new_value: json!("b@x.com"),
        };

        assert_eq!(
            insert.sql(),
            "INSERT INTO user_audit_logs (user_id, changed_by, field, old_value, new_value) VALUES ($1, $2, $3, $4, $5)"
        );
        assert_eq!(
            insert.params(),
            vec![json!(1), json!(9), json!("email"), json!("a@x.com"), json!("b@x.com")]
        );

        let statement = Statement::from(insert);
        assert_eq!(statement.table(), AUDIT_TABLE);
    }

    #[test]
    fn test_insert_user_sql() {
        let user = User::new(uid(3)).with("full_name", "Test User").with("email", "t@x.com");
        let statement = Statement::InsertUser(user);

        assert_eq!(
            statement.sql(),
            "INSERT INTO users (id, full_name, email) VALUES ($1, $2, $3)"
        );
        assert_eq!(
            statement.params(),
            vec![json!(3), json!("Test User"), json!("t@x.com")]
        );
    }
}
