//! In-memory connection provider for tests
//!
//! Records every connection lifecycle event and executed statement, stages
//! writes per transaction, and can be told to fail specific operations.

use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::Utc;

use crate::audit::AuditEntry;
use crate::error::{CustodianError, CustodianResult};
use crate::models::{AuditId, User, UserId};
use crate::storage::connection::{Connection, ConnectionProvider};
use crate::storage::statement::{AuditInsert, Statement};

/// Counters and statements seen by a [`RecordingProvider`]
#[derive(Debug, Clone, Default)]
pub struct ConnectionLog {
    pub acquired: usize,
    pub released: usize,
    pub begun: usize,
    pub committed: usize,
    pub rolled_back: usize,
    pub fetched: usize,
    pub executed: Vec<Statement>,
}

impl ConnectionLog {
    pub fn updates(&self) -> usize {
        self.executed
            .iter()
            .filter(|s| matches!(s, Statement::Update(_)))
            .count()
    }

    pub fn audit_inserts(&self) -> usize {
        self.executed
            .iter()
            .filter(|s| matches!(s, Statement::AuditInsert(_)))
            .count()
    }
}

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    audit: Vec<AuditInsert>,
}

#[derive(Default)]
struct State {
    committed: Tables,
    log: ConnectionLog,
    refuse_connections: bool,
    fail_audit_inserts: bool,
    fail_updates: bool,
}

pub struct RecordingProvider {
    state: RefCell<State>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State::default()),
        }
    }

    pub fn with_user(self, user: User) -> Self {
        self.state
            .borrow_mut()
            .committed
            .users
            .insert(user.id, user);
        self
    }

    pub fn refuse_connections(self) -> Self {
        self.state.borrow_mut().refuse_connections = true;
        self
    }

    pub fn fail_audit_inserts(self) -> Self {
        self.state.borrow_mut().fail_audit_inserts = true;
        self
    }

    pub fn fail_updates(self) -> Self {
        self.state.borrow_mut().fail_updates = true;
        self
    }

    pub fn log(&self) -> ConnectionLog {
        self.state.borrow().log.clone()
    }

    pub fn user(&self, id: u64) -> Option<User> {
        let id = UserId::new(id)?;
        self.state.borrow().committed.users.get(&id).cloned()
    }

    pub fn audit_rows(&self) -> Vec<AuditInsert> {
        self.state.borrow().committed.audit.clone()
    }
}

impl ConnectionProvider for RecordingProvider {
    fn acquire(&self) -> CustodianResult<Box<dyn Connection + '_>> {
        let mut state = self.state.borrow_mut();
        if state.refuse_connections {
            return Err(CustodianError::Connection("connection refused".into()));
        }
        state.log.acquired += 1;

        Ok(Box::new(RecordingConnection {
            provider: self,
            staged: None,
        }))
    }
}

struct RecordingConnection<'p> {
    provider: &'p RecordingProvider,
    staged: Option<Tables>,
}

impl Connection for RecordingConnection<'_> {
    fn begin(&mut self) -> CustodianResult<()> {
        let mut state = self.provider.state.borrow_mut();
        state.log.begun += 1;
        self.staged = Some(state.committed.clone());
        Ok(())
    }

    fn commit(&mut self) -> CustodianResult<()> {
        let staged = self
            .staged
            .take()
            .ok_or_else(|| CustodianError::Write("no open transaction".into()))?;
        let mut state = self.provider.state.borrow_mut();
        state.log.committed += 1;
        state.committed = staged;
        Ok(())
    }

    fn rollback(&mut self) -> CustodianResult<()> {
        self.staged = None;
        self.provider.state.borrow_mut().log.rolled_back += 1;
        Ok(())
    }

    fn fetch_user(&mut self, id: UserId) -> CustodianResult<Option<User>> {
        self.provider.state.borrow_mut().log.fetched += 1;
        let user = match &self.staged {
            Some(tables) => tables.users.get(&id).cloned(),
            None => self.provider.state.borrow().committed.users.get(&id).cloned(),
        };
        Ok(user)
    }

    fn fetch_audit_entries(&mut self, user_id: UserId) -> CustodianResult<Vec<AuditEntry>> {
        let audit = match &self.staged {
            Some(tables) => tables.audit.clone(),
            None => self.provider.state.borrow().committed.audit.clone(),
        };

        let mut id = AuditId::first();
        let mut entries = Vec::new();
        for insert in audit {
            if insert.user_id == user_id {
                entries.push(AuditEntry {
                    id,
                    user_id: insert.user_id,
                    changed_by: insert.changed_by,
                    field: insert.field,
                    old_value: insert.old_value,
                    new_value: insert.new_value,
                    changed_at: Utc::now(),
                });
            }
            id = id.next();
        }
        Ok(entries)
    }

    fn execute(&mut self, statement: &Statement) -> CustodianResult<u64> {
        let mut state = self.provider.state.borrow_mut();
        state.log.executed.push(statement.clone());

        let tables = self
            .staged
            .as_mut()
            .ok_or_else(|| CustodianError::Write("no open transaction".into()))?;

        match statement {
            Statement::Update(_) if state.fail_updates => {
                Err(CustodianError::Write("injected update failure".into()))
            }
            Statement::AuditInsert(_) if state.fail_audit_inserts => {
                Err(CustodianError::Write("injected audit insert failure".into()))
            }
            Statement::Update(update) => match tables.users.get_mut(&update.user_id) {
                Some(user) => {
                    for (column, value) in &update.assignments {
                        user.set(column.clone(), value.clone());
                    }
                    Ok(1)
                }
                None => Ok(0),
            },
            Statement::AuditInsert(insert) => {
                tables.audit.push(insert.clone());
                Ok(1)
            }
            Statement::InsertUser(user) => {
                tables.users.insert(user.id, user.clone());
                Ok(1)
            }
        }
    }

    fn release(&mut self) {
        self.staged = None;
        self.provider.state.borrow_mut().log.released += 1;
    }
}
