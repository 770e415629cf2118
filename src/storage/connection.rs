//! Connection capability and scoped guards
//!
//! The record store is reached through a [`ConnectionProvider`]. Callers hold
//! connections through [`ConnectionGuard`], which returns the connection on
//! every exit path, and open transactions through [`Transaction`], which
//! rolls back unless it is explicitly committed.

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::audit::AuditEntry;
use crate::error::CustodianResult;
use crate::models::{User, UserId};

use super::statement::Statement;

/// A single connection to the record store
pub trait Connection {
    /// Open a transaction
    fn begin(&mut self) -> CustodianResult<()>;

    /// Make every statement executed since `begin` durable
    fn commit(&mut self) -> CustodianResult<()>;

    /// Discard every statement executed since `begin`
    fn rollback(&mut self) -> CustodianResult<()>;

    /// `SELECT * FROM users WHERE id = $1`
    fn fetch_user(&mut self, id: UserId) -> CustodianResult<Option<User>>;

    /// Audit rows recorded for a user, oldest first
    fn fetch_audit_entries(&mut self, user_id: UserId) -> CustodianResult<Vec<AuditEntry>>;

    /// Execute a write inside the open transaction, returning the affected row count
    fn execute(&mut self, statement: &Statement) -> CustodianResult<u64>;

    /// Hand the connection back to its provider
    fn release(&mut self);
}

/// Source of connections
pub trait ConnectionProvider {
    fn acquire(&self) -> CustodianResult<Box<dyn Connection + '_>>;
}

/// Owns an acquired connection and releases it exactly once on drop
pub struct ConnectionGuard<'p> {
    conn: Box<dyn Connection + 'p>,
}

impl<'p> ConnectionGuard<'p> {
    pub fn acquire(provider: &'p dyn ConnectionProvider) -> CustodianResult<Self> {
        let conn = provider.acquire()?;
        debug!("connection acquired");
        Ok(Self { conn })
    }

    /// Begin a transaction on this connection
    pub fn begin(&mut self) -> CustodianResult<Transaction<'_>> {
        Transaction::begin(&mut *self.conn)
    }
}

impl<'p> Deref for ConnectionGuard<'p> {
    type Target = dyn Connection + 'p;

    fn deref(&self) -> &Self::Target {
        &*self.conn
    }
}

impl<'p> DerefMut for ConnectionGuard<'p> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.conn
    }
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        self.conn.release();
        debug!("connection released");
    }
}

/// An open transaction; rolled back on drop unless committed
pub struct Transaction<'c> {
    conn: &'c mut dyn Connection,
    finished: bool,
}

impl<'c> Transaction<'c> {
    pub fn begin(conn: &'c mut dyn Connection) -> CustodianResult<Self> {
        conn.begin()?;
        Ok(Self {
            conn,
            finished: false,
        })
    }

    pub fn fetch_user(&mut self, id: UserId) -> CustodianResult<Option<User>> {
        self.conn.fetch_user(id)
    }

    /// The connection this transaction runs on
    pub fn connection(&mut self) -> &mut dyn Connection {
        &mut *self.conn
    }

    pub fn execute(&mut self, statement: &Statement) -> CustodianResult<u64> {
        debug!(sql = %statement, "executing statement");
        self.conn.execute(statement)
    }

    pub fn commit(mut self) -> CustodianResult<()> {
        self.finished = true;
        self.conn.commit()
    }

    pub fn rollback(mut self) -> CustodianResult<()> {
        self.finished = true;
        self.conn.rollback()
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        if let Err(e) = self.conn.rollback() {
            warn!(error = %e, "rollback of abandoned transaction failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingProvider;

    #[test]
    fn test_guard_releases_on_drop() {
        let provider = RecordingProvider::new();
        {
            let _guard = ConnectionGuard::acquire(&provider).unwrap();
            assert_eq!(provider.log().acquired, 1);
            assert_eq!(provider.log().released, 0);
        }
        assert_eq!(provider.log().released, 1);
    }

    #[test]
    fn test_dropped_transaction_rolls_back() {
        let provider = RecordingProvider::new();
        let mut guard = ConnectionGuard::acquire(&provider).unwrap();
        {
            let _tx = guard.begin().unwrap();
        }
        let log = provider.log();
        assert_eq!(log.begun, 1);
        assert_eq!(log.rolled_back, 1);
        assert_eq!(log.committed, 0);
    }

    #[test]
    fn test_committed_transaction_does_not_roll_back() {
        let provider = RecordingProvider::new();
        let mut guard = ConnectionGuard::acquire(&provider).unwrap();
        let tx = guard.begin().unwrap();
        tx.commit().unwrap();

        let log = provider.log();
        assert_eq!(log.committed, 1);
        assert_eq!(log.rolled_back, 0);
    }
}
