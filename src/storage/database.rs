//! File-backed record store
//!
//! Both tables live in a single JSON document so that a commit is one atomic
//! file replacement. A transaction works on a staged copy of the document
//! and holds an exclusive OS lock on `database.lock` from `begin` until
//! commit or rollback. Every handle and every process goes through that lock,
//! so transactions are serialized and each one reloads the document under it.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::audit::AuditEntry;
use crate::error::{CustodianError, CustodianResult};
use crate::models::{AuditId, User, UserId};

use super::connection::{Connection, ConnectionProvider};
use super::file_io::{read_json, write_json_atomic};
use super::statement::{AuditInsert, Statement, UpdateStatement};

/// File name of the database document inside the data directory
pub const DATABASE_FILE: &str = "database.json";

/// File name of the lock guarding the database document
pub const LOCK_FILE: &str = "database.lock";

/// How long `begin` waits for another transaction to finish
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// On-disk layout of the database document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct DatabaseDocument {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub user_audit_logs: Vec<AuditEntry>,
}

/// In-memory tables of an open transaction
#[derive(Debug, Clone)]
struct Tables {
    users: BTreeMap<UserId, User>,
    audit: Vec<AuditEntry>,
}

impl From<DatabaseDocument> for Tables {
    fn from(doc: DatabaseDocument) -> Self {
        Self {
            users: doc.users.into_iter().map(|u| (u.id, u)).collect(),
            audit: doc.user_audit_logs,
        }
    }
}

impl From<Tables> for DatabaseDocument {
    fn from(tables: Tables) -> Self {
        Self {
            users: tables.users.into_values().collect(),
            user_audit_logs: tables.audit,
        }
    }
}

impl Tables {
    fn apply_update(&mut self, update: &UpdateStatement) -> u64 {
        match self.users.get_mut(&update.user_id) {
            Some(user) => {
                for (column, value) in &update.assignments {
                    user.set(column.clone(), value.clone());
                }
                1
            }
            None => 0,
        }
    }

    fn apply_audit_insert(&mut self, insert: &AuditInsert) -> u64 {
        let id = match self.audit.iter().map(|e| e.id).max() {
            Some(last) => last.next(),
            None => AuditId::first(),
        };

        self.audit.push(AuditEntry {
            id,
            user_id: insert.user_id,
            changed_by: insert.changed_by,
            field: insert.field.clone(),
            old_value: insert.old_value.clone(),
            new_value: insert.new_value.clone(),
            changed_at: Utc::now(),
        });
        1
    }

    fn apply_insert_user(&mut self, user: &User) -> CustodianResult<u64> {
        if self.users.contains_key(&user.id) {
            return Err(CustodianError::Write(format!(
                "duplicate key: user {} already exists",
                user.id
            )));
        }
        self.users.insert(user.id, user.clone());
        Ok(1)
    }
}

/// Exclusive hold on `database.lock`; released on drop
pub struct DatabaseLock {
    file: File,
}

impl Drop for DatabaseLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(error = %e, "failed to unlock database");
        }
    }
}

/// A record store kept in `<data dir>/database.json`
pub struct FileDatabase {
    dir: PathBuf,
    lock_timeout: Duration,
}

impl FileDatabase {
    /// Open the store rooted at a data directory
    ///
    /// Nothing is touched on disk until a connection is acquired.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Set how long `begin` waits for the database lock
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the database document
    pub fn document_path(&self) -> PathBuf {
        self.dir.join(DATABASE_FILE)
    }

    /// Path of the lock file
    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    /// Check if the database document has been created
    pub fn is_initialized(&self) -> bool {
        self.document_path().exists()
    }

    /// Take the exclusive database lock, waiting up to the lock timeout
    ///
    /// The lock belongs to the open file, so a second lock taken through
    /// another handle, even from the same thread, waits and then fails with
    /// a `Connection` error instead of deadlocking.
    pub fn lock(&self) -> CustodianResult<DatabaseLock> {
        let path = self.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                CustodianError::Storage(format!("Failed to open {}: {}", path.display(), e))
            })?;

        let deadline = Instant::now() + self.lock_timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(DatabaseLock { file }),
                Err(e) if e.kind() != fs2::lock_contended_error().kind() => {
                    return Err(CustodianError::Storage(format!(
                        "Failed to lock {}: {}",
                        path.display(),
                        e
                    )));
                }
                Err(_) if Instant::now() >= deadline => {
                    return Err(CustodianError::Connection(format!(
                        "database is locked (waited {:?} for {})",
                        self.lock_timeout,
                        path.display()
                    )));
                }
                Err(_) => thread::sleep(LOCK_RETRY_INTERVAL),
            }
        }
    }

    fn load(&self) -> CustodianResult<Tables> {
        let doc: DatabaseDocument = read_json(self.document_path())?;
        Ok(doc.into())
    }
}

impl ConnectionProvider for FileDatabase {
    fn acquire(&self) -> CustodianResult<Box<dyn Connection + '_>> {
        if !self.is_initialized() {
            return Err(CustodianError::Connection(format!(
                "no database at {} (run `custodian init` first)",
                self.document_path().display()
            )));
        }

        Ok(Box::new(FileConnection {
            db: self,
            session: None,
        }))
    }
}

/// Open transaction state: the held lock plus staged tables
struct Session {
    _lock: DatabaseLock,
    tables: Tables,
}

/// A connection to a [`FileDatabase`]
pub struct FileConnection<'db> {
    db: &'db FileDatabase,
    session: Option<Session>,
}

impl FileConnection<'_> {
    fn session_mut(&mut self) -> CustodianResult<&mut Session> {
        self.session
            .as_mut()
            .ok_or_else(|| CustodianError::Write("no open transaction".into()))
    }
}

impl Connection for FileConnection<'_> {
    fn begin(&mut self) -> CustodianResult<()> {
        if self.session.is_some() {
            return Err(CustodianError::Storage(
                "transaction already open on this connection".into(),
            ));
        }

        let lock = self.db.lock()?;
        let tables = self.db.load()?;

        self.session = Some(Session {
            _lock: lock,
            tables,
        });
        debug!("transaction begun");
        Ok(())
    }

    fn commit(&mut self) -> CustodianResult<()> {
        let session = self
            .session
            .take()
            .ok_or_else(|| CustodianError::Write("no open transaction".into()))?;

        let doc = DatabaseDocument::from(session.tables);
        write_json_atomic(self.db.document_path(), &doc)
            .map_err(|e| CustodianError::Write(format!("commit failed: {}", e)))?;
        debug!("transaction committed");
        Ok(())
    }

    fn rollback(&mut self) -> CustodianResult<()> {
        if self.session.take().is_some() {
            debug!("transaction rolled back");
        }
        Ok(())
    }

    fn fetch_user(&mut self, id: UserId) -> CustodianResult<Option<User>> {
        match &self.session {
            Some(session) => Ok(session.tables.users.get(&id).cloned()),
            None => Ok(self.db.load()?.users.remove(&id)),
        }
    }

    fn fetch_audit_entries(&mut self, user_id: UserId) -> CustodianResult<Vec<AuditEntry>> {
        let audit = match &self.session {
            Some(session) => session.tables.audit.clone(),
            None => self.db.load()?.audit,
        };

        let mut entries: Vec<_> = audit.into_iter().filter(|e| e.user_id == user_id).collect();
        entries.sort_by_key(|e| e.id);
        Ok(entries)
    }

    fn execute(&mut self, statement: &Statement) -> CustodianResult<u64> {
        let tables = &mut self.session_mut()?.tables;
        match statement {
            Statement::Update(update) => Ok(tables.apply_update(update)),
            Statement::AuditInsert(insert) => Ok(tables.apply_audit_insert(insert)),
            Statement::InsertUser(user) => tables.apply_insert_user(user),
        }
    }

    fn release(&mut self) {
        // Returning a connection mid-transaction discards the staged writes
        self.session = None;
    }
}
