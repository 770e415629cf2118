//! Database bootstrap and seeding
//!
//! Creates the database document on first run and seeds a test user.

use tracing::info;

use crate::error::CustodianResult;
use crate::models::{User, UserId};

use super::connection::ConnectionGuard;
use super::database::{DatabaseDocument, FileDatabase};
use super::file_io::write_json_atomic;
use super::statement::Statement;

/// Outcome of seeding the test user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyExists,
}

/// Create the data directory and an empty database document if absent
///
/// Returns `true` when a new document was created.
pub fn initialize_storage(db: &FileDatabase) -> CustodianResult<bool> {
    std::fs::create_dir_all(db.dir())?;
    let _lock = db.lock()?;

    if db.is_initialized() {
        return Ok(false);
    }

    write_json_atomic(db.document_path(), &DatabaseDocument::default())?;
    info!(path = %db.document_path().display(), "database initialized");
    Ok(true)
}

/// The stock test user
pub fn test_user(id: UserId) -> User {
    User::new(id)
        .with("full_name", "Test User")
        .with("email", "test@gmail.com")
        .with("phone", "123456789")
        .with("address", "Madagascar, Antananarivo, 101")
}

/// Insert the test user under `id` unless a user with that id exists
pub fn seed_user(db: &FileDatabase, id: UserId) -> CustodianResult<SeedOutcome> {
    let mut conn = ConnectionGuard::acquire(db)?;
    let mut tx = conn.begin()?;

    if tx.fetch_user(id)?.is_some() {
        tx.rollback()?;
        return Ok(SeedOutcome::AlreadyExists);
    }

    tx.execute(&Statement::InsertUser(test_user(id)))?;
    tx.commit()?;
    info!(user_id = %id, "test user created");
    Ok(SeedOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_storage() {
        let temp_dir = TempDir::new().unwrap();
        let db = FileDatabase::open(temp_dir.path().join("data"));

        assert!(!db.is_initialized());
        assert!(initialize_storage(&db).unwrap());
        assert!(db.is_initialized());

        // Second run leaves the document alone
        assert!(!initialize_storage(&db).unwrap());
    }

    #[test]
    fn test_seed_user_once() {
        let temp_dir = TempDir::new().unwrap();
        let db = FileDatabase::open(temp_dir.path());
        initialize_storage(&db).unwrap();

        let id = UserId::new(1).unwrap();
        assert_eq!(seed_user(&db, id).unwrap(), SeedOutcome::Created);
        assert_eq!(seed_user(&db, id).unwrap(), SeedOutcome::AlreadyExists);

        let mut conn = ConnectionGuard::acquire(&db).unwrap();
        let user = conn.fetch_user(id).unwrap().unwrap();
        assert_eq!(user.get("email"), &json!("test@gmail.com"));
        assert_eq!(user.get("address"), &json!("Madagascar, Antananarivo, 101"));
    }

    #[test]
    fn test_seed_requires_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let db = FileDatabase::open(temp_dir.path());
        assert!(seed_user(&db, UserId::first()).is_err());
    }
}
