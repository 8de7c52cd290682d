//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex for thread-safe access.
//! Configures WAL mode and recommended PRAGMAs on initialization.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use siteline_core::error::SitelineError;

use crate::migrations;

/// Thread-safe SQLite database wrapper.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at the given path and run pending migrations.
    pub fn new(path: &Path) -> Result<Self, SitelineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| SitelineError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| SitelineError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing and ephemeral deployments).
    pub fn in_memory() -> Result<Self, SitelineError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SitelineError::Storage(format!("Failed to open in-memory db: {}", e)))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| SitelineError::Storage(format!("Failed to set pragmas: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Execute a closure with a reference to the underlying connection.
    ///
    /// The mutex is held for the duration of the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, SitelineError>
    where
        F: FnOnce(&Connection) -> Result<T, SitelineError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SitelineError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(db: &Database, table: &str) -> i64 {
        db.with_conn(|conn| {
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .map_err(|e| SitelineError::Storage(e.to_string()))
        })
        .unwrap()
    }

    #[test]
    fn test_in_memory_database_has_schema() {
        let db = Database::in_memory().unwrap();
        assert_eq!(count(&db, "contact_submissions"), 0);
        assert_eq!(count(&db, "job_applications"), 0);
        assert_eq!(count(&db, "chat_leads"), 0);
    }

    #[test]
    fn test_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("siteline.db");
        let db = Database::new(&path).unwrap();
        assert_eq!(count(&db, "contact_submissions"), 0);
        assert!(path.exists());
    }

    #[test]
    fn test_reopen_does_not_reapply_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("siteline.db");
        drop(Database::new(&path).unwrap());
        let db = Database::new(&path).unwrap();
        assert_eq!(count(&db, "schema_migrations"), 1);
    }

    #[test]
    fn test_wal_mode_enabled_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("wal.db")).unwrap();
        db.with_conn(|conn| {
            let mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .map_err(|e| SitelineError::Storage(e.to_string()))?;
            assert_eq!(mode, "wal");
            Ok(())
        })
        .unwrap();
    }
}
