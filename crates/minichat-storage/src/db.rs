//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex. Configures WAL mode and
//! runs migrations on open.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use minichat_core::error::MinichatError;

use crate::kv::KeyValueStore;
use crate::migrations;

/// SQLite-backed durable key-value store.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at the given path.
    pub fn new(path: &Path) -> Result<Self, MinichatError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| MinichatError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| MinichatError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());
        Self::with_migrations(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, MinichatError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| MinichatError::Storage(format!("Failed to open in-memory db: {}", e)))?;
        Self::with_migrations(conn)
    }

    fn with_migrations(conn: Connection) -> Result<Self, MinichatError> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Execute a closure with a reference to the underlying connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, MinichatError>
    where
        F: FnOnce(&Connection) -> Result<T, MinichatError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| MinichatError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, MinichatError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| MinichatError::Storage(format!("Failed to read key {}: {}", key, e)))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MinichatError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%s', 'now'))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at",
                params![key, value],
            )
            .map_err(|e| MinichatError::Storage(format!("Failed to write key {}: {}", key, e)))?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<(), MinichatError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
                .map_err(|e| {
                    MinichatError::Storage(format!("Failed to remove key {}: {}", key, e))
                })?;
            Ok(())
        })
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

    #[test]
    fn test_in_memory_get_missing() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.get("messages").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let db = Database::in_memory().unwrap();
        db.set("ai_enabled", "1").unwrap();
        db.set("ai_enabled", "0").unwrap();
        assert_eq!(db.get("ai_enabled").unwrap().as_deref(), Some("0"));

        let rows: i64 = db
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
                    .map_err(|e| MinichatError::Storage(e.to_string()))
            })
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_remove() {
        let db = Database::in_memory().unwrap();
        db.set("api_key", "sk-1").unwrap();
        db.remove("api_key").unwrap();
        assert_eq!(db.get("api_key").unwrap(), None);
        // Removing an absent key is fine.
        db.remove("api_key").unwrap();
    }

    #[test]
    fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("minichat.db");

        {
            let db = Database::new(&path).unwrap();
            db.set("messages", "[]").unwrap();
        }

        let db = Database::new(&path).unwrap();
        assert_eq!(db.get("messages").unwrap().as_deref(), Some("[]"));
        assert!(path.exists());
    }

    #[test]
    fn test_wal_mode_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("wal.db")).unwrap();
        let mode: String = db
            .with_conn(|conn| {
                conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
                    .map_err(|e| MinichatError::Storage(e.to_string()))
            })
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
