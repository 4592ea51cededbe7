//! SQLite-backed key-value storage.
//!
//! The whole [`StudyState`] lives as one JSON document under a single key, so
//! every save is an atomic full overwrite. Front ends keep auxiliary records
//! (the CLI's timer snapshot) in the same table.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use super::{data_dir, StateStore};
use crate::error::{DatabaseError, Result};
use crate::model::StudyState;

pub const STATE_KEY: &str = "study_state";

/// SQLite database holding the state record.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/studyroom.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("studyroom.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl StateStore for Database {
    fn load(&self) -> StudyState {
        let raw = match self.kv_get(STATE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StudyState::default(),
            Err(e) => {
                warn!(error = %e, "failed to read stored state, starting empty");
                return StudyState::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "stored state is malformed, starting empty");
                StudyState::default()
            }
        }
    }

    fn save(&mut self, state: &StudyState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.kv_set(STATE_KEY, &json)
    }
}
