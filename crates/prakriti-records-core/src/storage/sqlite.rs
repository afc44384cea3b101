//! SQLite-backed persistent storage.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::{KeyValueStorage, StorageResult, SCHEMA};

/// Key-value storage persisted in a SQLite file.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open storage at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    /// Create in-memory storage (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    /// Initialize schema.
    fn initialize(&self) -> StorageResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }
}

impl KeyValueStorage for SqliteStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}
