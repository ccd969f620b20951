// Local persistence of client state in SQLite.
// Only the session token lives here; everything else belongs to the server.
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::error::StorageError;

pub const TOKEN_KEY: &str = "token";

pub struct Storage {
    pub db_con: Connection,
}

impl Storage {
    pub fn open(path: &Path) -> Result<Storage, StorageError> {
        let storage = Storage {
            db_con: Connection::open(path)?,
        };
        storage.create_table_if_not_exists()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Storage, StorageError> {
        let storage = Storage {
            db_con: Connection::open_in_memory()?,
        };
        storage.create_table_if_not_exists()?;
        Ok(storage)
    }

    pub fn create_table_if_not_exists(&self) -> Result<(), StorageError> {
        self.db_con.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                Key TEXT PRIMARY KEY,
                Value TEXT NOT NULL,
                UpdatedAt DATETIME NOT NULL
            );",
            (),
        )?;
        Ok(())
    }

    // CREATE / UPDATE
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db_con.execute(
            "INSERT INTO kv_store (Key, Value, UpdatedAt) VALUES (?1, ?2, ?3)
             ON CONFLICT(Key) DO UPDATE SET Value = excluded.Value, UpdatedAt = excluded.UpdatedAt;",
            (key, value, Utc::now()),
        )?;
        Ok(())
    }

    // READ
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .db_con
            .query_row("SELECT Value FROM kv_store WHERE Key = ?1;", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
        let value = self
            .db_con
            .query_row(
                "SELECT UpdatedAt FROM kv_store WHERE Key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    // DELETE
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.db_con
            .execute("DELETE FROM kv_store WHERE Key = ?1;", [key])?;
        Ok(())
    }

    pub fn load_token(&self) -> Result<Option<String>, StorageError> {
        self.get(TOKEN_KEY)
    }

    pub fn save_token(&self, token: &str) -> Result<(), StorageError> {
        self.set(TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.remove(TOKEN_KEY)
    }
}
