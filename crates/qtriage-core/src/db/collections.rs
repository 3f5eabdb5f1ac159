//! Whole-collection reads and writes.

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Database, DbError, DbResult, SharedDatabase};

impl Database {
    /// Store a raw value under `key`, replacing any previous value.
    pub fn put_raw(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO collections (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// Get the raw value stored under `key`.
    pub fn get_raw(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM collections WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Serialize and store a collection, preserving its order.
    pub fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> DbResult<()> {
        let json = serde_json::to_string(items)?;
        self.put_raw(key, &json)
    }

    /// Load a collection; `None` when nothing was ever saved under `key`.
    ///
    /// A stored value that does not deserialize is reported as
    /// [`super::DbError::Json`] so callers can decide how to degrade.
    pub fn load_collection<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<Vec<T>>> {
        match self.get_raw(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

/// Load a collection from a shared database, degrading to empty.
///
/// Absent, malformed or unreadable data all yield an empty collection; the
/// failure is logged and never propagated.
pub fn load_or_empty<T: DeserializeOwned>(db: &SharedDatabase, key: &str) -> Vec<T> {
    let result = match db.lock() {
        Ok(db) => db.load_collection(key),
        Err(_) => Err(DbError::Poisoned),
    };

    match result {
        Ok(Some(items)) => items,
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unreadable persisted collection");
            Vec::new()
        }
    }
}

/// Save a collection to a shared database, logging instead of failing.
pub fn save_best_effort<T: Serialize>(db: &SharedDatabase, key: &str, items: &[T]) {
    let result = match db.lock() {
        Ok(db) => db.save_collection(key, items),
        Err(_) => Err(DbError::Poisoned),
    };

    if let Err(e) = result {
        tracing::warn!(key, error = %e, "Failed to persist collection");
    }
}
