// vscdb-scrub - Key/Value Store Repository
//
// Fixed-shape queries over `ItemTable`. Every mutation targets exactly one
// key by equality; there is no pattern-based DELETE anywhere in the crate.

use rusqlite::{params, OptionalExtension};

use super::db::Database;
use super::models::{Cell, Entry};
use super::StoreError;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the IDE's key/value table.
pub trait KeyValueStore {
    /// All keys currently in the store.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// All entries with their values.
    fn entries(&self) -> Result<Vec<Entry>, StoreError>;

    /// Read a single value by exact key.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Delete a single key. Returns true if a row was removed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Overwrite the value of an existing key. Returns true if a row changed.
    fn update(&self, key: &str, value: &str) -> Result<bool, StoreError>;

    /// Start a write transaction.
    fn begin(&self) -> Result<(), StoreError>;

    /// Commit the open write transaction.
    fn commit(&self) -> Result<(), StoreError>;

    /// Abandon the open write transaction.
    fn rollback(&self) -> Result<(), StoreError>;

    /// True while a transaction is open. SQLite ends a transaction on its
    /// own after some errors (disk full, I/O, `RAISE(ROLLBACK)`).
    fn in_transaction(&self) -> bool;
}

// ─── SQLite Implementation ──────────────────────────────────────────────────

pub struct SqliteKeyValueStore<'a> {
    db: &'a Database,
}

impl<'a> SqliteKeyValueStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn value_from_row(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
        Ok(Cell::from_value_ref(row.get_ref(idx)?).as_text())
    }
}

impl<'a> KeyValueStore for SqliteKeyValueStore<'a> {
    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.db.conn().prepare("SELECT key FROM ItemTable")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    fn entries(&self) -> Result<Vec<Entry>, StoreError> {
        let mut stmt = self.db.conn().prepare("SELECT key, value FROM ItemTable")?;
        let rows = stmt.query_map([], |row| {
            let key: String = row.get(0)?;
            let value = Self::value_from_row(row, 1)?;
            Ok(Entry::new(key, value))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .db
            .conn()
            .query_row(
                "SELECT value FROM ItemTable WHERE key = ?1",
                params![key],
                |row| Self::value_from_row(row, 0),
            )
            .optional()?;

        Ok(value.flatten())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let affected = self
            .db
            .conn()
            .execute("DELETE FROM ItemTable WHERE key = ?1", params![key])?;

        if affected > 0 {
            tracing::debug!(key = %key, "Key deleted");
        }
        Ok(affected > 0)
    }

    fn update(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let affected = self.db.conn().execute(
            "UPDATE ItemTable SET value = ?1 WHERE key = ?2",
            params![value, key],
        )?;

        if affected > 0 {
            tracing::debug!(key = %key, "Key updated");
        }
        Ok(affected > 0)
    }

    fn begin(&self) -> Result<(), StoreError> {
        self.db.conn().execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&self) -> Result<(), StoreError> {
        self.db.conn().execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&self) -> Result<(), StoreError> {
        self.db.conn().execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        !self.db.conn().is_autocommit()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
