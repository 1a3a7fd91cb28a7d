// vscdb-scrub - SQLite Database Management
//
// Opens an existing `state.vscdb` file. Unlike a store we own, the file is
// never created and never migrated: opening a path that does not exist, or
// that is not a SQLite database, is a fatal `StoreError::Unavailable`.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use super::StoreError;

/// Name of the key/value table the IDE keeps its state in.
pub const ITEM_TABLE: &str = "ItemTable";

/// Wrapper around a SQLite connection to an IDE state store.
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    /// Open an existing store for reading and writing.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    /// Open an existing store without write access. Used by the inspection
    /// commands so a read can never mutate the file.
    pub fn open_read_only(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    fn open_with_flags(path: &Path, flags: OpenFlags) -> Result<Self, StoreError> {
        if !path.is_file() {
            return Err(StoreError::unavailable(path, "file not found"));
        }

        let conn = Connection::open_with_flags(path, flags)
            .map_err(|e| StoreError::unavailable(path, e.to_string()))?;

        // SQLite opens lazily; a non-database file only fails on first read.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| StoreError::unavailable(path, e.to_string()))?;

        tracing::debug!(path = %path.display(), "Store opened");

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Open an in-memory store with an empty `ItemTable` (testing only).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB);",
        )?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    /// Get a reference to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Path of the file this store was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of all tables, in `sqlite_master` order.
    pub fn tables(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    /// Return the table name quoted as an identifier, or `UnknownTable` if
    /// it is not one of the store's tables. Table names are never spliced
    /// into SQL without passing through here.
    pub fn checked_table(&self, table: &str) -> Result<String, StoreError> {
        if self.tables()?.iter().any(|t| t == table) {
            Ok(quote_ident(table))
        } else {
            Err(StoreError::UnknownTable(table.to_string()))
        }
    }
}

/// Quote an SQL identifier, doubling any embedded quotes.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Locations probed, in order, when no store path is given.
pub fn default_locations() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(config) = dirs_next::config_dir() {
        paths.push(
            config
                .join("Cursor")
                .join("User")
                .join("globalStorage")
                .join("state.vscdb"),
        );
    }
    paths.push(PathBuf::from("./state.vscdb"));
    paths.push(PathBuf::from("./state(2).vscdb"));
    paths
}

/// Resolve the store path: an explicit path must exist; otherwise the first
/// existing default location wins.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, StoreError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(StoreError::unavailable(path, "file not found"));
    }

    let candidates = default_locations();
    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        return Ok(found.clone());
    }

    let tried = candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(StoreError::Other(format!(
        "state.vscdb not found in default locations (tried: {}); pass --file",
        tried
    )))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
