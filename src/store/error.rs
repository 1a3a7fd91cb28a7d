// vscdb-scrub - Store error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file is missing or could not be opened as a database.
    #[error("Store unavailable at {path}: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    pub fn unavailable(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
