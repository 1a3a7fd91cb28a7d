// vscdb-scrub - Top-level error types
//
// Aggregates errors from the store and configuration modules into a single
// error enum for the application boundary. Malformed JSON values and
// declined confirmations are never errors; they are handled where they occur.

use thiserror::Error;

/// Top-level error type for all vscdb-scrub operations.
#[derive(Debug, Error)]
pub enum ScrubError {
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Backup failed: {0}")]
    Backup(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ScrubError>;
