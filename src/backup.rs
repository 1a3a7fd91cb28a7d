// vscdb-scrub - Store backup
//
// A byte-for-byte copy of the store file taken before any mutation, named
// `<file>.safe_backup_<YYYYmmdd_HHMMSS>` next to the original.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{Result, ScrubError};

/// Backup path for `db_path` at time `at`.
pub fn backup_path(db_path: &Path, at: DateTime<Local>) -> PathBuf {
    let mut name = db_path.as_os_str().to_os_string();
    name.push(format!(".safe_backup_{}", at.format("%Y%m%d_%H%M%S")));
    PathBuf::from(name)
}

/// Copy the store file to a timestamped sibling. Refuses to overwrite an
/// existing backup.
pub fn create_backup(db_path: &Path) -> Result<PathBuf> {
    let target = backup_path(db_path, Local::now());
    if target.exists() {
        return Err(ScrubError::Backup(format!(
            "{} already exists",
            target.display()
        )));
    }

    let bytes = std::fs::copy(db_path, &target)
        .map_err(|e| ScrubError::Backup(format!("{}: {}", db_path.display(), e)))?;

    tracing::info!(backup = %target.display(), bytes, "Backup created");
    Ok(target)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
