// vscdb-scrub - Credential Key Remover
//
// Deletes confirmed keys one at a time inside a single transaction. A key
// whose delete fails is recorded and skipped; the rest still proceed, and
// the transaction is committed exactly once at the end.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::store::{KeyValueStore, StoreError};

/// Per-key result of a removal attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Removed,
    /// Key was already absent. Not an error.
    NotFound,
    Failed { error: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Removed => write!(f, "REMOVED"),
            Outcome::NotFound => write!(f, "NOT_FOUND"),
            Outcome::Failed { error } => write!(f, "FAILED ({})", error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalItem {
    pub key: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    pub items: Vec<RemovalItem>,
}

impl RemovalReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn removed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Removed))
    }

    pub fn not_found(&self) -> usize {
        self.count(|o| matches!(o, Outcome::NotFound))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }
}

/// Delete `keys` from the store. The caller is responsible for having
/// obtained confirmation and for passing only classified credential keys.
///
/// An empty key list is a no-op: no transaction is opened. Duplicate keys
/// are attempted once. Every key gets an outcome, including when SQLite
/// abandons the whole transaction after an error: deletes undone that way
/// are reported as `Failed` and the remaining keys run in a new transaction.
/// Only a failure to open the first transaction is returned as an error.
pub fn remove<S>(store: &S, keys: &[String]) -> Result<RemovalReport, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let mut report = RemovalReport::default();
    if keys.is_empty() {
        return Ok(report);
    }

    let mut seen = HashSet::new();
    let unique: Vec<&String> = keys.iter().filter(|k| seen.insert(k.as_str())).collect();

    store.begin()?;

    // Indexes into `report.items` of deletes not yet committed.
    let mut uncommitted: Vec<usize> = Vec::new();

    for (pos, key) in unique.iter().enumerate() {
        let outcome = match store.delete(key) {
            Ok(true) => {
                tracing::info!(key = %key, "Credential key removed");
                uncommitted.push(report.items.len());
                Outcome::Removed
            }
            Ok(false) => {
                tracing::debug!(key = %key, "Credential key already absent");
                Outcome::NotFound
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to remove credential key");
                Outcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        let failed = matches!(outcome, Outcome::Failed { .. });
        report.items.push(RemovalItem {
            key: (*key).clone(),
            outcome,
        });

        if failed && !store.in_transaction() {
            mark_failed(
                &mut report,
                &mut uncommitted,
                &format!("rolled back after failure on {}", key),
            );

            if let Err(e) = store.begin() {
                tracing::warn!(error = %e, "Could not restart removal transaction");
                for rest in &unique[pos + 1..] {
                    report.items.push(RemovalItem {
                        key: (*rest).clone(),
                        outcome: Outcome::Failed {
                            error: format!("not attempted: {}", e),
                        },
                    });
                }
                return Ok(report);
            }
        }
    }

    if let Err(e) = store.commit() {
        tracing::warn!(error = %e, "Removal commit failed");
        abandon_transaction(store);
        mark_failed(&mut report, &mut uncommitted, &format!("commit failed: {}", e));
    }

    tracing::info!(
        removed = report.removed(),
        not_found = report.not_found(),
        failed = report.failed(),
        "Removal finished"
    );

    Ok(report)
}

/// Downgrade deletes that never reached the file.
fn mark_failed(report: &mut RemovalReport, uncommitted: &mut Vec<usize>, reason: &str) {
    for idx in uncommitted.drain(..) {
        tracing::warn!(key = %report.items[idx].key, "Removal undone: {}", reason);
        report.items[idx].outcome = Outcome::Failed {
            error: reason.to_string(),
        };
    }
}

/// Roll back the open transaction, if SQLite has not already done so, so
/// the write lock is released.
pub(super) fn abandon_transaction<S>(store: &S)
where
    S: KeyValueStore + ?Sized,
{
    if store.in_transaction() {
        if let Err(e) = store.rollback() {
            tracing::warn!(error = %e, "Rollback failed");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
