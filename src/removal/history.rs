// vscdb-scrub - Recently-opened history scrubber
//
// The history value is a JSON object with an `entries` list; each entry may
// carry a `folderUri`. Entries whose lower-cased `folderUri` contains any
// marker are dropped. Other fields of the document and of each entry are
// preserved as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::{KeyValueStore, StoreError};

use super::remover::abandon_transaction;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryDocument {
    #[serde(default)]
    pub entries: Vec<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl HistoryDocument {
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

/// What happened to the history document during a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HistoryOutcome {
    /// Scrubbing was not requested.
    Skipped,
    /// No history value, or it is not a JSON history document.
    NothingToScrub,
    /// The document has no entries matching the markers.
    NoMatches,
    Declined { matched: usize },
    Cleaned { removed: usize },
    Failed { error: String },
}

fn folder_uri(entry: &Value) -> &str {
    entry.get("folderUri").and_then(Value::as_str).unwrap_or("")
}

/// Split `document` into the kept document and the `folderUri`s of dropped
/// entries. Kept entries stay in their original relative order.
pub fn scrub_history(document: &HistoryDocument, markers: &[String]) -> (HistoryDocument, Vec<String>) {
    let markers: Vec<String> = markers.iter().map(|m| m.to_lowercase()).collect();
    let mut kept = Vec::with_capacity(document.entries.len());
    let mut removed = Vec::new();

    for entry in &document.entries {
        let uri = folder_uri(entry);
        let lowered = uri.to_lowercase();
        if markers.iter().any(|m| lowered.contains(m.as_str())) {
            removed.push(uri.to_string());
        } else {
            kept.push(entry.clone());
        }
    }

    let filtered = HistoryDocument {
        entries: kept,
        other: document.other.clone(),
    };
    (filtered, removed)
}

/// Read and parse the history document. A missing value or one that is not
/// a history document yields `None`; only store errors propagate.
pub fn load_history<S>(store: &S, key: &str) -> Result<Option<HistoryDocument>, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let Some(text) = store.get(key)? else {
        tracing::debug!(key = %key, "No history value in store");
        return Ok(None);
    };

    let document = HistoryDocument::parse(&text);
    if document.is_none() {
        tracing::warn!(key = %key, "History value is not a valid history document; skipping");
    }
    Ok(document)
}

/// Write the filtered document back under `key` and commit. Returns false
/// if no row named `key` exists. On error the transaction is rolled back.
pub fn apply_history_scrub<S>(store: &S, key: &str, document: &HistoryDocument) -> Result<bool, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let text = serde_json::to_string(document)?;
    store.begin()?;

    let written = store.update(key, &text).and_then(|updated| {
        store.commit()?;
        Ok(updated)
    });

    match written {
        Ok(true) => {
            tracing::info!(key = %key, entries = document.entries.len(), "History document rewritten");
            Ok(true)
        }
        Ok(false) => {
            tracing::warn!(key = %key, "History key vanished before rewrite");
            Ok(false)
        }
        Err(e) => {
            abandon_transaction(store);
            Err(e)
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
