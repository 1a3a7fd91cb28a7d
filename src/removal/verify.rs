// vscdb-scrub - Post-removal verification
//
// Always re-reads the live key list; a removal report is never taken as
// proof, since the IDE may have rewritten the store in the meantime.

use serde::Serialize;

use crate::classify::Classifier;
use crate::store::{KeyValueStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// Keys that still match the key rule.
    pub remaining: Vec<String>,
}

impl Verification {
    pub fn is_clean(&self) -> bool {
        self.remaining.is_empty()
    }
}

pub fn verify_removal<S>(store: &S, classifier: &Classifier) -> Result<Verification, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let keys = store.keys()?;
    let remaining: Vec<String> = classifier
        .remaining(&keys)
        .into_iter()
        .map(str::to_string)
        .collect();

    if remaining.is_empty() {
        tracing::info!("Verification passed: no target keys remain");
    } else {
        tracing::warn!(remaining = remaining.len(), "Verification found remaining target keys");
    }

    Ok(Verification { remaining })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
