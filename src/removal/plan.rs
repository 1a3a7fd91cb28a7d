// vscdb-scrub - Removal planning
//
// Pure: a plan is built from a snapshot of entries and never touches a store.

use serde::Serialize;

use crate::classify::{ClassificationResult, Classifier};
use crate::store::Entry;

/// Partition of a store snapshot into what will and will not be removed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemovalPlan {
    /// Key-rule matches. Always removed once confirmed.
    pub credential: Vec<ClassificationResult>,
    /// Credential verdicts reached only through value contents.
    pub value_only: Vec<ClassificationResult>,
    /// Everything else, by key.
    pub unclear: Vec<String>,
    /// Whether `value_only` entries are part of the removal set.
    pub include_value_only: bool,
}

impl RemovalPlan {
    /// Classify every entry. Value-only matches are removed only when
    /// `include_value_only` is set or the profile opts in.
    pub fn build(classifier: &Classifier, entries: &[Entry], include_value_only: bool) -> Self {
        let mut plan = RemovalPlan {
            include_value_only: include_value_only || classifier.profile().allow_value_only_match,
            ..Default::default()
        };

        for entry in entries {
            let result = classifier.classify(&entry.key, entry.value.as_deref());
            if !result.is_credential {
                plan.unclear.push(result.key);
            } else if result.is_value_only() {
                plan.value_only.push(result);
            } else {
                plan.credential.push(result);
            }
        }

        plan
    }

    /// Keys the execution phase will delete, in scan order.
    pub fn keys_to_remove(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.credential.iter().map(|r| r.key.clone()).collect();
        if self.include_value_only {
            keys.extend(self.value_only.iter().map(|r| r.key.clone()));
        }
        keys
    }

    /// What a removal run does with `value_only` entries, for display.
    pub fn value_only_verdict(&self) -> &'static str {
        if self.include_value_only {
            "will be removed"
        } else {
            "kept; pass --include-value-matches to remove"
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys_to_remove().is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
