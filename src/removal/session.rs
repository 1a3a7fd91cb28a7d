// vscdb-scrub - Safe removal session
//
// One operator-driven pass over an open store:
//   scan -> plan -> [confirm] -> remove -> [confirm] scrub history -> verify
// The report is written to `out`; structured logs go through tracing.
// A declined gate skips its mutation and leaves the store untouched.

use std::io::Write;

use serde::Serialize;

use crate::classify::Classifier;
use crate::confirm::Confirm;
use crate::error::Result;
use crate::store::KeyValueStore;

use super::history::{apply_history_scrub, load_history, scrub_history, HistoryOutcome};
use super::plan::RemovalPlan;
use super::remover::{remove, Outcome, RemovalReport};
use super::verify::{verify_removal, Verification};

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Also remove keys that matched on value contents only.
    pub include_value_matches: bool,
    /// Offer to scrub the recently-opened history document.
    pub scrub_history: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub plan: RemovalPlan,
    /// True if the operator refused the removal gate.
    pub declined: bool,
    pub removal: Option<RemovalReport>,
    pub history: HistoryOutcome,
    pub verification: Option<Verification>,
}

pub fn run_session<S>(
    store: &S,
    classifier: &Classifier,
    confirm: &mut dyn Confirm,
    options: &SessionOptions,
    out: &mut dyn Write,
) -> Result<SessionSummary>
where
    S: KeyValueStore + ?Sized,
{
    let entries = store.entries()?;
    let plan = RemovalPlan::build(classifier, &entries, options.include_value_matches);
    tracing::info!(
        scanned = entries.len(),
        credential = plan.credential.len(),
        value_only = plan.value_only.len(),
        "Store scanned"
    );

    write_analysis(out, &plan)?;

    let mut summary = SessionSummary {
        plan,
        declined: false,
        removal: None,
        history: HistoryOutcome::Skipped,
        verification: None,
    };

    let keys = summary.plan.keys_to_remove();
    if keys.is_empty() {
        writeln!(out, "\n[INFO] No credential keys identified for removal")?;
        return Ok(summary);
    }

    writeln!(out, "\n[SAFE REMOVAL] Will remove {} credential keys:", keys.len())?;
    for key in &keys {
        writeln!(out, "   - {}", key)?;
    }
    if !confirm.confirm("Remove ONLY these credential keys?") {
        writeln!(out, "[CANCELLED] Removal cancelled; store left unchanged")?;
        summary.declined = true;
        return Ok(summary);
    }

    let report = remove(store, &keys)?;
    write_report(out, &report)?;
    summary.removal = Some(report);

    if options.scrub_history {
        summary.history = history_step(store, classifier, confirm, out)?;
    }

    let verification = verify_removal(store, classifier)?;
    write_verification(out, &verification)?;
    summary.verification = Some(verification);

    Ok(summary)
}

fn history_step<S>(
    store: &S,
    classifier: &Classifier,
    confirm: &mut dyn Confirm,
    out: &mut dyn Write,
) -> Result<HistoryOutcome>
where
    S: KeyValueStore + ?Sized,
{
    let profile = classifier.profile();

    let document = match load_history(store, &profile.history_key) {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            writeln!(out, "\n[INFO] No history to clean up")?;
            return Ok(HistoryOutcome::NothingToScrub);
        }
        Err(e) => {
            writeln!(out, "\n[ERROR] Failed to read history: {}", e)?;
            return Ok(HistoryOutcome::Failed { error: e.to_string() });
        }
    };

    let (filtered, removed) = scrub_history(&document, &profile.history_markers);
    if removed.is_empty() {
        writeln!(out, "\n[INFO] No {} entries in history", profile.name)?;
        return Ok(HistoryOutcome::NoMatches);
    }

    writeln!(out, "\n[HISTORY CLEANUP] Found {} {} entries in history:", removed.len(), profile.name)?;
    for uri in &removed {
        writeln!(out, "   - {}", uri)?;
    }

    let prompt = format!("Remove {} entries from history?", removed.len());
    if !confirm.confirm(&prompt) {
        writeln!(out, "[SKIPPED] History cleanup cancelled")?;
        return Ok(HistoryOutcome::Declined { matched: removed.len() });
    }

    match apply_history_scrub(store, &profile.history_key, &filtered) {
        Ok(false) => {
            writeln!(out, "[INFO] History entry disappeared before cleanup; nothing written")?;
            Ok(HistoryOutcome::NothingToScrub)
        }
        Ok(true) => {
            writeln!(out, "[CLEANED] Removed {} entries from history", removed.len())?;
            Ok(HistoryOutcome::Cleaned { removed: removed.len() })
        }
        Err(e) => {
            writeln!(out, "[ERROR] Failed to clean history: {}", e)?;
            Ok(HistoryOutcome::Failed { error: e.to_string() })
        }
    }
}

fn write_analysis(out: &mut dyn Write, plan: &RemovalPlan) -> std::io::Result<()> {
    writeln!(out, "\n[ANALYSIS] {} credential keys found", plan.credential.len())?;
    for (i, result) in plan.credential.iter().enumerate() {
        writeln!(out, "\n   {}. {}", i + 1, result.key)?;
        writeln!(out, "      Status: CREDENTIAL")?;
        writeln!(out, "      Reason: {}", result.reason)?;
        if !result.preview.is_empty() {
            writeln!(out, "      Preview:")?;
            for (field, value) in &result.preview {
                writeln!(out, "         {}: {}", field, value)?;
            }
        }
    }

    if !plan.value_only.is_empty() {
        writeln!(
            out,
            "\n[FLAGGED] {} keys match on value contents only ({}):",
            plan.value_only.len(),
            plan.value_only_verdict()
        )?;
        for result in &plan.value_only {
            writeln!(out, "   ? {}", result.key)?;
        }
    }

    writeln!(out, "\n[INFO] {} unrelated keys left untouched", plan.unclear.len())?;
    Ok(())
}

fn write_report(out: &mut dyn Write, report: &RemovalReport) -> std::io::Result<()> {
    for item in &report.items {
        match &item.outcome {
            Outcome::Removed => writeln!(out, "[REMOVED] {}", item.key)?,
            Outcome::NotFound => writeln!(out, "[NOT_FOUND] {} (already absent)", item.key)?,
            Outcome::Failed { error } => {
                writeln!(out, "[ERROR] Failed to remove {}: {}", item.key, error)?
            }
        }
    }
    writeln!(
        out,
        "\n[SUCCESS] Removed {} credential keys ({} not found, {} failed)",
        report.removed(),
        report.not_found(),
        report.failed()
    )
}

fn write_verification(out: &mut dyn Write, verification: &Verification) -> std::io::Result<()> {
    writeln!(out, "\n[VERIFY] Re-scanning store...")?;
    if verification.is_clean() {
        writeln!(out, "[SUCCESS] No target keys remain; other data untouched")
    } else {
        writeln!(out, "[WARNING] {} target keys remain:", verification.remaining.len())?;
        for key in &verification.remaining {
            writeln!(out, "   - {}", key)?;
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use crate::config::TargetProfile;
    use crate::removal::HistoryDocument;
    use crate::store::{Database, Entry, SqliteKeyValueStore, StoreError};

    /// Answers gates from a fixed script; refuses once the script runs out.
    struct Scripted {
        answers: VecDeque<bool>,
        asked: Vec<String>,
    }

    impl Scripted {
        fn new(answers: &[bool]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Confirm for Scripted {
        fn confirm(&mut self, prompt: &str) -> bool {
            self.asked.push(prompt.to_string());
            self.answers.pop_front().unwrap_or(false)
        }
    }

    const HISTORY: &str = r#"{"entries":[{"folderUri":"file:///work/app"},{"folderUri":"file:///work/blackbox-demo"}]}"#;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute_batch(
                "INSERT INTO ItemTable (key, value) VALUES ('Blackboxapp.blackboxagent', '{\"userId\":\"u1\"}');
                 INSERT INTO ItemTable (key, value) VALUES ('other.setting', 'true');",
            )
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO ItemTable (key, value) VALUES ('history.recentlyOpenedPathsList', ?1)",
                [HISTORY],
            )
            .unwrap();
        db
    }

    fn options() -> SessionOptions {
        SessionOptions {
            include_value_matches: false,
            scrub_history: true,
        }
    }

    #[test]
    fn test_confirmed_session_removes_and_verifies() {
        let db = seeded();
        let store = SqliteKeyValueStore::new(&db);
        let classifier = Classifier::new(TargetProfile::default());
        let mut confirm = Scripted::new(&[true, true]);
        let mut out = Vec::new();

        let summary = run_session(&store, &classifier, &mut confirm, &options(), &mut out).unwrap();

        assert!(!summary.declined);
        assert_eq!(summary.removal.as_ref().unwrap().removed(), 1);
        assert_eq!(summary.history, HistoryOutcome::Cleaned { removed: 1 });
        assert!(summary.verification.unwrap().is_clean());
        assert_eq!(store.get("other.setting").unwrap(), Some("true".to_string()));

        let history = HistoryDocument::parse(
            &store.get("history.recentlyOpenedPathsList").unwrap().unwrap(),
        )
        .unwrap();
        assert_eq!(history.entries.len(), 1);

        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("[REMOVED] Blackboxapp.blackboxagent"));
    }

    #[test]
    fn test_declined_removal_leaves_store_untouched() {
        let db = seeded();
        let store = SqliteKeyValueStore::new(&db);
        let classifier = Classifier::new(TargetProfile::default());
        let mut confirm = Scripted::new(&[false]);
        let mut out = Vec::new();

        let summary = run_session(&store, &classifier, &mut confirm, &options(), &mut out).unwrap();

        assert!(summary.declined);
        assert!(summary.removal.is_none());
        assert_eq!(confirm.asked.len(), 1, "History gate must not be reached");
        assert_eq!(store.keys().unwrap().len(), 3);
        assert_eq!(
            store.get("history.recentlyOpenedPathsList").unwrap().as_deref(),
            Some(HISTORY)
        );
    }

    #[test]
    fn test_declined_history_keeps_document() {
        let db = seeded();
        let store = SqliteKeyValueStore::new(&db);
        let classifier = Classifier::new(TargetProfile::default());
        let mut confirm = Scripted::new(&[true, false]);
        let mut out = Vec::new();

        let summary = run_session(&store, &classifier, &mut confirm, &options(), &mut out).unwrap();

        assert_eq!(summary.history, HistoryOutcome::Declined { matched: 1 });
        assert_eq!(
            store.get("history.recentlyOpenedPathsList").unwrap().as_deref(),
            Some(HISTORY)
        );
        assert!(summary.verification.unwrap().is_clean());
    }

    #[test]
    fn test_nothing_to_remove_asks_nothing() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute_batch("INSERT INTO ItemTable (key, value) VALUES ('other.setting', 'true');")
            .unwrap();
        let store = SqliteKeyValueStore::new(&db);
        let classifier = Classifier::new(TargetProfile::default());
        let mut confirm = Scripted::new(&[true]);
        let mut out = Vec::new();

        let summary = run_session(&store, &classifier, &mut confirm, &options(), &mut out).unwrap();

        assert!(summary.plan.is_empty());
        assert!(confirm.asked.is_empty());
        assert!(summary.removal.is_none());
    }

    #[test]
    fn test_malformed_history_is_nothing_to_scrub() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute_batch(
                "INSERT INTO ItemTable (key, value) VALUES ('blackboxai-dev.panel', '1');
                 INSERT INTO ItemTable (key, value) VALUES ('history.recentlyOpenedPathsList', 'not json');",
            )
            .unwrap();
        let store = SqliteKeyValueStore::new(&db);
        let classifier = Classifier::new(TargetProfile::default());
        let mut confirm = Scripted::new(&[true, true]);
        let mut out = Vec::new();

        let summary = run_session(&store, &classifier, &mut confirm, &options(), &mut out).unwrap();

        assert_eq!(summary.history, HistoryOutcome::NothingToScrub);
        assert_eq!(confirm.asked.len(), 1);
        assert_eq!(
            store.get("history.recentlyOpenedPathsList").unwrap().as_deref(),
            Some("not json")
        );
    }

    #[test]
    fn test_value_only_keys_survive_without_opt_in() {
        let db = seeded();
        db.conn()
            .execute_batch(
                "INSERT INTO ItemTable (key, value) VALUES ('some.provider', '{\"apiProvider\":\"x\"}');",
            )
            .unwrap();
        let store = SqliteKeyValueStore::new(&db);
        let classifier = Classifier::new(TargetProfile::default());
        let mut confirm = Scripted::new(&[true, false]);
        let mut out = Vec::new();

        let summary = run_session(&store, &classifier, &mut confirm, &options(), &mut out).unwrap();

        assert_eq!(summary.plan.value_only.len(), 1);
        assert!(store.get("some.provider").unwrap().is_some());
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("[FLAGGED] 1 keys"));
    }

    /// Delegates to SQLite but behaves as if the history row vanished
    /// between the read and the write.
    struct VanishingHistory<'a>(SqliteKeyValueStore<'a>);

    impl KeyValueStore for VanishingHistory<'_> {
        fn keys(&self) -> std::result::Result<Vec<String>, StoreError> {
            self.0.keys()
        }

        fn entries(&self) -> std::result::Result<Vec<Entry>, StoreError> {
            self.0.entries()
        }

        fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
            self.0.get(key)
        }

        fn delete(&self, key: &str) -> std::result::Result<bool, StoreError> {
            self.0.delete(key)
        }

        fn update(&self, _key: &str, _value: &str) -> std::result::Result<bool, StoreError> {
            Ok(false)
        }

        fn begin(&self) -> std::result::Result<(), StoreError> {
            self.0.begin()
        }

        fn commit(&self) -> std::result::Result<(), StoreError> {
            self.0.commit()
        }

        fn rollback(&self) -> std::result::Result<(), StoreError> {
            self.0.rollback()
        }

        fn in_transaction(&self) -> bool {
            self.0.in_transaction()
        }
    }

    #[test]
    fn test_history_row_gone_at_write_is_not_cleaned() {
        let db = seeded();
        let store = VanishingHistory(SqliteKeyValueStore::new(&db));
        let classifier = Classifier::new(TargetProfile::default());
        let mut confirm = Scripted::new(&[true, true]);
        let mut out = Vec::new();

        let summary = run_session(&store, &classifier, &mut confirm, &options(), &mut out).unwrap();

        assert_eq!(summary.history, HistoryOutcome::NothingToScrub);
        let report = String::from_utf8(out).unwrap();
        assert!(!report.contains("[CLEANED]"));
        assert!(report.contains("nothing written"));
    }

    #[test]
    fn test_analysis_reports_profile_opt_in_for_value_only_keys() {
        let db = seeded();
        db.conn()
            .execute_batch(
                "INSERT INTO ItemTable (key, value) VALUES ('some.provider', '{\"apiProvider\":\"x\"}');",
            )
            .unwrap();
        let store = SqliteKeyValueStore::new(&db);
        let profile = TargetProfile {
            allow_value_only_match: true,
            ..TargetProfile::default()
        };
        let classifier = Classifier::new(profile);
        let mut confirm = Scripted::new(&[false]);
        let mut out = Vec::new();

        run_session(&store, &classifier, &mut confirm, &SessionOptions::default(), &mut out).unwrap();

        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("value contents only (will be removed)"));
        assert!(report.contains("   - some.provider"));
    }
}
