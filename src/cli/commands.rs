// vscdb-scrub - CLI Command Handlers
//
// Each function handles one CLI subcommand. Inspection commands open the
// store read-only; only `remove` opens it for writing, and only after the
// operator has agreed to continue and a backup exists.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::backup::create_backup;
use crate::classify::Classifier;
use crate::config::TargetProfile;
use crate::confirm::{AssumeYes, Confirm, StdinConfirm};
use crate::error::ScrubError;
use crate::inspect::{self, TableData, DEFAULT_MAX_LEN};
use crate::removal::{run_session, verify_removal, RemovalPlan, SessionOptions};
use crate::store::{resolve_path, Database, KeyValueStore, SqliteKeyValueStore};

use super::{Cli, Commands};

/// Execute the parsed CLI command.
pub fn execute(cli: Cli) -> Result<(), ScrubError> {
    let path = resolve_path(cli.file.as_deref())?;
    let profile = TargetProfile::load_or_default(cli.profile.as_deref())?;

    match cli.command {
        Commands::Info => cmd_info(&path),
        Commands::Show {
            table,
            limit,
            all,
            search,
        } => cmd_show(&path, &table, (!all).then_some(limit), search.as_deref()),
        Commands::Search { term, limit } => cmd_search(&path, &term, limit),
        Commands::Export {
            output,
            search,
            compact,
        } => cmd_export(&path, output, search.as_deref(), !compact),
        Commands::Scan { json } => cmd_scan(&path, profile, json),
        Commands::Remove {
            yes,
            no_backup,
            skip_history,
            include_value_matches,
        } => {
            let mut confirm: Box<dyn Confirm> = if yes {
                Box::new(AssumeYes)
            } else {
                Box::new(StdinConfirm)
            };
            let options = SessionOptions {
                include_value_matches,
                scrub_history: !skip_history,
            };
            cmd_remove(&path, profile, confirm.as_mut(), &options, !no_backup)
        }
        Commands::Verify => cmd_verify(&path, profile),
    }
}

// ─── Inspection (Info, Show, Search, Export) ─────────────────────────────────

fn cmd_info(path: &Path) -> Result<(), ScrubError> {
    let db = Database::open_read_only(path)?;
    let size = std::fs::metadata(path)?.len();

    println!("{:=<60}", "");
    println!("[DATABASE INFO]");
    println!("{:=<60}", "");
    println!("[FILE] {}", path.display());
    println!("[DATE] Accessed on: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!(
        "[SIZE] File size: {} bytes ({:.2} MB)",
        size,
        size as f64 / 1024.0 / 1024.0
    );

    let summaries = inspect::table_summaries(&db)?;
    println!("\n[TABLES] Found {} tables:", summaries.len());
    for summary in &summaries {
        println!("   - {}: {} record(s)", summary.name, summary.row_count);
    }
    println!("{:=<60}", "");

    Ok(())
}

fn cmd_show(
    path: &Path,
    table: &str,
    limit: Option<usize>,
    search: Option<&str>,
) -> Result<(), ScrubError> {
    let db = Database::open_read_only(path)?;
    print_table(&db, table, limit, search)
}

fn cmd_search(path: &Path, term: &str, limit: usize) -> Result<(), ScrubError> {
    let db = Database::open_read_only(path)?;

    println!("[SEARCHING] '{}'", term);
    for table in db.tables()? {
        print_table(&db, &table, Some(limit), Some(term))?;
    }

    Ok(())
}

fn cmd_export(
    path: &Path,
    output: PathBuf,
    search: Option<&str>,
    pretty: bool,
) -> Result<(), ScrubError> {
    let db = Database::open_read_only(path)?;
    let document = inspect::build_export(&db, search)?;
    inspect::write_export(&document, &output, pretty)?;

    println!("✓ Exported {} tables", document.tables.len());
    println!("  Output: {}", output.display());

    Ok(())
}

fn print_table(
    db: &Database,
    table: &str,
    limit: Option<usize>,
    search: Option<&str>,
) -> Result<(), ScrubError> {
    println!("\n[TABLE DATA] {}", table);
    println!("{:-<60}", "");

    let total = inspect::row_count(db, table)?;
    let data: TableData = match search {
        Some(term) => {
            let mut found = inspect::search(db, table, term)?;
            println!("[SEARCH] '{}' - found {} results", term, found.rows.len());
            if let Some(limit) = limit {
                found.rows.truncate(limit);
            }
            found
        }
        None => {
            let rows = inspect::rows(db, table, limit)?;
            println!("[SHOWING] {} of {} records", rows.rows.len(), total);
            rows
        }
    };
    println!("[COLUMNS] {}", data.columns.join(", "));
    println!("{:-<60}", "");

    if data.rows.is_empty() {
        println!("[NO DATA] No data found");
        return Ok(());
    }

    for (i, row) in data.rows.iter().enumerate() {
        println!("\n[RECORD #{}]", i + 1);
        for (column, cell) in data.columns.iter().zip(row) {
            let value = inspect::format_value(cell, DEFAULT_MAX_LEN);
            if value.contains('\n') {
                println!("   {}:", column);
                for line in value.lines() {
                    println!("      {}", line);
                }
            } else {
                println!("   {}: {}", column, value);
            }
        }
        println!("{:-<40}", "");
    }

    Ok(())
}

// ─── Scan ────────────────────────────────────────────────────────────────────

fn cmd_scan(path: &Path, profile: TargetProfile, json: bool) -> Result<(), ScrubError> {
    let db = Database::open_read_only(path)?;
    let store = SqliteKeyValueStore::new(&db);
    let classifier = Classifier::new(profile);

    let entries = store.entries()?;
    let plan = RemovalPlan::build(&classifier, &entries, false);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("[SCAN] {} keys in {}", entries.len(), path.display());
    println!("[PROFILE] {}", classifier.profile().name);

    if plan.credential.is_empty() {
        println!("\nNo {} credential keys found.", classifier.profile().name);
    } else {
        println!("\nCredential keys ({}):", plan.credential.len());
        for result in &plan.credential {
            println!("  {} │ {}", result.key, result.reason);
        }
    }

    if !plan.value_only.is_empty() {
        println!(
            "\nValue-only matches ({}), {}:",
            plan.value_only.len(),
            plan.value_only_verdict()
        );
        for result in &plan.value_only {
            println!("  {} │ {}", result.key, result.reason);
        }
    }

    println!("\n{} other keys are unrelated.", plan.unclear.len());
    Ok(())
}

// ─── Remove ──────────────────────────────────────────────────────────────────

fn cmd_remove(
    path: &Path,
    profile: TargetProfile,
    confirm: &mut dyn Confirm,
    options: &SessionOptions,
    backup: bool,
) -> Result<(), ScrubError> {
    println!("[DATABASE] Using file: {}", path.display());
    println!("\n[SAFE MODE]");
    println!("1. Only keys identified as {} credentials are removed", profile.name);
    println!("2. Other IDE data (settings, other extensions) is left alone");
    println!("3. A backup is created first{}", if backup { "" } else { " (disabled)" });
    println!("4. Every removal and history change is confirmed separately");
    println!("\nClose the IDE before continuing; it may rewrite the store while open.");

    if !confirm.confirm("\nContinue with safe analysis?") {
        println!("[CANCELLED] Nothing was changed");
        return Ok(());
    }

    let backup_path = if backup {
        let target = create_backup(path)?;
        println!("[BACKUP] Created: {}", target.display());
        Some(target)
    } else {
        tracing::warn!("Running without a backup");
        None
    };

    let db = Database::open(path)?;
    let store = SqliteKeyValueStore::new(&db);
    let classifier = Classifier::new(profile);

    let summary = run_session(&store, &classifier, confirm, options, &mut io::stdout())?;

    if summary.verification.as_ref().is_some_and(|v| v.is_clean()) {
        println!("\n[COMPLETED] {} credentials removed", classifier.profile().name);
        if let Some(target) = backup_path {
            println!("[BACKUP] Backup kept at: {}", target.display());
        }
        println!("[NEXT] Reopen the IDE; the extension should appear logged out.");
    }

    Ok(())
}

// ─── Verify ──────────────────────────────────────────────────────────────────

fn cmd_verify(path: &Path, profile: TargetProfile) -> Result<(), ScrubError> {
    let db = Database::open_read_only(path)?;
    let store = SqliteKeyValueStore::new(&db);
    let classifier = Classifier::new(profile);

    let verification = verify_removal(&store, &classifier)?;
    if verification.is_clean() {
        println!("✓ No {} keys remain", classifier.profile().name);
        return Ok(());
    }

    println!("{} {} keys remain:", verification.remaining.len(), classifier.profile().name);
    for key in &verification.remaining {
        println!("  - {}", key);
    }
    Err(ScrubError::Other(format!(
        "{} target keys still present",
        verification.remaining.len()
    )))
}
