// vscdb-scrub - CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: info, show, search, export, scan, remove, verify.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::execute;

/// vscdb-scrub - Inspect an IDE state store and safely remove one
/// extension's stored credentials.
#[derive(Parser, Debug)]
#[command(name = "vscdb-scrub")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the state.vscdb file. Defaults to the first existing
    /// well-known location.
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// TOML target profile. Defaults to the built-in Blackbox profile.
    #[arg(long, global = true)]
    pub profile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show file size and the tables with their row counts.
    Info,

    /// Display rows of one table.
    Show {
        /// Table name.
        #[arg(default_value = crate::store::ITEM_TABLE)]
        table: String,

        /// Maximum number of rows to display.
        #[arg(long, default_value = "10", conflicts_with = "all")]
        limit: usize,

        /// Display every row.
        #[arg(long)]
        all: bool,

        /// Only show rows containing this keyword.
        #[arg(long)]
        search: Option<String>,
    },

    /// Search every table for a keyword (case-insensitive).
    Search {
        /// The keyword to look for in any column.
        term: String,

        /// Maximum number of rows to display per table.
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Export all tables to a JSON file.
    Export {
        /// Output file.
        output: PathBuf,

        /// Only export rows containing this keyword.
        #[arg(long)]
        search: Option<String>,

        /// Write compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },

    /// Classify every key and report what a removal would delete (read-only).
    Scan {
        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Back up the store, then remove the target extension's credential keys.
    Remove {
        /// Answer yes to every confirmation.
        #[arg(long, short = 'y')]
        yes: bool,

        /// Skip the automatic backup.
        #[arg(long)]
        no_backup: bool,

        /// Leave the recently-opened history untouched.
        #[arg(long)]
        skip_history: bool,

        /// Also remove keys that matched on value contents only.
        #[arg(long)]
        include_value_matches: bool,
    },

    /// Re-scan the store and report any remaining target keys.
    Verify,
}
