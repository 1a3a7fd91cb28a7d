// vscdb-scrub - Application Entry Point
//
// Parses CLI arguments, initializes structured logging on stderr (values
// read from the store are never logged), and dispatches to the command
// handler.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vscdb_scrub::cli::{execute, Cli};

fn main() {
    // RUST_LOG=vscdb_scrub=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vscdb_scrub=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
