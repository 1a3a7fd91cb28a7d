// vscdb-scrub - Operator confirmation channel
//
// Every mutation is gated by a yes/no question. Anything other than an
// explicit "yes" or "y" counts as a refusal, including read errors and EOF.

use std::io::{self, BufRead, Write};

pub trait Confirm {
    /// Ask the operator; true only on an affirmative answer.
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Accepts `yes` or `y` in any case, ignoring surrounding whitespace.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "yes" | "y")
}

/// Interactive prompt on stdin/stdout.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        let mut stdout = io::stdout();
        if write!(stdout, "{} (yes/no): ", prompt).and_then(|_| stdout.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_affirmative(&answer),
        }
    }
}

/// Non-interactive mode (`--yes`): every gate is answered affirmatively.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, prompt: &str) -> bool {
        tracing::info!(prompt = %prompt, "Auto-confirmed");
        true
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
