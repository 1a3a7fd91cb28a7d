// vscdb-scrub - Removal Module
//
// Scan, plan, confirm, mutate, verify. Planning is pure and works on a
// snapshot of entries; execution only ever deletes keys named by a plan.

mod history;
mod plan;
mod remover;
mod session;
mod verify;

pub use history::{
    apply_history_scrub, load_history, scrub_history, HistoryDocument, HistoryOutcome,
};
pub use plan::RemovalPlan;
pub use remover::{remove, Outcome, RemovalItem, RemovalReport};
pub use session::{run_session, SessionOptions, SessionSummary};
pub use verify::{verify_removal, Verification};
