// vscdb-scrub - Library root
//
// Re-exports the store, classification, removal, inspection and CLI modules.

pub mod backup;
pub mod classify;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod error;
pub mod inspect;
pub mod removal;
pub mod store;

pub use error::{Result, ScrubError};
