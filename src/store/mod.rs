// vscdb-scrub - Store Module
//
// Access to the IDE's `state.vscdb` file: a SQLite database whose `ItemTable`
// holds the application state as `(key, value)` text pairs. The store is
// never migrated; the only writes are keyed DELETE and UPDATE statements.

mod db;
mod error;
mod models;
mod repository;

pub use db::{default_locations, resolve_path, Database, ITEM_TABLE};
pub(crate) use db::quote_ident;
pub use error::StoreError;
pub use models::{Cell, Entry, TableSummary};
pub use repository::{KeyValueStore, SqliteKeyValueStore};
