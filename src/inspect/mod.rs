// vscdb-scrub - Inspection Module
//
// Read-only views over any table of the store: table listing, row preview,
// keyword search, value formatting and JSON export.

mod export;
mod format;
mod reader;

pub use export::{build_export, write_export, DatabaseInfo, ExportDocument, TableExport};
pub use format::{format_value, DEFAULT_MAX_LEN};
pub use reader::{columns, row_count, rows, search, table_summaries, TableData};
