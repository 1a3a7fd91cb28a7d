// vscdb-scrub - Table reader
//
// Table names are validated against `sqlite_master` and quoted before use;
// search terms are always bound as parameters.

use rusqlite::params;

use crate::store::{Cell, Database, StoreError, TableSummary};

/// Column names plus the selected rows of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

pub fn table_summaries(db: &Database) -> Result<Vec<TableSummary>, StoreError> {
    let mut summaries = Vec::new();
    for name in db.tables()? {
        let row_count = row_count(db, &name)?;
        summaries.push(TableSummary { name, row_count });
    }
    Ok(summaries)
}

pub fn row_count(db: &Database, table: &str) -> Result<i64, StoreError> {
    let quoted = db.checked_table(table)?;
    let count = db
        .conn()
        .query_row(&format!("SELECT count(*) FROM {}", quoted), [], |row| row.get(0))?;
    Ok(count)
}

pub fn columns(db: &Database, table: &str) -> Result<Vec<String>, StoreError> {
    let quoted = db.checked_table(table)?;
    let mut stmt = db.conn().prepare(&format!("PRAGMA table_info({})", quoted))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;

    let mut names = Vec::new();
    for row in rows {
        names.push(row?);
    }
    Ok(names)
}

/// All rows of `table`, or the first `limit` rows.
pub fn rows(db: &Database, table: &str, limit: Option<usize>) -> Result<TableData, StoreError> {
    let quoted = db.checked_table(table)?;
    let columns = columns(db, table)?;

    // SQLite treats a negative LIMIT as "no limit".
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let mut stmt = db
        .conn()
        .prepare(&format!("SELECT * FROM {} LIMIT ?1", quoted))?;
    let rows = collect_rows(&mut stmt, params![limit], columns.len())?;

    Ok(TableData { columns, rows })
}

/// Rows of `table` where any column contains `term`, case-insensitively.
pub fn search(db: &Database, table: &str, term: &str) -> Result<TableData, StoreError> {
    let quoted = db.checked_table(table)?;
    let columns = columns(db, table)?;
    if columns.is_empty() {
        return Ok(TableData { columns, rows: Vec::new() });
    }

    let conditions = columns
        .iter()
        .map(|c| {
            format!(
                "LOWER(CAST({} AS TEXT)) LIKE LOWER(?1) ESCAPE '\\'",
                crate::store::quote_ident(c)
            )
        })
        .collect::<Vec<_>>()
        .join(" OR ");
    let sql = format!("SELECT * FROM {} WHERE {}", quoted, conditions);

    let pattern = format!("%{}%", escape_like(term));
    let mut stmt = db.conn().prepare(&sql)?;
    let rows = collect_rows(&mut stmt, params![pattern], columns.len())?;

    tracing::debug!(table = %table, matches = rows.len(), "Search completed");
    Ok(TableData { columns, rows })
}

fn collect_rows(
    stmt: &mut rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
    width: usize,
) -> Result<Vec<Vec<Cell>>, StoreError> {
    let mapped = stmt.query_map(params, |row| {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(Cell::from_value_ref(row.get_ref(i)?));
        }
        Ok(cells)
    })?;

    let mut rows = Vec::new();
    for row in mapped {
        rows.push(row?);
    }
    Ok(rows)
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ─── Tests ───────────────────────────────────────────────────────────────────
