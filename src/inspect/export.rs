// vscdb-scrub - JSON exporter
//
// Dumps every table (or only rows matching a search term) into a single JSON
// document. Text values that hold JSON are embedded as structured JSON.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::store::Database;

use super::reader::{self, TableData};

#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub database_info: DatabaseInfo,
    pub tables: BTreeMap<String, TableExport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseInfo {
    pub file_path: String,
    pub exported_at: String,
    pub file_size_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableExport {
    pub columns: Vec<String>,
    pub record_count: usize,
    pub data: Vec<Map<String, Value>>,
}

impl From<TableData> for TableExport {
    fn from(table: TableData) -> Self {
        let data: Vec<Map<String, Value>> = table
            .rows
            .iter()
            .map(|row| {
                table
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(col, cell)| (col.clone(), cell.to_json()))
                    .collect()
            })
            .collect();

        Self {
            record_count: data.len(),
            columns: table.columns,
            data,
        }
    }
}

pub fn build_export(db: &Database, search: Option<&str>) -> Result<ExportDocument> {
    let file_size_bytes = std::fs::metadata(db.path()).map(|m| m.len()).unwrap_or(0);

    let mut tables = BTreeMap::new();
    for name in db.tables()? {
        tracing::debug!(table = %name, "Exporting table");
        let data = match search {
            Some(term) => reader::search(db, &name, term)?,
            None => reader::rows(db, &name, None)?,
        };
        tables.insert(name, TableExport::from(data));
    }

    Ok(ExportDocument {
        database_info: DatabaseInfo {
            file_path: db.path().display().to_string(),
            exported_at: Utc::now().to_rfc3339(),
            file_size_bytes,
        },
        tables,
    })
}

pub fn write_export(document: &ExportDocument, output: &Path, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    std::fs::write(output, text)?;

    tracing::info!(output = %output.display(), tables = document.tables.len(), "Export written");
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute_batch(
                "INSERT INTO ItemTable (key, value) VALUES ('history.recentlyOpenedPathsList', '{\"entries\":[]}');
                 INSERT INTO ItemTable (key, value) VALUES ('other.setting', 'true');",
            )
            .unwrap();
        db
    }

    #[test]
    fn test_export_embeds_json_values() {
        let db = seeded();
        let doc = build_export(&db, None).unwrap();

        let table = &doc.tables["ItemTable"];
        assert_eq!(table.columns, vec!["key", "value"]);
        assert_eq!(table.record_count, 2);
        assert!(table.data.contains(
            &json!({"key": "history.recentlyOpenedPathsList", "value": {"entries": []}})
                .as_object()
                .unwrap()
                .clone()
        ));
    }

    #[test]
    fn test_export_with_search_filters_rows() {
        let db = seeded();
        let doc = build_export(&db, Some("other")).unwrap();
        assert_eq!(doc.tables["ItemTable"].record_count, 1);
    }

    #[test]
    fn test_write_export_produces_valid_json() {
        let db = seeded();
        let doc = build_export(&db, None).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");

        write_export(&doc, &output, false).unwrap();

        let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(parsed["tables"]["ItemTable"]["record_count"], json!(2));
        assert!(parsed["database_info"]["exported_at"].is_string());
    }
}
