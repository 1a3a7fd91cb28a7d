// vscdb-scrub - Store data models
//
// The IDE writes text into a BLOB column, so values are normalised to text
// wherever the bytes are valid UTF-8.

use std::fmt;

use rusqlite::types::ValueRef;
use serde::Serialize;

/// One `(key, value)` pair from `ItemTable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: Option<String>,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A single cell read from an arbitrary table during inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Cell {
    pub fn from_value_ref(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::Real(f),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => Cell::Text(text.to_string()),
                Err(_) => Cell::Blob(bytes.to_vec()),
            },
        }
    }

    /// Text view of the cell, `None` for SQL NULL.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// JSON form used by the exporter. Text that looks like JSON and parses
    /// is embedded as structured JSON; everything else stays a scalar.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Cell::Null => serde_json::Value::Null,
            Cell::Integer(i) => serde_json::Value::from(*i),
            Cell::Real(f) => serde_json::Value::from(*f),
            Cell::Text(text) => {
                let trimmed = text.trim_start();
                if trimmed.starts_with('{') || trimmed.starts_with('[') {
                    if let Ok(parsed) = serde_json::from_str(text) {
                        return parsed;
                    }
                }
                serde_json::Value::String(text.clone())
            }
            Cell::Blob(bytes) => serde_json::Value::String(to_hex(bytes)),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Real(r) => write!(f, "{}", r),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Blob(bytes) => write!(f, "x'{}'", to_hex(bytes)),
        }
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Table name plus row count, for the `info` listing.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub row_count: i64,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
