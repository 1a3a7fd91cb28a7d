// vscdb-scrub - Value formatting for display

use crate::store::Cell;

/// Default display width for a single value.
pub const DEFAULT_MAX_LEN: usize = 100;

/// Render a cell for the terminal. JSON-looking text is pretty-printed;
/// anything longer than `max_len` characters is cut with a marker.
pub fn format_value(cell: &Cell, max_len: usize) -> String {
    let text = match cell {
        Cell::Null => return "NULL".to_string(),
        Cell::Text(text) => text.clone(),
        other => other.to_string(),
    };

    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(pretty) = serde_json::from_str::<serde_json::Value>(&text)
            .and_then(|v| serde_json::to_string_pretty(&v))
        {
            return match truncate(&pretty, max_len) {
                Some(cut) => format!("{}...\n[JSON TRUNCATED]", cut),
                None => pretty,
            };
        }
    }

    match truncate(&text, max_len) {
        Some(cut) => format!("{}...[TRUNCATED]", cut),
        None => text,
    }
}

/// First `max_len` characters, or `None` if the text already fits.
fn truncate(text: &str, max_len: usize) -> Option<&str> {
    text.char_indices().nth(max_len).map(|(idx, _)| &text[..idx])
}

// ─── Tests ───────────────────────────────────────────────────────────────────
