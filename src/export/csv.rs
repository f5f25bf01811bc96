//! CSV export: comma-separated, `\n` line breaks, quoting only where a value needs it.

use crate::data::{CellValue, Table};
use std::borrow::Cow;

/// Render one cell. Text containing `,` or `"` is quoted with inner quotes doubled;
/// null is empty.
pub fn escape_field(value: &CellValue) -> Cow<'_, str> {
    match value {
        CellValue::Text(s) if s.contains(',') || s.contains('"') => {
            Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
        }
        CellValue::Text(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

/// Header line plus one line per row, joined with `\n` and no trailing newline.
pub fn to_csv(table: &Table) -> String {
    let mut lines = Vec::with_capacity(table.len() + 1);
    lines.push(table.headers().join(","));
    for row in table.rows() {
        let fields: Vec<Cow<'_, str>> = table
            .headers()
            .iter()
            .map(|header| escape_field(row.get(header)))
            .collect();
        lines.push(fields.join(","));
    }
    lines.join("\n")
}
