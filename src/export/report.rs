//! Report Generator Module
//! Builds a self-contained, printable HTML report (title, export time, data table, footer).
//!
//! The caller decides how to print it; the document carries its own print styles.

use crate::data::Table;
use chrono::{DateTime, Local};

const FOOTER: &str = "Relatório gerado automaticamente pela Analytics Dashboard";

/// HTML report generator for exported tables
pub struct ReportGenerator;

impl ReportGenerator {
    /// Render the full document.
    pub fn render(title: &str, table: &Table, generated_at: DateTime<Local>) -> String {
        let title = Self::escape(title);
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
{style}
</style>
</head>
<body>
<h1>{title}</h1>
<div class="metadata">
<p><strong>Data de Exportação:</strong> {timestamp}</p>
<p><strong>Linhas:</strong> {rows}</p>
</div>
{table}
<div class="footer">
<p>{FOOTER}</p>
</div>
</body>
</html>
"#,
            style = Self::style(),
            timestamp = generated_at.format("%d/%m/%Y, %H:%M:%S"),
            rows = table.len(),
            table = Self::table_html(table),
        )
    }

    /// The data table alone.
    pub fn table_html(table: &Table) -> String {
        let mut html = String::from("<table>\n<thead>\n<tr>");
        for header in table.headers() {
            html.push_str(&format!("<th>{}</th>", Self::escape(header)));
        }
        html.push_str("</tr>\n</thead>\n<tbody>\n");
        for row in table.rows() {
            html.push_str("<tr>");
            for header in table.headers() {
                html.push_str(&format!("<td>{}</td>", Self::escape(&row.get(header).to_string())));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>");
        html
    }

    /// Escape text for element content and attribute values.
    pub fn escape(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(ch),
            }
        }
        out
    }

    fn style() -> &'static str {
        r#"body { font-family: Arial, sans-serif; margin: 20px; color: #333; }
h1 { color: #0891b2; border-bottom: 2px solid #0891b2; padding-bottom: 10px; }
.metadata { background-color: #f0f9ff; padding: 10px; border-left: 4px solid #0891b2; margin-bottom: 20px; font-size: 12px; }
table { width: 100%; border-collapse: collapse; margin-top: 20px; }
th { background-color: #0891b2; color: white; padding: 12px; text-align: left; font-weight: bold; }
td { padding: 10px; border-bottom: 1px solid #ddd; }
tr:nth-child(even) { background-color: #f9fafb; }
.footer { margin-top: 40px; padding-top: 20px; border-top: 1px solid #ddd; font-size: 11px; color: #666; text-align: center; }
@media print { body { margin: 0; } }"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CellValue, Row};
    use chrono::TimeZone;

    fn table() -> Table {
        Table::new(
            "t",
            vec!["name".to_string(), "qty".to_string()],
            vec![Row::from_iter([
                ("name", CellValue::from("<b>A & B</b>")),
                ("qty", CellValue::from(3.0)),
            ])],
        )
    }

    #[test]
    fn report_has_title_timestamp_table_and_footer() {
        let at = Local.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();
        let html = ReportGenerator::render("Análise de Compradores - Q1/2026", &table(), at);
        assert!(html.contains("<title>Análise de Compradores - Q1/2026</title>"));
        assert!(html.contains("15/01/2026, 09:30:00"));
        assert!(html.contains("<th>name</th><th>qty</th>"));
        assert!(html.contains("<td>3</td>"));
        assert!(html.contains(FOOTER));
    }

    #[test]
    fn cell_text_is_escaped() {
        let html = ReportGenerator::table_html(&table());
        assert!(html.contains("&lt;b&gt;A &amp; B&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }
}
