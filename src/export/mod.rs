//! Export module - JSON, CSV and printable HTML renditions of a table

pub mod csv;
pub mod json;
pub mod report;

use crate::data::Table;
use crate::error::ExportError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use self::csv::{escape_field, to_csv};
pub use self::json::to_json;
pub use self::report::ReportGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        }
    }
}

/// `dados_<unix millis>.<ext>`
pub fn export_file_name(format: ExportFormat, at: DateTime<Local>) -> String {
    format!("dados_{}.{}", at.timestamp_millis(), format.extension())
}

/// Render `table` in `format`. `title` only appears in the HTML report.
pub fn render(table: &Table, format: ExportFormat, title: &str) -> Result<String, ExportError> {
    Ok(match format {
        ExportFormat::Json => to_json(table)?,
        ExportFormat::Csv => to_csv(table),
        ExportFormat::Html => ReportGenerator::render(title, table, Local::now()),
    })
}

/// Write `table` into `dir` under a generated file name and return the path.
pub fn write_export(
    table: &Table,
    format: ExportFormat,
    dir: &Path,
    title: &str,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_file_name(format, Local::now()));
    write_to(table, format, &path, title)?;
    Ok(path)
}

/// Write `table` to an explicit path.
pub fn write_to(
    table: &Table,
    format: ExportFormat,
    path: &Path,
    title: &str,
) -> Result<(), ExportError> {
    let content = render(table, format, title)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), rows = table.len(), ?format, "export written");
    Ok(())
}
