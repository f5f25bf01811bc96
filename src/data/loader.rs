//! Tabular File Loader Module
//! Turns uploaded CSV / XLS / XLSX bytes into typed tables.
//! CSV goes through Polars, spreadsheets through calamine.

use super::table::{Row, Table};
use super::value::CellValue;
use crate::error::ParseError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use polars::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::io::Cursor;
use std::path::Path;

const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const MIME_XLS: &str = "application/vnd.ms-excel";
const MIME_CSV: &str = "text/csv";

/// Sheets read in multi-sheet mode when the caller does not pick any.
pub const DEFAULT_SHEET_INDICES: [usize; 4] = [0, 1, 2, 3];

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xls,
    Xlsx,
}

impl FileFormat {
    /// Detect the format from the file name, falling back to the declared MIME type.
    pub fn detect(file_name: &str, mime_type: Option<&str>) -> Result<Self, ParseError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let by_extension = match extension.as_deref() {
            Some("csv") => Some(FileFormat::Csv),
            Some("xls") => Some(FileFormat::Xls),
            Some("xlsx") => Some(FileFormat::Xlsx),
            _ => None,
        };
        if let Some(format) = by_extension {
            return Ok(format);
        }

        match mime_type {
            Some(MIME_CSV) => Ok(FileFormat::Csv),
            Some(MIME_XLS) => Ok(FileFormat::Xls),
            Some(MIME_XLSX) => Ok(FileFormat::Xlsx),
            _ => Err(ParseError::UnsupportedFormat {
                file_name: file_name.to_string(),
            }),
        }
    }

    pub fn is_spreadsheet(self) -> bool {
        !matches!(self, FileFormat::Csv)
    }
}

/// Tables read from several sheets of one workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSheetData {
    pub sheets: Vec<Table>,
    pub sheet_names: Vec<String>,
}

/// Stateless parser from file bytes to tables.
pub struct TabularFileParser;

impl TabularFileParser {
    /// Parse a single table: the whole CSV, or the first sheet of a workbook.
    pub fn parse(
        bytes: &[u8],
        file_name: &str,
        mime_type: Option<&str>,
    ) -> Result<Table, ParseError> {
        let format = FileFormat::detect(file_name, mime_type)?;
        tracing::debug!(file_name, ?format, bytes = bytes.len(), "parsing upload");

        let table = match format {
            FileFormat::Csv => Self::parse_csv(bytes, file_name)?,
            FileFormat::Xls | FileFormat::Xlsx => {
                let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
                    .map_err(|e| ParseError::MalformedContent(e.to_string()))?;
                let sheet_names = workbook.sheet_names().to_vec();
                let Some(first) = sheet_names.first() else {
                    return Err(ParseError::EmptyFile(
                        "Workbook contains no sheets".to_string(),
                    ));
                };
                let range = workbook
                    .worksheet_range(first)
                    .map_err(|e| ParseError::MalformedContent(e.to_string()))?;
                Self::table_from_range(first, &range)
            }
        };

        if table.is_empty() {
            return Err(ParseError::EmptyFile(file_name.to_string()));
        }

        tracing::info!(
            file_name,
            rows = table.len(),
            columns = table.headers().len(),
            "parsed upload"
        );
        Ok(table)
    }

    /// Parse several sheets of a workbook.
    ///
    /// `sheet_indices` defaults to [`DEFAULT_SHEET_INDICES`]. Sheets are returned in
    /// workbook order; indices past the last sheet are ignored and sheets without
    /// data rows are skipped. Fails only when no selected sheet has rows.
    pub fn parse_sheets(
        bytes: &[u8],
        file_name: &str,
        mime_type: Option<&str>,
        sheet_indices: Option<&[usize]>,
    ) -> Result<MultiSheetData, ParseError> {
        let format = FileFormat::detect(file_name, mime_type)?;
        let indices = sheet_indices.unwrap_or(&DEFAULT_SHEET_INDICES);

        let mut sheets = Vec::new();
        if format.is_spreadsheet() {
            let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
                .map_err(|e| ParseError::MalformedContent(e.to_string()))?;
            let sheet_names = workbook.sheet_names().to_vec();
            if sheet_names.is_empty() {
                return Err(ParseError::EmptyFile(
                    "Workbook contains no sheets".to_string(),
                ));
            }

            for (idx, sheet_name) in sheet_names.iter().enumerate() {
                if !indices.contains(&idx) {
                    continue;
                }
                let range = workbook
                    .worksheet_range(sheet_name)
                    .map_err(|e| ParseError::MalformedContent(e.to_string()))?;
                let table = Self::table_from_range(sheet_name, &range);
                if table.is_empty() {
                    tracing::warn!(sheet = %sheet_name, "skipping sheet without data rows");
                    continue;
                }
                sheets.push(table);
            }
        } else if indices.contains(&0) {
            // A delimited file reads as a workbook with a single sheet.
            match Self::parse_csv(bytes, "Sheet1") {
                Ok(table) if !table.is_empty() => sheets.push(table),
                Ok(_) | Err(ParseError::EmptyFile(_)) => {}
                Err(err) => return Err(err),
            }
        }

        if sheets.is_empty() {
            return Err(ParseError::EmptyFile(
                "No sheet with valid data found".to_string(),
            ));
        }

        let sheet_names = sheets.iter().map(|t| t.name().to_string()).collect();
        Ok(MultiSheetData {
            sheets,
            sheet_names,
        })
    }

    /// Parse CSV text. Every cell is kept as text; numbers are inferred later.
    ///
    /// Records whose field count differs from the header row are rejected.
    fn parse_csv(bytes: &[u8], name: &str) -> Result<Table, ParseError> {
        let raw_headers = csv_header_record(bytes)?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()
            .map_err(|e| match e {
                PolarsError::NoData(msg) => ParseError::EmptyFile(msg.to_string()),
                other => ParseError::MalformedContent(other.to_string()),
            })?;

        // Polars suffixes repeated names itself; columns are matched by position instead.
        if raw_headers.len() != df.width() {
            return Err(ParseError::MalformedContent(format!(
                "header has {} fields but {} columns were read",
                raw_headers.len(),
                df.width()
            )));
        }
        let headers = unique_headers(raw_headers);

        let mut columns = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let strings = series
                .str()
                .map_err(|e| ParseError::MalformedContent(e.to_string()))?;
            columns.push(strings);
        }

        let records = (0..df.height()).map(|i| {
            columns
                .iter()
                .map(|ca| match ca.get(i) {
                    Some(s) => CellValue::Text(s.to_string()),
                    None => CellValue::Null,
                })
                .collect::<Vec<_>>()
        });

        Ok(build_table(name, headers, records))
    }

    /// First row is the header row, the rest become records.
    fn table_from_range(name: &str, range: &calamine::Range<Data>) -> Table {
        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Table::new(name, Vec::new(), Vec::new());
        };

        let headers = unique_headers(
            header_row
                .iter()
                .map(|cell| cell_from_data(cell).to_string())
                .collect(),
        );

        let records = rows.map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>());
        build_table(name, headers, records)
    }
}

/// Header names as written, after checking every record against the header width.
fn csv_header_record(bytes: &[u8]) -> Result<Vec<String>, ParseError> {
    let malformed = |e: csv::Error| ParseError::MalformedContent(e.to_string());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .map_err(malformed)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut record = csv::ByteRecord::new();
    while reader.read_byte_record(&mut record).map_err(malformed)? {}
    Ok(headers)
}

/// Zip records with headers, dropping rows in which every cell is empty.
fn build_table<I>(name: &str, headers: Vec<String>, records: I) -> Table
where
    I: Iterator<Item = Vec<CellValue>>,
{
    let rows: Vec<Row> = records
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .map(|cells| {
            headers
                .iter()
                .cloned()
                .zip(cells.into_iter().chain(std::iter::repeat(CellValue::Null)))
                .collect()
        })
        .collect();
    Table::new(name, headers, rows)
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Null,
    }
}

/// Make header names unique: blanks become `__EMPTY`, repeats get `_1`, `_2`, ...
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut taken: FxHashSet<String> = FxHashSet::default();
    let mut counters: FxHashMap<String, usize> = FxHashMap::default();
    let mut headers = Vec::with_capacity(raw.len());

    for name in raw {
        let base = if name.is_empty() {
            "__EMPTY".to_string()
        } else {
            name
        };
        let mut candidate = base.clone();
        while taken.contains(&candidate) {
            let n = counters.entry(base.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{}_{}", base, n);
        }
        taken.insert(candidate.clone());
        headers.push(candidate);
    }
    headers
}

/// Holds the most recently loaded table.
///
/// A failed load keeps the previous table and records the error.
#[derive(Debug, Default)]
pub struct DataLoader {
    table: Option<Table>,
    file_name: Option<String>,
    last_error: Option<ParseError>,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an upload and make it the current table on success.
    pub fn load(
        &mut self,
        bytes: &[u8],
        file_name: &str,
        mime_type: Option<&str>,
    ) -> Result<&Table, ParseError> {
        match TabularFileParser::parse(bytes, file_name, mime_type) {
            Ok(table) => {
                self.last_error = None;
                self.file_name = Some(file_name.to_string());
                Ok(self.table.insert(table))
            }
            Err(err) => {
                tracing::warn!(file_name, code = err.code(), error = %err, "upload rejected");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn last_error(&self) -> Option<&ParseError> {
        self.last_error.as_ref()
    }

    /// Drop the current table and any recorded error.
    pub fn clear(&mut self) {
        self.table = None;
        self.file_name = None;
        self.last_error = None;
    }
}
