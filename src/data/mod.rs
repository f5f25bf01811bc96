//! Data module - file parsing, tables, filtering and typed records

pub mod loader;
pub mod processor;
pub mod records;
pub mod table;
pub mod value;

pub use loader::{DataLoader, FileFormat, MultiSheetData, TabularFileParser, DEFAULT_SHEET_INDICES};
pub use processor::{DataProcessor, Page, RowFilter};
pub use table::{ColumnKind, OrderedRow, Row, Table, TableStats};
pub use value::CellValue;
