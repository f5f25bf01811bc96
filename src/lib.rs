//! Sheetlens - spreadsheet ingestion and aggregation engine for inventory analytics dashboards
//!
//! Uploads (CSV, XLS, XLSX) become [`data::Table`]s, the static JSON sheets become typed
//! records, and both feed the grouping, ranking and cross-tab primitives in [`stats`].

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod fetch;
pub mod period;
pub mod stats;

pub use config::DashboardConfig;
pub use data::{CellValue, DataLoader, Table, TabularFileParser};
pub use error::{ExportError, FetchError, ParseError, PeriodError};
