//! Error types
//! Every failure a user action can hit, with a stable machine-readable code.

use thiserror::Error;

/// Failures of the tabular file parser.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unsupported file format for '{file_name}'. Use .xlsx, .xls or .csv")]
    UnsupportedFormat { file_name: String },
    #[error("Empty file or no valid data: {0}")]
    EmptyFile(String),
    #[error("Malformed content: {0}")]
    MalformedContent(String),
}

impl ParseError {
    /// Machine-readable code surfaced alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            ParseError::EmptyFile(_) => "EMPTY_FILE",
            ParseError::MalformedContent(_) => "MALFORMED_CONTENT",
        }
    }
}

/// Failures while retrieving a static JSON resource.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request for {url} failed with HTTP status {status}")]
    Status { url: String, status: u16 },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Invalid JSON payload: {0}")]
    Decode(String),
    #[error("Request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn code(&self) -> &'static str {
        match self {
            FetchError::Cancelled => "CANCELLED",
            _ => "NETWORK_FETCH_ERROR",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

/// Invalid period selection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("{kind} index {index} out of range 1..={max}")]
    IndexOutOfRange {
        kind: &'static str,
        index: u32,
        max: u32,
    },
}

/// Failures while writing an export file.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize rows: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_codes_are_stable() {
        let unsupported = ParseError::UnsupportedFormat {
            file_name: "notes.txt".into(),
        };
        assert_eq!(unsupported.code(), "UNSUPPORTED_FORMAT");
        assert!(unsupported.to_string().contains("notes.txt"));
        assert_eq!(ParseError::EmptyFile("x".into()).code(), "EMPTY_FILE");
        assert_eq!(
            ParseError::MalformedContent("x".into()).code(),
            "MALFORMED_CONTENT"
        );
    }

    #[test]
    fn cancelled_fetch_has_its_own_code() {
        assert_eq!(FetchError::Cancelled.code(), "CANCELLED");
        let status = FetchError::Status {
            url: "http://localhost/a.json".into(),
            status: 404,
        };
        assert_eq!(status.code(), "NETWORK_FETCH_ERROR");
    }
}
