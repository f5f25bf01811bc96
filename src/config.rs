//! Dashboard configuration
//! JSON settings file; every field is optional and falls back to the defaults below.

use crate::data::DEFAULT_SHEET_INDICES;
use crate::error::ConfigError;
use crate::period::PeriodSelection;
use crate::stats::TrendPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    /// Entries kept by ranked charts.
    pub top_n: usize,
    /// Sheets read in multi-sheet mode.
    pub sheet_indices: Vec<usize>,
    pub trend_policy: TrendPolicy,
    /// Maximum characters of a chart label.
    pub label_width: usize,
    /// Base URL or directory of the static JSON resources.
    pub data_base_url: Option<String>,
    pub fetch_timeout_secs: u64,
    pub default_period: PeriodSelection,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            sheet_indices: DEFAULT_SHEET_INDICES.to_vec(),
            trend_policy: TrendPolicy::default(),
            label_width: 15,
            data_base_url: None,
            fetch_timeout_secs: 30,
            default_period: PeriodSelection::default(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded dashboard config");
        Ok(config)
    }

    /// Load `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::PeriodType;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn missing_fields_use_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"topN": 5, "trendPolicy": "clamp"}}"#).unwrap();

        let config = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.trend_policy, TrendPolicy::Clamp);
        assert_eq!(config.sheet_indices, vec![0, 1, 2, 3]);
        assert_eq!(config.label_width, 15);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn reads_default_period() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"defaultPeriod": {{"type": "quarter", "year": 2025, "index": 2}}}}"#
        )
        .unwrap();

        let config = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(config.default_period.kind(), PeriodType::Quarter);
        assert_eq!(config.default_period.label(), "Q2/2025");
    }

    #[test]
    fn invalid_json_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            DashboardConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DashboardConfig::load("/nonexistent/sheetlens.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(
            DashboardConfig::load_or_default(None).unwrap(),
            DashboardConfig::default()
        );
    }
}
