//! Charts module - chart-ready datasets and KPI cards for each dashboard view
//!
//! Every view is a thin caller of the aggregation engine: it picks the keys and
//! values, then shapes the result for a bar, pie, scatter or heatmap widget.

pub mod buyers;
pub mod executive;
pub mod products;
pub mod supplier_buyer;
pub mod suppliers;

use crate::config::DashboardConfig;
use serde::Serialize;

pub use buyers::BuyerView;
pub use executive::ExecutiveView;
pub use products::ProductView;
pub use supplier_buyer::SupplierBuyerView;
pub use suppliers::SupplierView;

/// Traffic-light status of a KPI card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiStatus {
    Good,
    Warning,
    Critical,
}

impl KpiStatus {
    /// Good at or above `good`, Warning at or above `warning`.
    pub fn at_least(value: f64, good: f64, warning: f64) -> Self {
        if value >= good {
            KpiStatus::Good
        } else if value >= warning {
            KpiStatus::Warning
        } else {
            KpiStatus::Critical
        }
    }

    /// Good at or below `good`, Warning at or below `warning`.
    pub fn at_most(value: f64, good: f64, warning: f64) -> Self {
        if value <= good {
            KpiStatus::Good
        } else if value <= warning {
            KpiStatus::Warning
        } else {
            KpiStatus::Critical
        }
    }
}

/// One KPI card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: String,
    pub value: f64,
    pub display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<KpiStatus>,
}

impl Kpi {
    pub fn new(label: impl Into<String>, value: f64, display: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value,
            display: display.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: KpiStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// A labelled value for bar and pie charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Ranking size and label widths shared by the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    pub top_n: usize,
    pub label_width: usize,
    pub short_label_width: usize,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            label_width: 15,
            short_label_width: 12,
        }
    }
}

impl From<&DashboardConfig> for ChartOptions {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            top_n: config.top_n,
            label_width: config.label_width,
            ..Self::default()
        }
    }
}

/// First `width` characters of `label`.
pub fn truncate_label(label: &str, width: usize) -> String {
    label.chars().take(width).collect()
}

/// First `width` characters of `label`, with `...` appended when it was cut.
pub fn truncate_with_ellipsis(label: &str, width: usize) -> String {
    if label.chars().count() > width {
        format!("{}...", truncate_label(label, width))
    } else {
        label.to_string()
    }
}

/// Round halves towards positive infinity.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Whole millions, for chart axes.
pub fn millions(value: f64) -> f64 {
    round_half_up(value / 1_000_000.0)
}

/// Currency in millions: `R$ 1.5M`.
pub fn format_millions(value: f64) -> String {
    format!("R$ {:.1}M", value / 1_000_000.0)
}

/// Integer with `.` thousands separators: `12.345`.
pub fn format_count(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_truncate_by_character() {
        assert_eq!(truncate_label("DISTRIBUIDORA SÃO JOÃO", 15), "DISTRIBUIDORA S");
        assert_eq!(truncate_label("ACME", 15), "ACME");
        assert_eq!(truncate_with_ellipsis("ABCDEFGHIJKLMNOPQ", 15), "ABCDEFGHIJKLMNO...");
        assert_eq!(truncate_with_ellipsis("ABCDEFGHIJKLMNO", 15), "ABCDEFGHIJKLMNO");
    }

    #[test]
    fn statuses() {
        assert_eq!(KpiStatus::at_least(85.0, 85.0, 75.0), KpiStatus::Good);
        assert_eq!(KpiStatus::at_least(80.0, 85.0, 75.0), KpiStatus::Warning);
        assert_eq!(KpiStatus::at_least(10.0, 85.0, 75.0), KpiStatus::Critical);
        assert_eq!(KpiStatus::at_most(5.0, 5.0, 10.0), KpiStatus::Good);
        assert_eq!(KpiStatus::at_most(10.0, 5.0, 10.0), KpiStatus::Warning);
        assert_eq!(KpiStatus::at_most(10.5, 5.0, 10.0), KpiStatus::Critical);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_millions(1_540_000.0), "R$ 1.5M");
        assert_eq!(format_count(1234567.0), "1.234.567");
        assert_eq!(format_count(999.0), "999");
        assert_eq!(format_count(-1000.0), "-1.000");
        assert_eq!(millions(2_500_000.0), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_to(0.8567, 1), 0.9);
    }
}
