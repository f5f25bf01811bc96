//! Statistics Calculator Module
//! Descriptive statistics per numeric column, with a first-half/second-half trend.

use super::aggregate::{trend_with_policy, TrendPolicy};
use crate::data::{ColumnKind, Table};
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub std_dev: f64,
    pub p05: f64,
    pub p95: f64,
    /// Percent change of the second half's mean over the first half's.
    pub trend: Option<f64>,
}

impl ColumnSummary {
    fn empty(column: &str) -> Self {
        Self {
            column: column.to_string(),
            count: 0,
            sum: 0.0,
            mean: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            median: f64::NAN,
            std_dev: f64::NAN,
            p05: f64::NAN,
            p95: f64::NAN,
            trend: None,
        }
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Descriptive statistics of `values`, in their given order.
    ///
    /// Standard deviation is the sample (n-1) deviation; a single value has 0.
    pub fn describe(column: &str, values: &[f64], policy: TrendPolicy) -> ColumnSummary {
        let n = values.len();
        if n == 0 {
            return ColumnSummary::empty(column);
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        let std_dev = if n > 1 {
            Statistics::std_dev(values.iter())
        } else {
            0.0
        };

        ColumnSummary {
            column: column.to_string(),
            count: n,
            sum: values.iter().sum(),
            mean: Statistics::mean(values.iter()),
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
            median,
            std_dev,
            p05: Self::percentile(&sorted, 5.0),
            p95: Self::percentile(&sorted, 95.0),
            trend: trend_with_policy(values, |v| *v, policy),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Summaries of the first `limit` numeric columns, in header order.
    ///
    /// Columns are computed in parallel; empty cells are left out.
    pub fn summarize_table(
        table: &Table,
        limit: Option<usize>,
        policy: TrendPolicy,
    ) -> Vec<ColumnSummary> {
        let columns: Vec<&String> = table
            .headers()
            .iter()
            .filter(|h| table.column_kind(h) == Some(ColumnKind::Numeric))
            .take(limit.unwrap_or(usize::MAX))
            .collect();

        columns
            .par_iter()
            .map(|column| Self::describe(column, &table.numeric_values(column), policy))
            .collect()
    }
}
