//! Aggregation Engine
//! Grouping, ranking, cross-tabulation and trend primitives shared by every view.
//!
//! All functions are pure: they re-derive their output from the rows they are
//! given. Keys are used exactly as the caller builds them; trimming or case
//! folding is the caller's decision.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Running sum and row count of one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GroupAccumulator {
    pub sum: f64,
    pub count: usize,
}

impl GroupAccumulator {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Mean of the group, 0 for an empty group.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Group key → accumulator, remembering first-insertion order of keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    keys: Vec<String>,
    groups: Vec<GroupAccumulator>,
    index: FxHashMap<String, usize>,
}

impl Aggregation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to `key`. NaN contributes 0 but still counts the row.
    pub fn add(&mut self, key: impl Into<String>, value: f64) {
        let value = if value.is_nan() { 0.0 } else { value };
        let key = key.into();
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.keys.len();
                self.index.insert(key.clone(), slot);
                self.keys.push(key);
                self.groups.push(GroupAccumulator::default());
                slot
            }
        };
        self.groups[slot].add(value);
    }

    pub fn get(&self, key: &str) -> Option<&GroupAccumulator> {
        self.index.get(key).map(|&slot| &self.groups[slot])
    }

    /// Sum for `key`, 0 when the key never appeared.
    pub fn sum(&self, key: &str) -> f64 {
        self.get(key).map_or(0.0, |g| g.sum)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Groups in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupAccumulator)> {
        self.keys.iter().map(String::as_str).zip(self.groups.iter())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Sum over every group.
    pub fn total(&self) -> f64 {
        self.groups.iter().map(|g| g.sum).sum()
    }

    /// Each group's share of the total as a percentage, in insertion order.
    /// All shares are 0 when the total is 0.
    pub fn shares(&self) -> Vec<RankedEntry> {
        let total = self.total();
        self.iter()
            .map(|(key, group)| RankedEntry {
                key: key.to_string(),
                value: if total == 0.0 {
                    0.0
                } else {
                    group.sum / total * 100.0
                },
            })
            .collect()
    }

    /// Groups ordered by key.
    pub fn sorted_by_key(&self) -> Vec<(&str, &GroupAccumulator)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Key → sum, ordered by key.
    pub fn sums(&self) -> BTreeMap<String, f64> {
        self.iter().map(|(k, g)| (k.to_string(), g.sum)).collect()
    }
}

/// Sum `value_fn` per `key_fn` group.
pub fn group_sum<T, K, V>(rows: &[T], key_fn: K, value_fn: V) -> Aggregation
where
    K: Fn(&T) -> String,
    V: Fn(&T) -> f64,
{
    let mut aggregation = Aggregation::new();
    for row in rows {
        aggregation.add(key_fn(row), value_fn(row));
    }
    aggregation
}

/// Count rows per `key_fn` group. Each group's sum equals its count.
pub fn count_by<T, K>(rows: &[T], key_fn: K) -> Aggregation
where
    K: Fn(&T) -> String,
{
    group_sum(rows, key_fn, |_| 1.0)
}

/// Mean of `value_fn` over `rows`; 0 when there are no rows.
pub fn average<T, V>(rows: &[T], value_fn: V) -> f64
where
    V: Fn(&T) -> f64,
{
    if rows.is_empty() {
        return 0.0;
    }
    let total: f64 = rows.iter().map(|r| value_fn(r)).sum();
    total / rows.len() as f64
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

impl SortOrder {
    fn compare(self, a: f64, b: f64) -> std::cmp::Ordering {
        match self {
            SortOrder::Descending => b.total_cmp(&a),
            SortOrder::Ascending => a.total_cmp(&b),
        }
    }
}

/// One ranked group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub key: String,
    pub value: f64,
}

/// The `n` groups with the largest (or smallest) sums. Ties keep insertion order.
pub fn top_n(aggregation: &Aggregation, n: usize, order: SortOrder) -> Vec<RankedEntry> {
    rank_by(aggregation, Some(n), order, |g| g.sum)
}

/// Rank groups by any metric of their accumulator, optionally truncated.
pub fn rank_by<M>(
    aggregation: &Aggregation,
    n: Option<usize>,
    order: SortOrder,
    metric: M,
) -> Vec<RankedEntry>
where
    M: Fn(&GroupAccumulator) -> f64,
{
    let mut entries: Vec<RankedEntry> = aggregation
        .iter()
        .map(|(key, group)| RankedEntry {
            key: key.to_string(),
            value: metric(group),
        })
        .collect();
    entries.sort_by(|a, b| order.compare(a.value, b.value));
    if let Some(n) = n {
        entries.truncate(n);
    }
    entries
}

/// The `n` items with the largest (or smallest) `value_fn`. Ties keep input order.
pub fn top_by<'a, T, V>(items: &'a [T], n: usize, order: SortOrder, value_fn: V) -> Vec<&'a T>
where
    V: Fn(&T) -> f64,
{
    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by(|a, b| order.compare(value_fn(a), value_fn(b)));
    ranked.truncate(n);
    ranked
}

/// Heatmap shading bucket of a cell relative to the matrix maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IntensityBand {
    None,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl IntensityBand {
    pub fn classify(value: f64, max: f64) -> Self {
        if value == 0.0 {
            return IntensityBand::None;
        }
        let intensity = if max > 0.0 { value / max } else { 0.0 };
        if intensity < 0.25 {
            IntensityBand::Low
        } else if intensity < 0.5 {
            IntensityBand::Medium
        } else if intensity < 0.75 {
            IntensityBand::High
        } else {
            IntensityBand::VeryHigh
        }
    }
}

/// Sparse two-dimensional accumulation keyed by (row key, column key).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossTabMatrix {
    row_keys: BTreeSet<String>,
    col_keys: BTreeSet<String>,
    cells: FxHashMap<(String, String), f64>,
    max_value: f64,
}

impl CrossTabMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate into a cell. Empty keys are ignored.
    ///
    /// The maximum is a running maximum of cell totals, starting at 0.
    pub fn add(&mut self, row: &str, col: &str, value: f64) {
        if row.is_empty() || col.is_empty() {
            return;
        }
        let value = if value.is_nan() { 0.0 } else { value };
        self.row_keys.insert(row.to_string());
        self.col_keys.insert(col.to_string());
        let cell = self
            .cells
            .entry((row.to_string(), col.to_string()))
            .or_insert(0.0);
        *cell += value;
        self.max_value = self.max_value.max(*cell);
    }

    pub fn row_keys(&self) -> impl Iterator<Item = &str> {
        self.row_keys.iter().map(String::as_str)
    }

    pub fn col_keys(&self) -> impl Iterator<Item = &str> {
        self.col_keys.iter().map(String::as_str)
    }

    pub fn cell(&self, row: &str, col: &str) -> Option<f64> {
        self.cells.get(&(row.to_string(), col.to_string())).copied()
    }

    /// Cell value, 0 for cells that never received a contribution.
    pub fn get(&self, row: &str, col: &str) -> f64 {
        self.cell(row, col).unwrap_or(0.0)
    }

    /// Cell value divided by the matrix maximum, 0 when the maximum is not positive.
    pub fn intensity(&self, row: &str, col: &str) -> f64 {
        if self.max_value > 0.0 {
            self.get(row, col) / self.max_value
        } else {
            0.0
        }
    }

    pub fn band(&self, row: &str, col: &str) -> IntensityBand {
        IntensityBand::classify(self.get(row, col), self.max_value)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Cross-tabulate `value_fn` by row and column keys.
///
/// A row contributes only when both keys are non-empty.
pub fn cross_tab<T, R, C, V>(rows: &[T], row_key_fn: R, col_key_fn: C, value_fn: V) -> CrossTabMatrix
where
    R: Fn(&T) -> String,
    C: Fn(&T) -> String,
    V: Fn(&T) -> f64,
{
    let mut matrix = CrossTabMatrix::new();
    for row in rows {
        matrix.add(&row_key_fn(row), &col_key_fn(row), value_fn(row));
    }
    matrix
}

/// How a trend with a zero baseline is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPolicy {
    /// Return `Infinity` / `NaN` unchanged.
    #[default]
    Propagate,
    /// Replace non-finite results with 0.
    Clamp,
    /// Report no trend for non-finite results.
    Suppress,
}

/// Percent change between the mean of the second half and the first half of `rows`.
///
/// The split is at `len / 2`. A zero first-half mean yields `Infinity` or `NaN`.
pub fn trend<T, V>(rows: &[T], value_fn: V) -> f64
where
    V: Fn(&T) -> f64,
{
    let (first, second) = rows.split_at(rows.len() / 2);
    let first_avg = average(first, &value_fn);
    let second_avg = average(second, &value_fn);
    (second_avg - first_avg) / first_avg * 100.0
}

pub fn trend_with_policy<T, V>(rows: &[T], value_fn: V, policy: TrendPolicy) -> Option<f64>
where
    V: Fn(&T) -> f64,
{
    let raw = trend(rows, value_fn);
    match policy {
        TrendPolicy::Propagate => Some(raw),
        TrendPolicy::Clamp => Some(if raw.is_finite() { raw } else { 0.0 }),
        TrendPolicy::Suppress => raw.is_finite().then_some(raw),
    }
}
