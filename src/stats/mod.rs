//! Stats module - aggregation engine and descriptive statistics

pub mod aggregate;
pub mod calculator;

pub use aggregate::{
    average, count_by, cross_tab, group_sum, rank_by, top_by, top_n, trend, trend_with_policy,
    Aggregation, CrossTabMatrix, GroupAccumulator, IntensityBand, RankedEntry, SortOrder,
    TrendPolicy,
};
pub use calculator::{ColumnSummary, StatsCalculator};
