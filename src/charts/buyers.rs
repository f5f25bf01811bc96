//! Buyer view: per-buyer service metrics, radar scores and inventory value comparison.

use super::suppliers::service_cards;
use super::{millions, round_to, truncate_label, ChartOptions, Kpi};
use crate::data::records::{number_or_zero, text_or_empty, BuyerRecord};
use crate::stats::average;
use serde::Serialize;

/// Summary rows that are not real buyers.
const EXCLUDED_BUYERS: [&str; 2] = ["TOTAL", "DESCONTINUADO"];
const RADAR_LABEL_WIDTH: usize = 8;

/// Buyer KPIs. All three ratios are stored as fractions and reported ×100.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerKpis {
    pub average_service_level: f64,
    pub average_rupture_pct: f64,
    pub average_excess_pct: f64,
    pub total_inventory_value: f64,
}

impl BuyerKpis {
    pub fn compute(records: &[BuyerRecord]) -> Self {
        Self {
            average_service_level: average(records, |r| number_or_zero(r.service_level)) * 100.0,
            average_rupture_pct: average(records, |r| number_or_zero(r.rupture_pct)) * 100.0,
            average_excess_pct: average(records, |r| number_or_zero(r.excess_pct)) * 100.0,
            total_inventory_value: records
                .iter()
                .map(|r| number_or_zero(r.stock_value_sale))
                .sum(),
        }
    }

    pub fn cards(&self) -> Vec<Kpi> {
        service_cards(
            self.average_service_level,
            self.average_rupture_pct,
            self.average_excess_pct,
            self.total_inventory_value,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerMetric {
    pub name: String,
    pub service_level: f64,
    pub rupture: f64,
    pub excess: f64,
    pub inventory: f64,
    pub active_skus: f64,
}

/// Radar axes, each on a 0-100 "higher is better" scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerRadarPoint {
    pub name: String,
    pub service_level: f64,
    pub rupture_score: f64,
    pub excess_score: f64,
    pub sku_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryValueComparison {
    pub name: String,
    pub cost: f64,
    pub sale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerView {
    pub kpis: BuyerKpis,
    pub metrics: Vec<BuyerMetric>,
    pub radar: Vec<BuyerRadarPoint>,
    pub value_comparison: Vec<InventoryValueComparison>,
}

impl BuyerView {
    /// KPIs cover every record; the charts skip the summary rows.
    pub fn build(records: &[BuyerRecord], options: &ChartOptions) -> Self {
        let active = active_buyers(records);
        Self {
            kpis: BuyerKpis::compute(records),
            metrics: buyer_metrics(&active, options),
            radar: radar(&active),
            value_comparison: value_comparison(&active, options),
        }
    }
}

pub fn is_active_buyer(record: &BuyerRecord) -> bool {
    let name = text_or_empty(&record.buyer).to_uppercase();
    !EXCLUDED_BUYERS.contains(&name.as_str())
}

/// Records of real buyers, without the TOTAL and DESCONTINUADO rows.
pub fn active_buyers(records: &[BuyerRecord]) -> Vec<BuyerRecord> {
    records.iter().filter(|r| is_active_buyer(r)).cloned().collect()
}

/// Every buyer's metrics, best service level first.
pub fn buyer_metrics(records: &[BuyerRecord], options: &ChartOptions) -> Vec<BuyerMetric> {
    let mut metrics: Vec<BuyerMetric> = records
        .iter()
        .map(|r| BuyerMetric {
            name: truncate_label(text_or_empty(&r.buyer), options.short_label_width),
            service_level: round_to(number_or_zero(r.service_level) * 100.0, 1),
            rupture: round_to(number_or_zero(r.rupture_pct) * 100.0, 2),
            excess: round_to(number_or_zero(r.excess_pct) * 100.0, 2),
            inventory: millions(number_or_zero(r.stock_value_sale)),
            active_skus: number_or_zero(r.active_skus),
        })
        .collect();
    metrics.sort_by(|a, b| b.service_level.total_cmp(&a.service_level));
    metrics
}

pub fn radar(records: &[BuyerRecord]) -> Vec<BuyerRadarPoint> {
    records
        .iter()
        .map(|r| BuyerRadarPoint {
            name: truncate_label(text_or_empty(&r.buyer), RADAR_LABEL_WIDTH),
            service_level: round_to(number_or_zero(r.service_level) * 100.0, 1),
            rupture_score: round_to(100.0 - number_or_zero(r.rupture_pct) * 100.0, 1),
            excess_score: round_to(100.0 - number_or_zero(r.excess_pct) * 100.0, 1),
            sku_score: (number_or_zero(r.active_skus) / 10.0).min(100.0),
        })
        .collect()
}

/// Inventory at cost and at sale price, whole millions.
pub fn value_comparison(
    records: &[BuyerRecord],
    options: &ChartOptions,
) -> Vec<InventoryValueComparison> {
    records
        .iter()
        .map(|r| InventoryValueComparison {
            name: truncate_label(text_or_empty(&r.buyer), options.short_label_width),
            cost: millions(number_or_zero(r.stock_value_cost)),
            sale: millions(number_or_zero(r.stock_value_sale)),
        })
        .collect()
}
