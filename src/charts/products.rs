//! Product view: ABC curve mix, supplier/buyer product counts, stock vs turnover.

use super::{format_count, round_half_up, truncate_label, ChartOptions, Kpi, NamedValue};
use crate::data::records::{number_or_zero, text_or, ProductRecord};
use crate::stats::{count_by, group_sum, rank_by, top_n, SortOrder};
use serde::Serialize;

const UNCLASSIFIED: &str = "Não classificado";
const UNKNOWN: &str = "Desconhecido";
const NO_CURVE: &str = "N/A";
const SCATTER_LIMIT: usize = 300;

/// Averages of one ABC curve for the bubble chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveBubble {
    pub curve: String,
    pub count: usize,
    pub avg_stock: f64,
    pub avg_turnover: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockTurnoverPoint {
    pub stock: f64,
    pub turnover: f64,
    pub curve: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductKpis {
    pub total_products: usize,
    pub total_stock: f64,
    /// Turnover total divided by the number of products with stock or turnover.
    pub average_turnover: f64,
    pub pending_orders: f64,
}

impl ProductKpis {
    pub fn compute(records: &[ProductRecord]) -> Self {
        let mut total_stock = 0.0;
        let mut total_turnover = 0.0;
        let mut pending_orders = 0.0;
        let mut active = 0usize;
        for record in records {
            let stock = number_or_zero(record.available_stock);
            let turnover = number_or_zero(record.monthly_turnover);
            total_stock += stock;
            total_turnover += turnover;
            pending_orders += number_or_zero(record.pending_quantity);
            if stock > 0.0 || turnover > 0.0 {
                active += 1;
            }
        }
        Self {
            total_products: records.len(),
            total_stock,
            average_turnover: if active > 0 {
                total_turnover / active as f64
            } else {
                0.0
            },
            pending_orders,
        }
    }

    pub fn cards(&self) -> Vec<Kpi> {
        vec![
            Kpi::new(
                "Total de Produtos",
                self.total_products as f64,
                format_count(self.total_products as f64),
            ),
            Kpi::new("Estoque Total", self.total_stock, format_count(self.total_stock)),
            Kpi::new(
                "Giro Médio Mensal",
                self.average_turnover,
                format!("{:.2}", self.average_turnover),
            ),
            Kpi::new(
                "Pedidos Pendentes",
                self.pending_orders,
                format_count(self.pending_orders),
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub kpis: ProductKpis,
    pub curve_distribution: Vec<NamedValue>,
    pub top_suppliers: Vec<NamedValue>,
    pub top_buyers: Vec<NamedValue>,
    pub curve_bubbles: Vec<CurveBubble>,
    pub scatter: Vec<StockTurnoverPoint>,
}

impl ProductView {
    pub fn build(records: &[ProductRecord], options: &ChartOptions) -> Self {
        Self {
            kpis: ProductKpis::compute(records),
            curve_distribution: curve_distribution(records),
            top_suppliers: top_suppliers(records, options),
            top_buyers: top_buyers(records, options),
            curve_bubbles: curve_bubbles(records),
            scatter: stock_turnover_scatter(records),
        }
    }
}

fn has_activity(record: &ProductRecord) -> bool {
    number_or_zero(record.available_stock) > 0.0 || number_or_zero(record.monthly_turnover) > 0.0
}

/// Product count per ABC curve, largest first.
pub fn curve_distribution(records: &[ProductRecord]) -> Vec<NamedValue> {
    let counts = count_by(records, |r| text_or(&r.abc_curve, UNCLASSIFIED).to_string());
    rank_by(&counts, None, SortOrder::Descending, |g| g.sum)
        .into_iter()
        .map(|e| NamedValue::new(e.key, e.value))
        .collect()
}

/// Suppliers with the most products. Labels are cut to the configured width.
pub fn top_suppliers(records: &[ProductRecord], options: &ChartOptions) -> Vec<NamedValue> {
    let counts = count_by(records, |r| text_or(&r.supplier, UNKNOWN).to_string());
    top_n(&counts, options.top_n, SortOrder::Descending)
        .into_iter()
        .map(|e| NamedValue::new(truncate_label(&e.key, options.label_width), e.value))
        .collect()
}

/// Buyers with the most products.
pub fn top_buyers(records: &[ProductRecord], options: &ChartOptions) -> Vec<NamedValue> {
    let counts = count_by(records, |r| text_or(&r.buyer, UNKNOWN).to_string());
    top_n(&counts, options.top_n, SortOrder::Descending)
        .into_iter()
        .map(|e| NamedValue::new(e.key, e.value))
        .collect()
}

/// Average stock and turnover per curve, most populated curve first.
pub fn curve_bubbles(records: &[ProductRecord]) -> Vec<CurveBubble> {
    let curve_of = |r: &ProductRecord| text_or(&r.abc_curve, NO_CURVE).to_string();
    let stock = group_sum(records, curve_of, |r| number_or_zero(r.available_stock));
    let turnover = group_sum(records, curve_of, |r| number_or_zero(r.monthly_turnover));

    let mut bubbles: Vec<CurveBubble> = stock
        .iter()
        .map(|(curve, acc)| CurveBubble {
            curve: curve.to_string(),
            count: acc.count,
            avg_stock: round_half_up(acc.mean()),
            avg_turnover: turnover.get(curve).map_or(0.0, |t| round_half_up(t.mean())),
        })
        .collect();
    bubbles.sort_by(|a, b| b.count.cmp(&a.count));
    bubbles
}

/// First products with stock or turnover, capped for plotting.
pub fn stock_turnover_scatter(records: &[ProductRecord]) -> Vec<StockTurnoverPoint> {
    records
        .iter()
        .filter(|r| has_activity(r))
        .take(SCATTER_LIMIT)
        .map(|r| StockTurnoverPoint {
            stock: number_or_zero(r.available_stock),
            turnover: number_or_zero(r.monthly_turnover),
            curve: text_or(&r.abc_curve, NO_CURVE).to_string(),
        })
        .collect()
}
