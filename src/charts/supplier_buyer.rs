//! Supplier × buyer view: project value heatmap, rankings and period-scoped values.
//!
//! Only rows whose trimmed short supplier and buyer names are both present take part.

use super::{format_millions, millions, truncate_with_ellipsis, ChartOptions, Kpi, NamedValue};
use crate::data::records::{number_or_zero, text_or_empty, SupplierBuyerRecord};
use crate::period::PeriodSelection;
use crate::stats::{
    cross_tab, group_sum, rank_by, top_n, CrossTabMatrix, IntensityBand, RankedEntry, SortOrder,
};
use rustc_hash::FxHashSet;
use serde::Serialize;

fn supplier_key(record: &SupplierBuyerRecord) -> String {
    text_or_empty(&record.supplier_short).trim().to_string()
}

fn buyer_key(record: &SupplierBuyerRecord) -> String {
    text_or_empty(&record.buyer_short).trim().to_string()
}

fn project_value(record: &SupplierBuyerRecord) -> f64 {
    number_or_zero(record.project_value)
}

/// Rows with both a supplier and a buyer.
pub fn paired_rows(records: &[SupplierBuyerRecord]) -> Vec<&SupplierBuyerRecord> {
    records
        .iter()
        .filter(|r| !supplier_key(r).is_empty() && !buyer_key(r).is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierBuyerKpis {
    pub suppliers: usize,
    pub buyers: usize,
    pub total_value: f64,
    pub total_margin: f64,
    pub top_buyer: Option<RankedEntry>,
}

impl SupplierBuyerKpis {
    pub fn compute(records: &[SupplierBuyerRecord]) -> Self {
        let paired = paired_rows(records);
        let suppliers: FxHashSet<String> = paired.iter().map(|r| supplier_key(r)).collect();
        let buyers: FxHashSet<String> = paired.iter().map(|r| buyer_key(r)).collect();
        let by_buyer = group_sum(&paired, |r| buyer_key(r), |r| project_value(r));

        Self {
            suppliers: suppliers.len(),
            buyers: buyers.len(),
            total_value: paired.iter().map(|r| project_value(r)).sum(),
            total_margin: paired
                .iter()
                .map(|r| number_or_zero(r.project_margin))
                .sum(),
            top_buyer: top_n(&by_buyer, 1, SortOrder::Descending).into_iter().next(),
        }
    }

    pub fn cards(&self) -> Vec<Kpi> {
        let (top_name, top_value) = match &self.top_buyer {
            Some(entry) => (entry.key.as_str(), entry.value),
            None => ("N/A", 0.0),
        };
        vec![
            Kpi::new("Total de Fornecedores", self.suppliers as f64, self.suppliers.to_string()),
            Kpi::new("Total de Compradores", self.buyers as f64, self.buyers.to_string()),
            Kpi::new(
                "Valor Total Projeto",
                self.total_value,
                format_millions(self.total_value),
            ),
            Kpi::new(
                format!("Maior Comprador: {}", top_name),
                top_value,
                format_millions(top_value),
            ),
        ]
    }
}

/// One heatmap cell with its shading bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub supplier: String,
    pub buyer: String,
    pub value: f64,
    pub intensity: f64,
    pub band: IntensityBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Heatmap {
    pub suppliers: Vec<String>,
    pub buyers: Vec<String>,
    pub max_value: f64,
    pub cells: Vec<HeatmapCell>,
}

impl From<&CrossTabMatrix> for Heatmap {
    fn from(matrix: &CrossTabMatrix) -> Self {
        let suppliers: Vec<String> = matrix.row_keys().map(str::to_string).collect();
        let buyers: Vec<String> = matrix.col_keys().map(str::to_string).collect();
        let cells = suppliers
            .iter()
            .flat_map(|s| buyers.iter().map(move |b| (s, b)))
            .filter_map(|(s, b)| {
                matrix.cell(s, b).map(|value| HeatmapCell {
                    supplier: s.clone(),
                    buyer: b.clone(),
                    value,
                    intensity: matrix.intensity(s, b),
                    band: matrix.band(s, b),
                })
            })
            .collect();
        Self {
            suppliers,
            buyers,
            max_value: matrix.max_value(),
            cells,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierBuyerView {
    pub kpis: SupplierBuyerKpis,
    pub heatmap: Heatmap,
    pub top_suppliers: Vec<NamedValue>,
    pub buyer_distribution: Vec<NamedValue>,
}

impl SupplierBuyerView {
    pub fn build(records: &[SupplierBuyerRecord], options: &ChartOptions) -> Self {
        Self {
            kpis: SupplierBuyerKpis::compute(records),
            heatmap: Heatmap::from(&value_matrix(records)),
            top_suppliers: top_suppliers(records, options),
            buyer_distribution: buyer_distribution(records),
        }
    }
}

/// Project value cross-tabulated by supplier and buyer.
pub fn value_matrix(records: &[SupplierBuyerRecord]) -> CrossTabMatrix {
    cross_tab(records, supplier_key, buyer_key, project_value)
}

/// Suppliers with the largest project value, in whole millions.
pub fn top_suppliers(records: &[SupplierBuyerRecord], options: &ChartOptions) -> Vec<NamedValue> {
    let paired = paired_rows(records);
    let by_supplier = group_sum(&paired, |r| supplier_key(r), |r| project_value(r));
    top_n(&by_supplier, options.top_n, SortOrder::Descending)
        .into_iter()
        .map(|e| {
            NamedValue::new(
                truncate_with_ellipsis(&e.key, options.label_width),
                millions(e.value),
            )
        })
        .collect()
}

/// Project value per buyer in whole millions, largest first.
pub fn buyer_distribution(records: &[SupplierBuyerRecord]) -> Vec<NamedValue> {
    let paired = paired_rows(records);
    let by_buyer = group_sum(&paired, |r| buyer_key(r), |r| project_value(r));
    rank_by(&by_buyer, None, SortOrder::Descending, |g| millions(g.sum))
        .into_iter()
        .map(|e| NamedValue::new(e.key, e.value))
        .collect()
}

/// Sum of the month columns covered by `period`.
pub fn period_value(record: &SupplierBuyerRecord, period: &PeriodSelection) -> f64 {
    period.months().map(|m| record.month_value(m)).sum()
}

/// Period-scoped value per supplier, largest first.
pub fn period_ranking(
    records: &[SupplierBuyerRecord],
    period: &PeriodSelection,
    options: &ChartOptions,
) -> Vec<NamedValue> {
    let paired = paired_rows(records);
    let by_supplier = group_sum(&paired, |r| supplier_key(r), |r| period_value(r, period));
    top_n(&by_supplier, options.top_n, SortOrder::Descending)
        .into_iter()
        .map(|e| NamedValue::new(truncate_with_ellipsis(&e.key, options.label_width), e.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pair(supplier: &str, buyer: &str, value: f64) -> SupplierBuyerRecord {
        SupplierBuyerRecord {
            supplier_short: Some(supplier.to_string()),
            buyer_short: Some(buyer.to_string()),
            project_value: Some(value),
            project_margin: Some(0.2),
            jan: Some(100.0),
            feb: Some(200.0),
            mar: Some(300.0),
            apr: Some(400.0),
            ..SupplierBuyerRecord::default()
        }
    }

    fn sample() -> Vec<SupplierBuyerRecord> {
        vec![
            pair("ACME", "ANA", 3_000_000.0),
            pair(" ACME ", "ANA", 1_000_000.0),
            pair("FORNECEDOR COM NOME LONGO", "JOSE", 2_000_000.0),
            pair("BETA", "", 9_000_000.0),
            pair("", "JOSE", 9_000_000.0),
        ]
    }

    #[test]
    fn kpis_use_paired_rows_only() {
        let kpis = SupplierBuyerKpis::compute(&sample());
        assert_eq!(kpis.suppliers, 2);
        assert_eq!(kpis.buyers, 2);
        assert_eq!(kpis.total_value, 6_000_000.0);
        assert_eq!(
            kpis.top_buyer,
            Some(RankedEntry {
                key: "ANA".into(),
                value: 4_000_000.0
            })
        );
        assert_eq!(kpis.cards()[3].label, "Maior Comprador: ANA");
        assert_eq!(kpis.cards()[3].display, "R$ 4.0M");
    }

    #[test]
    fn no_pairs_reports_placeholder_buyer() {
        let kpis = SupplierBuyerKpis::compute(&[pair("", "", 1.0)]);
        assert_eq!(kpis.top_buyer, None);
        assert_eq!(kpis.cards()[3].label, "Maior Comprador: N/A");
    }

    #[test]
    fn heatmap_merges_trimmed_keys() {
        let heatmap = Heatmap::from(&value_matrix(&sample()));
        assert_eq!(heatmap.suppliers, vec!["ACME", "FORNECEDOR COM NOME LONGO"]);
        assert_eq!(heatmap.buyers, vec!["ANA", "JOSE"]);
        assert_eq!(heatmap.cells.len(), 2);
        assert_eq!(heatmap.max_value, 4_000_000.0);
        assert_eq!(heatmap.cells[0].band, IntensityBand::VeryHigh);
        assert_eq!(heatmap.cells[1].band, IntensityBand::High);
    }

    #[test]
    fn top_suppliers_get_ellipsis() {
        let top = top_suppliers(&sample(), &ChartOptions::default());
        assert_eq!(top[0], NamedValue::new("ACME", 4.0));
        assert_eq!(top[1], NamedValue::new("FORNECEDOR COM ...", 2.0));
    }

    #[test]
    fn buyer_distribution_in_millions() {
        let distribution = buyer_distribution(&sample());
        assert_eq!(
            distribution,
            vec![NamedValue::new("ANA", 4.0), NamedValue::new("JOSE", 2.0)]
        );
    }

    #[test]
    fn period_values_sum_selected_months() {
        let record = pair("ACME", "ANA", 0.0);
        let q1 = PeriodSelection::quarter(2026, 1).unwrap();
        let april = PeriodSelection::month(2026, 4).unwrap();
        let s2 = PeriodSelection::semester(2026, 2).unwrap();
        assert_eq!(period_value(&record, &q1), 600.0);
        assert_eq!(period_value(&record, &april), 400.0);
        assert_eq!(period_value(&record, &s2), 0.0);

        let ranking = period_ranking(&sample(), &q1, &ChartOptions::default());
        assert_eq!(ranking[0], NamedValue::new("ACME", 1200.0));
    }
}
