//! Supplier view: service level, rupture and excess per supplier.

use super::{format_millions, millions, round_to, truncate_label, ChartOptions, Kpi, KpiStatus};
use crate::data::records::{number_or_zero, text_or_empty, SupplierRecord};
use crate::stats::{average, group_sum, rank_by, top_by, GroupAccumulator, SortOrder};
use serde::Serialize;

/// Service-level KPIs. Service level is reported ×100; the two ratios as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierKpis {
    pub average_service_level: f64,
    pub average_rupture_pct: f64,
    pub average_excess_pct: f64,
    pub total_inventory_value: f64,
}

impl SupplierKpis {
    pub fn compute(records: &[SupplierRecord]) -> Self {
        Self {
            average_service_level: average(records, |r| number_or_zero(r.service_level)) * 100.0,
            average_rupture_pct: average(records, |r| number_or_zero(r.rupture_pct)),
            average_excess_pct: average(records, |r| number_or_zero(r.excess_pct)),
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

/// The four cards shared by the supplier and buyer views.
pub(crate) fn service_cards(service: f64, rupture: f64, excess: f64, inventory: f64) -> Vec<Kpi> {
    vec![
        Kpi::new("Nível de Serviço Médio", service, format!("{:.1}%", service))
            .with_status(KpiStatus::at_least(service, 85.0, 75.0)),
        Kpi::new("Ruptura Média", rupture, format!("{:.2}%", rupture))
            .with_status(KpiStatus::at_most(rupture, 5.0, 10.0)),
        Kpi::new("Excesso Médio", excess, format!("{:.2}%", excess))
            .with_status(KpiStatus::at_most(excess, 5.0, 10.0)),
        Kpi::new("Valor Total Estoque", inventory, format_millions(inventory)),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierServicePoint {
    pub name: String,
    pub service_level: f64,
    pub rupture: f64,
    pub excess: f64,
    /// Inventory at sale price, whole millions.
    pub inventory: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuptureExcessPoint {
    pub name: String,
    pub rupture: f64,
    pub excess: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerServiceShare {
    pub name: String,
    pub count: usize,
    pub average_service_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierView {
    pub kpis: SupplierKpis,
    pub top_by_service_level: Vec<SupplierServicePoint>,
    pub rupture_excess: Vec<RuptureExcessPoint>,
    pub buyer_distribution: Vec<BuyerServiceShare>,
}

impl SupplierView {
    pub fn build(records: &[SupplierRecord], options: &ChartOptions) -> Self {
        Self {
            kpis: SupplierKpis::compute(records),
            top_by_service_level: top_by_service_level(records, options),
            rupture_excess: rupture_excess(records),
            buyer_distribution: buyer_distribution(records),
        }
    }
}

/// Suppliers with the best service level.
pub fn top_by_service_level(
    records: &[SupplierRecord],
    options: &ChartOptions,
) -> Vec<SupplierServicePoint> {
    top_by(records, options.top_n, SortOrder::Descending, |r| {
        number_or_zero(r.service_level)
    })
    .into_iter()
    .map(|r| SupplierServicePoint {
        name: truncate_label(text_or_empty(&r.supplier), options.short_label_width),
        service_level: round_to(number_or_zero(r.service_level) * 100.0, 1),
        rupture: round_to(number_or_zero(r.rupture_pct), 2),
        excess: round_to(number_or_zero(r.excess_pct), 2),
        inventory: millions(number_or_zero(r.stock_value_sale)),
    })
    .collect()
}

/// Rupture against excess for every supplier with non-negative ratios.
pub fn rupture_excess(records: &[SupplierRecord]) -> Vec<RuptureExcessPoint> {
    records
        .iter()
        .map(|r| (r, number_or_zero(r.rupture_pct), number_or_zero(r.excess_pct)))
        .filter(|(_, rupture, excess)| *rupture >= 0.0 && *excess >= 0.0)
        .map(|(r, rupture, excess)| RuptureExcessPoint {
            name: text_or_empty(&r.supplier).to_string(),
            rupture: round_to(rupture, 2),
            excess: round_to(excess, 2),
        })
        .collect()
}

/// Supplier count and average service level (×100) per buyer, best first.
///
/// Buyer names are trimmed before grouping.
pub fn buyer_distribution(records: &[SupplierRecord]) -> Vec<BuyerServiceShare> {
    let by_buyer = group_sum(
        records,
        |r| text_or_empty(&r.buyer).trim().to_string(),
        |r| number_or_zero(r.service_level),
    );
    let ranked = rank_by(&by_buyer, None, SortOrder::Descending, |g| {
        round_to(g.mean() * 100.0, 1)
    });
    ranked
        .into_iter()
        .map(|entry| BuyerServiceShare {
            count: by_buyer.get(&entry.key).map_or(0, |g: &GroupAccumulator| g.count),
            name: entry.key,
            average_service_level: entry.value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn supplier(name: &str, buyer: &str, service: f64, rupture: f64, excess: f64) -> SupplierRecord {
        SupplierRecord {
            supplier: Some(name.to_string()),
            buyer: Some(buyer.to_string()),
            service_level: Some(service),
            rupture_pct: Some(rupture),
            excess_pct: Some(excess),
            stock_value_sale: Some(1_000_000.0),
            ..SupplierRecord::default()
        }
    }

    fn sample() -> Vec<SupplierRecord> {
        vec![
            supplier("ALIMENTOS BRASIL SA", "ANA", 0.9, 4.0, 2.0),
            supplier("BETA", "ANA ", 0.8, 12.0, 1.0),
            supplier("GAMA", "JOSE", 1.0, -1.0, 3.0),
        ]
    }

    #[test]
    fn kpis_scale_only_service_level() {
        let kpis = SupplierKpis::compute(&sample());
        assert!((kpis.average_service_level - 90.0).abs() < 1e-9);
        assert!((kpis.average_rupture_pct - 5.0).abs() < 1e-9);
        assert_eq!(kpis.total_inventory_value, 3_000_000.0);

        let cards = kpis.cards();
        assert_eq!(cards[0].status, Some(KpiStatus::Good));
        assert_eq!(cards[3].display, "R$ 3.0M");
        assert_eq!(cards[3].status, None);
    }

    #[test]
    fn empty_records_do_not_divide_by_zero() {
        let kpis = SupplierKpis::compute(&[]);
        assert_eq!(kpis.average_service_level, 0.0);
        assert_eq!(kpis.cards()[0].status, Some(KpiStatus::Critical));
    }

    #[test]
    fn top_service_levels() {
        let top = top_by_service_level(&sample(), &ChartOptions { top_n: 2, ..ChartOptions::default() });
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "GAMA");
        assert_eq!(top[0].service_level, 100.0);
        assert_eq!(top[1].name, "ALIMENTOS BR");
        assert_eq!(top[1].inventory, 1.0);
    }

    #[test]
    fn scatter_drops_negative_ratios() {
        let points = rupture_excess(&sample());
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.name != "GAMA"));
    }

    #[test]
    fn buyer_keys_are_trimmed() {
        let distribution = buyer_distribution(&sample());
        assert_eq!(
            distribution,
            vec![
                BuyerServiceShare {
                    name: "JOSE".into(),
                    count: 1,
                    average_service_level: 100.0
                },
                BuyerServiceShare {
                    name: "ANA".into(),
                    count: 2,
                    average_service_level: 85.0
                },
            ]
        );
    }
}
