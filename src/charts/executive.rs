//! Executive view: one KPI strip across the four sheets plus annual-value rankings.

use super::{format_count, truncate_label, ChartOptions, Kpi, KpiStatus, NamedValue};
use crate::data::records::{
    number_or_zero, text_or, BuyerRecord, ProductRecord, SupplierBuyerRecord, SupplierRecord,
};
use crate::stats::{average, group_sum, rank_by, top_n, SortOrder};
use serde::Serialize;

const UNKNOWN: &str = "Desconhecido";
const IMPORTANT_BRAND: &str = "IMPORTANTE";

/// The four static sheets, borrowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sheets<'a> {
    pub products: &'a [ProductRecord],
    pub suppliers: &'a [SupplierRecord],
    pub buyers: &'a [BuyerRecord],
    pub pairs: &'a [SupplierBuyerRecord],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveView {
    pub kpis: Vec<Kpi>,
    pub top_suppliers_by_value: Vec<NamedValue>,
    pub buyer_distribution: Vec<NamedValue>,
}

impl ExecutiveView {
    /// Sheets without rows contribute no cards.
    pub fn build(sheets: Sheets<'_>, options: &ChartOptions) -> Self {
        let mut kpis = Vec::new();
        kpis.extend(product_cards(sheets.products));
        kpis.extend(supplier_cards(sheets.suppliers));
        kpis.extend(buyer_cards(sheets.buyers));
        kpis.extend(pair_cards(sheets.pairs));
        Self {
            kpis,
            top_suppliers_by_value: top_suppliers_by_value(sheets.pairs, options),
            buyer_distribution: buyer_distribution(sheets.pairs, options),
        }
    }
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

fn product_cards(records: &[ProductRecord]) -> Vec<Kpi> {
    if records.is_empty() {
        return Vec::new();
    }
    let total = records.len() as f64;
    let stock: f64 = records.iter().map(|r| number_or_zero(r.available_stock)).sum();
    let turnover = average(records, |r| number_or_zero(r.monthly_turnover));
    let pending: f64 = records.iter().map(|r| number_or_zero(r.pending_quantity)).sum();
    vec![
        Kpi::new("Total de Produtos", total, format_count(total)),
        Kpi::new("Estoque Total", stock, format_count(stock)),
        Kpi::new("Giro Médio Mensal", turnover, format!("{:.2}", turnover)),
        Kpi::new("Pedidos Pendentes", pending, format_count(pending)),
    ]
}

fn supplier_cards(records: &[SupplierRecord]) -> Vec<Kpi> {
    if records.is_empty() {
        return Vec::new();
    }
    let total = records.len() as f64;
    let service = average(records, |r| number_or_zero(r.service_level)) * 100.0;
    let rupture = average(records, |r| number_or_zero(r.rupture_pct)) * 100.0;
    let stock_value: f64 = records.iter().map(|r| number_or_zero(r.stock_value_sale)).sum();
    vec![
        Kpi::new("Total de Fornecedores", total, format_count(total)),
        Kpi::new("Nível de Serviço Médio", service, percent(service))
            .with_status(KpiStatus::at_least(service, 90.0, 80.0)),
        Kpi::new("Taxa de Ruptura Média", rupture, percent(rupture))
            .with_status(KpiStatus::at_most(rupture, 5.0, 10.0)),
        Kpi::new(
            "Valor de Estoque (Venda)",
            stock_value,
            format!("{:.2}M", stock_value / 1_000_000.0),
        ),
    ]
}

fn buyer_cards(records: &[BuyerRecord]) -> Vec<Kpi> {
    if records.is_empty() {
        return Vec::new();
    }
    let total = records.len() as f64;
    let service = average(records, |r| number_or_zero(r.service_level)) * 100.0;
    let rupture = average(records, |r| number_or_zero(r.rupture_pct)) * 100.0;
    let active_skus: f64 = records.iter().map(|r| number_or_zero(r.active_skus)).sum();
    vec![
        Kpi::new("Total de Compradores", total, format_count(total)),
        Kpi::new("Nível de Serviço (Comprador)", service, percent(service))
            .with_status(KpiStatus::at_least(service, 90.0, 80.0)),
        Kpi::new("Taxa de Ruptura (Comprador)", rupture, percent(rupture))
            .with_status(KpiStatus::at_most(rupture, 5.0, 10.0)),
        Kpi::new("SKU Ativos Indústria", active_skus, format_count(active_skus)),
    ]
}

fn pair_cards(records: &[SupplierBuyerRecord]) -> Vec<Kpi> {
    if records.is_empty() {
        return Vec::new();
    }
    let combinations = records.len() as f64;
    let annual: f64 = records.iter().map(SupplierBuyerRecord::annual_value).sum();
    let margin = average(records, |r| number_or_zero(r.project_margin)) * 100.0;
    let important = important_brands(records) as f64;
    vec![
        Kpi::new(
            "Combinações Fornecedor×Comprador",
            combinations,
            format_count(combinations),
        ),
        Kpi::new(
            "Valor Total Anual",
            annual,
            format!("{:.2}M", annual / 1_000_000.0),
        ),
        Kpi::new("Margem Média", margin, percent(margin))
            .with_status(KpiStatus::at_least(margin, 25.0, 20.0)),
        Kpi::new("Marcas Importantes", important, format_count(important)),
    ]
}

/// Rows whose brand status is exactly `IMPORTANTE`.
pub fn important_brands(records: &[SupplierBuyerRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.brand_status.as_deref() == Some(IMPORTANT_BRAND))
        .count()
}

/// Suppliers ranked by the sum of their twelve monthly values.
pub fn top_suppliers_by_value(
    records: &[SupplierBuyerRecord],
    options: &ChartOptions,
) -> Vec<NamedValue> {
    let by_supplier = group_sum(
        records,
        |r| text_or(&r.supplier, UNKNOWN).to_string(),
        SupplierBuyerRecord::annual_value,
    );
    top_n(&by_supplier, options.top_n, SortOrder::Descending)
        .into_iter()
        .map(|e| NamedValue::new(truncate_label(&e.key, options.label_width), e.value))
        .collect()
}

/// Annual value per short buyer name, largest first.
pub fn buyer_distribution(records: &[SupplierBuyerRecord], options: &ChartOptions) -> Vec<NamedValue> {
    let by_buyer = group_sum(
        records,
        |r| text_or(&r.buyer_short, UNKNOWN).to_string(),
        SupplierBuyerRecord::annual_value,
    );
    rank_by(&by_buyer, None, SortOrder::Descending, |g| g.sum)
        .into_iter()
        .map(|e| NamedValue::new(truncate_label(&e.key, options.short_label_width), e.value))
        .collect()
}
