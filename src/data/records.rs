//! Static Record Shapes
//! Typed rows of the JSON resources served next to the dashboard.
//! Numeric fields accept numbers or numeric text; anything else reads as missing.

use super::value::{parse_number, CellValue};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = CellValue::deserialize(deserializer)?;
    Ok(match value {
        CellValue::Null => None,
        CellValue::Text(s) if s.trim().is_empty() => None,
        CellValue::Text(s) => parse_number(&s),
        other => other.coerce_number(),
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = CellValue::deserialize(deserializer)?;
    Ok(match value {
        CellValue::Null => None,
        other => Some(other.to_string()),
    })
}

/// Text field or "" when missing.
pub fn text_or_empty(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("")
}

/// Text field, or `fallback` when missing or empty.
pub fn text_or<'a>(field: &'a Option<String>, fallback: &'a str) -> &'a str {
    match field.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => fallback,
    }
}

/// Numeric field or 0 when missing.
pub fn number_or_zero(field: Option<f64>) -> f64 {
    field.filter(|v| !v.is_nan()).unwrap_or(0.0)
}

/// Product/inventory record (`sheet1_data.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Filial", default, deserialize_with = "lenient_number")]
    pub branch: Option<f64>,
    #[serde(rename = "BARRAS", default, deserialize_with = "lenient_number")]
    pub barcode: Option<f64>,
    #[serde(rename = "Código Produto", default, deserialize_with = "lenient_number")]
    pub product_code: Option<f64>,
    #[serde(rename = "DESCRIÇÃO", default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(rename = "COD. FORNEC", default, deserialize_with = "lenient_number")]
    pub supplier_code: Option<f64>,
    #[serde(rename = "FORNECEDOR", default, deserialize_with = "lenient_text")]
    pub supplier: Option<String>,
    #[serde(rename = "COMPRADOR", default, deserialize_with = "lenient_text")]
    pub buyer: Option<String>,
    #[serde(rename = "MARCA", default, deserialize_with = "lenient_text")]
    pub brand: Option<String>,
    #[serde(rename = "DEPARTAMENTO", default, deserialize_with = "lenient_text")]
    pub department: Option<String>,
    #[serde(rename = "LINHA", default, deserialize_with = "lenient_text")]
    pub product_line: Option<String>,
    #[serde(rename = "CURVA ABC", default, deserialize_with = "lenient_text")]
    pub abc_curve: Option<String>,
    #[serde(rename = "FORA DE LINHA", default, deserialize_with = "lenient_text")]
    pub discontinued: Option<String>,
    #[serde(rename = "ESTOQUE DISPONÍVEL", default, deserialize_with = "lenient_number")]
    pub available_stock: Option<f64>,
    #[serde(rename = "QUANTIDADE PEDIDA PENDENTE", default, deserialize_with = "lenient_number")]
    pub pending_quantity: Option<f64>,
    #[serde(rename = "AVARIADO", default, deserialize_with = "lenient_number")]
    pub damaged: Option<f64>,
    #[serde(rename = "BLOQUEADO", default, deserialize_with = "lenient_number")]
    pub blocked: Option<f64>,
    #[serde(rename = "RESERVADO", default, deserialize_with = "lenient_number")]
    pub reserved: Option<f64>,
    #[serde(rename = "QUANTIDADE VENDIDA TRI", default, deserialize_with = "lenient_number")]
    pub quarter_sold: Option<f64>,
    #[serde(rename = "GIRO MÉDIO MENSAL", default, deserialize_with = "lenient_number")]
    pub monthly_turnover: Option<f64>,
    #[serde(rename = "GIRO DIA", default, deserialize_with = "lenient_number")]
    pub daily_turnover: Option<f64>,
    #[serde(rename = "DATA ULTIMA ENTRADA", default, deserialize_with = "lenient_text")]
    pub last_entry_date: Option<String>,
}

/// Supplier service-level record (`sheet2_data.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    #[serde(rename = "COD", default, deserialize_with = "lenient_number")]
    pub code: Option<f64>,
    #[serde(rename = "Fornecedor", default, deserialize_with = "lenient_text")]
    pub supplier: Option<String>,
    #[serde(rename = "COMPRADOR", default, deserialize_with = "lenient_text")]
    pub buyer: Option<String>,
    #[serde(rename = "NIVEL SERVIÇO RUPTURA S/ PENDÊNCIA", default, deserialize_with = "lenient_number")]
    pub service_level: Option<f64>,
    #[serde(rename = "NIVEL SERVIÇO RUPTURA C/ PENDÊNCIA", default, deserialize_with = "lenient_number")]
    pub service_level_with_pending: Option<f64>,
    #[serde(rename = "PRAZO RUPTURA", default, deserialize_with = "lenient_number")]
    pub rupture_days: Option<f64>,
    #[serde(rename = "PRAZO EXCESSO", default, deserialize_with = "lenient_number")]
    pub excess_days: Option<f64>,
    #[serde(rename = "VALOR ESTOQUE PREÇO CUSTO", default, deserialize_with = "lenient_number")]
    pub stock_value_cost: Option<f64>,
    #[serde(rename = "VALOR ESTOQUE PREÇO VENDA", default, deserialize_with = "lenient_number")]
    pub stock_value_sale: Option<f64>,
    #[serde(rename = "RUPTURA VALOR", default, deserialize_with = "lenient_number")]
    pub rupture_value: Option<f64>,
    #[serde(rename = "% RUPTURA TOTAL", default, deserialize_with = "lenient_number")]
    pub rupture_pct: Option<f64>,
    #[serde(rename = "% RUPTURA CURVA A", default, deserialize_with = "lenient_number")]
    pub rupture_pct_curve_a: Option<f64>,
    #[serde(rename = "EXCESSO VALOR", default, deserialize_with = "lenient_number")]
    pub excess_value: Option<f64>,
    #[serde(rename = "% EXCESSO TOTAL", default, deserialize_with = "lenient_number")]
    pub excess_pct: Option<f64>,
    #[serde(rename = "SKU INDUSTRIA", default, deserialize_with = "lenient_number")]
    pub industry_skus: Option<f64>,
    #[serde(rename = "SKU INDUSTRIA FL", default, deserialize_with = "lenient_number")]
    pub industry_skus_discontinued: Option<f64>,
}

/// Buyer service-level record (`sheet3_data.json`).
///
/// Accepts both the spaced column names and the underscore names of the
/// "complete" export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuyerRecord {
    #[serde(rename = "COMPRADOR", default, deserialize_with = "lenient_text")]
    pub buyer: Option<String>,
    #[serde(
        rename = "NIVEL SERVIÇO RUPTURA S/ PENDÊNCIA",
        alias = "NIVEL_SERVICO_S_PENDENCIA",
        default,
        deserialize_with = "lenient_number"
    )]
    pub service_level: Option<f64>,
    #[serde(
        rename = "% RUPTURA TOTAL",
        alias = "RUPTURA_TOTAL",
        default,
        deserialize_with = "lenient_number"
    )]
    pub rupture_pct: Option<f64>,
    #[serde(
        rename = "% EXCESSO TOTAL",
        alias = "EXCESSO_TOTAL",
        default,
        deserialize_with = "lenient_number"
    )]
    pub excess_pct: Option<f64>,
    #[serde(
        rename = "VALOR ESTOQUE PREÇO CUSTO",
        alias = "VALOR_ESTOQUE_CUSTO",
        default,
        deserialize_with = "lenient_number"
    )]
    pub stock_value_cost: Option<f64>,
    #[serde(
        rename = "VALOR ESTOQUE PREÇO VENDA",
        alias = "VALOR_ESTOQUE_VENDA",
        default,
        deserialize_with = "lenient_number"
    )]
    pub stock_value_sale: Option<f64>,
    #[serde(
        rename = "SKU INDUSTRIA ATIVOS",
        alias = "SKU_ATIVOS",
        default,
        deserialize_with = "lenient_number"
    )]
    pub active_skus: Option<f64>,
    #[serde(rename = "PMP", default, deserialize_with = "lenient_number")]
    pub average_payment_days: Option<f64>,
}

/// Supplier × buyer project record (`sheet4_data.json`, `sheet4_complete_data.json`).
///
/// Month columns are only present in the complete export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierBuyerRecord {
    #[serde(rename = "COD", default, deserialize_with = "lenient_number")]
    pub code: Option<f64>,
    #[serde(rename = "FORNECEDOR", default, deserialize_with = "lenient_text")]
    pub supplier: Option<String>,
    #[serde(rename = "COMPRADOR 01/26", default, deserialize_with = "lenient_text")]
    pub buyer_of_record: Option<String>,
    #[serde(rename = "FORNECEDOR RESUMIDO", default, deserialize_with = "lenient_text")]
    pub supplier_short: Option<String>,
    #[serde(rename = "COMPRADOR RESUMIDO", default, deserialize_with = "lenient_text")]
    pub buyer_short: Option<String>,
    #[serde(rename = "STATUS DA MARCA", default, deserialize_with = "lenient_text")]
    pub brand_status: Option<String>,
    #[serde(rename = "PROJETO MARGEM", default, deserialize_with = "lenient_number")]
    pub project_margin: Option<f64>,
    #[serde(rename = "PROJETO VALOR", default, deserialize_with = "lenient_number")]
    pub project_value: Option<f64>,
    #[serde(rename = "JAN", default, deserialize_with = "lenient_number")]
    pub jan: Option<f64>,
    #[serde(rename = "FEV", default, deserialize_with = "lenient_number")]
    pub feb: Option<f64>,
    #[serde(rename = "MAR", default, deserialize_with = "lenient_number")]
    pub mar: Option<f64>,
    #[serde(rename = "ABR", default, deserialize_with = "lenient_number")]
    pub apr: Option<f64>,
    #[serde(rename = "MAI", default, deserialize_with = "lenient_number")]
    pub may: Option<f64>,
    #[serde(rename = "JUN", default, deserialize_with = "lenient_number")]
    pub jun: Option<f64>,
    #[serde(rename = "JUL", default, deserialize_with = "lenient_number")]
    pub jul: Option<f64>,
    #[serde(rename = "AGO", default, deserialize_with = "lenient_number")]
    pub aug: Option<f64>,
    #[serde(rename = "SET", default, deserialize_with = "lenient_number")]
    pub sep: Option<f64>,
    #[serde(rename = "OUT", default, deserialize_with = "lenient_number")]
    pub oct: Option<f64>,
    #[serde(rename = "NOV", default, deserialize_with = "lenient_number")]
    pub nov: Option<f64>,
    #[serde(rename = "DEZ", default, deserialize_with = "lenient_number")]
    pub dec: Option<f64>,
}

impl SupplierBuyerRecord {
    /// Monthly values January..December, missing months as 0.
    pub fn monthly_values(&self) -> [f64; 12] {
        [
            self.jan, self.feb, self.mar, self.apr, self.may, self.jun, self.jul, self.aug,
            self.sep, self.oct, self.nov, self.dec,
        ]
        .map(number_or_zero)
    }

    /// Value of one calendar month (1-12). Out-of-range months are 0.
    pub fn month_value(&self, month: u32) -> f64 {
        match month {
            1..=12 => self.monthly_values()[month as usize - 1],
            _ => 0.0,
        }
    }

    pub fn annual_value(&self) -> f64 {
        self.monthly_values().iter().sum()
    }
}

/// Per-group figures inside the consolidated summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupFigures {
    #[serde(rename = "faturamento2026", default, deserialize_with = "lenient_number")]
    pub revenue: Option<f64>,
    #[serde(rename = "estoqueVenda", default, deserialize_with = "lenient_number")]
    pub stock_value_sale: Option<f64>,
    #[serde(rename = "nivelServicoMedio", default, deserialize_with = "lenient_number")]
    pub average_service_level: Option<f64>,
    #[serde(rename = "rupturaPctMedio", default, deserialize_with = "lenient_number")]
    pub average_rupture_pct: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedMetadata {
    #[serde(default)]
    pub last_update: String,
    #[serde(default)]
    pub total_records: u64,
    #[serde(default, rename = "filiais")]
    pub branches: Vec<String>,
    #[serde(default, rename = "periodo")]
    pub period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedSummary {
    #[serde(rename = "totalFiliais", default)]
    pub total_branches: f64,
    #[serde(rename = "totalFornecedores", default)]
    pub total_suppliers: f64,
    #[serde(rename = "totalCompradores", default)]
    pub total_buyers: f64,
    #[serde(rename = "totalProdutos", default)]
    pub total_products: f64,
    #[serde(rename = "estoqueTotal", default)]
    pub total_stock: f64,
    #[serde(rename = "faturamento2026", default)]
    pub revenue: f64,
    #[serde(rename = "entrada2026", default)]
    pub inbound: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedAggregations {
    #[serde(rename = "byFilial", default)]
    pub by_branch: BTreeMap<String, GroupFigures>,
    #[serde(rename = "byFornecedor", default)]
    pub by_supplier: BTreeMap<String, GroupFigures>,
    #[serde(rename = "byComprador", default)]
    pub by_buyer: BTreeMap<String, GroupFigures>,
}

/// Pre-aggregated summary (`consolidated_data.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedData {
    #[serde(default)]
    pub metadata: ConsolidatedMetadata,
    #[serde(default)]
    pub summary: ConsolidatedSummary,
    #[serde(default)]
    pub aggregations: ConsolidatedAggregations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_fields_accept_text_and_null() {
        let json = r#"{
            "FORNECEDOR": "ACME",
            "ESTOQUE DISPONÍVEL": "12",
            "GIRO MÉDIO MENSAL": null,
            "CURVA ABC": "A",
            "QUANTIDADE PEDIDA PENDENTE": "n/a"
        }"#;
        let record: ProductRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.available_stock, Some(12.0));
        assert_eq!(record.monthly_turnover, None);
        assert_eq!(record.pending_quantity, None);
        assert_eq!(record.abc_curve.as_deref(), Some("A"));
        assert_eq!(record.buyer, None);
    }

    #[test]
    fn numeric_codes_read_as_text_fields() {
        let record: ProductRecord = serde_json::from_str(r#"{"COMPRADOR": 17}"#).unwrap();
        assert_eq!(record.buyer.as_deref(), Some("17"));
    }

    #[test]
    fn buyer_record_accepts_both_naming_styles() {
        let spaced: BuyerRecord =
            serde_json::from_str(r#"{"COMPRADOR": "ANA", "% RUPTURA TOTAL": 0.05}"#).unwrap();
        let underscored: BuyerRecord =
            serde_json::from_str(r#"{"COMPRADOR": "ANA", "RUPTURA_TOTAL": 0.05}"#).unwrap();
        assert_eq!(spaced.rupture_pct, Some(0.05));
        assert_eq!(underscored.rupture_pct, Some(0.05));
    }

    #[test]
    fn monthly_values_default_to_zero() {
        let record: SupplierBuyerRecord =
            serde_json::from_str(r#"{"JAN": 10, "MAR": "5", "DEZ": 1}"#).unwrap();
        assert_eq!(record.month_value(1), 10.0);
        assert_eq!(record.month_value(2), 0.0);
        assert_eq!(record.month_value(3), 5.0);
        assert_eq!(record.month_value(13), 0.0);
        assert_eq!(record.annual_value(), 16.0);
    }

    #[test]
    fn consolidated_tolerates_missing_sections() {
        let data: ConsolidatedData = serde_json::from_str(
            r#"{"summary": {"totalFiliais": 3, "estoqueTotal": 1500000},
                "aggregations": {"byFilial": {"1": {"faturamento2026": 10, "outro": 1}}}}"#,
        )
        .unwrap();
        assert_eq!(data.summary.total_branches, 3.0);
        assert_eq!(data.aggregations.by_branch["1"].revenue, Some(10.0));
        assert!(data.aggregations.by_branch["1"].extra.contains_key("outro"));
        assert!(data.metadata.branches.is_empty());
    }
}
