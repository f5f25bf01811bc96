//! Table Module
//! In-memory typed representation of one parsed sheet or file.

use super::value::CellValue;
use rayon::prelude::*;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

static NULL_CELL: CellValue = CellValue::Null;

/// Column type inferred from cell coercibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
}

/// Classify a column from its values.
///
/// Numeric iff every non-empty value coerces to a number and at least one
/// non-empty value exists. An all-empty column is Text.
pub fn classify_column<'a, I>(values: I) -> ColumnKind
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut saw_value = false;
    for value in values {
        if value.is_empty() {
            continue;
        }
        if value.coerce_number().is_none() {
            return ColumnKind::Text;
        }
        saw_value = true;
    }
    if saw_value {
        ColumnKind::Numeric
    } else {
        ColumnKind::Text
    }
}

/// One record, keyed by column name.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell for `column`, or null when the column is absent.
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&NULL_CELL)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.cells.values()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Row count and column classification, serialized in the dashboard's camelCase shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStats {
    pub total_rows: usize,
    pub numeric_columns: Vec<String>,
    pub text_columns: Vec<String>,
}

/// Ordered headers, uniform rows and per-column classification.
///
/// Immutable once built; filtering produces a new table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    rows: Vec<Row>,
    kinds: Vec<ColumnKind>,
    stats: TableStats,
}

impl Table {
    /// Build a table. Rows are padded with nulls so every row carries every header.
    pub fn new(name: impl Into<String>, headers: Vec<String>, mut rows: Vec<Row>) -> Self {
        for row in &mut rows {
            for header in &headers {
                if !row.contains(header) {
                    row.insert(header.clone(), CellValue::Null);
                }
            }
        }

        let kinds: Vec<ColumnKind> = headers
            .par_iter()
            .map(|header| classify_column(rows.iter().map(|row| row.get(header))))
            .collect();

        let stats = Self::build_stats(&headers, &kinds, rows.len());

        Self {
            name: name.into(),
            headers,
            rows,
            kinds,
            stats,
        }
    }

    fn build_stats(headers: &[String], kinds: &[ColumnKind], total_rows: usize) -> TableStats {
        let mut stats = TableStats {
            total_rows,
            ..TableStats::default()
        };
        for (header, kind) in headers.iter().zip(kinds) {
            match kind {
                ColumnKind::Numeric => stats.numeric_columns.push(header.clone()),
                ColumnKind::Text => stats.text_columns.push(header.clone()),
            }
        }
        stats
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn stats(&self) -> &TableStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        self.headers
            .iter()
            .position(|h| h == column)
            .map(|idx| self.kinds[idx])
    }

    /// Iterate the cells of one column in row order.
    pub fn column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows.iter().map(move |row| row.get(column))
    }

    /// Numeric values of a column, skipping empty and non-numeric cells.
    pub fn numeric_values(&self, column: &str) -> Vec<f64> {
        self.column(column)
            .filter(|v| !v.is_empty())
            .filter_map(CellValue::coerce_number)
            .collect()
    }

    /// A new table holding the rows accepted by `predicate`.
    ///
    /// Headers and column classification carry over from the source; only
    /// the row count is recomputed.
    pub fn filtered<F>(&self, predicate: F) -> Table
    where
        F: Fn(&Row) -> bool,
    {
        let rows: Vec<Row> = self.rows.iter().filter(|r| predicate(r)).cloned().collect();
        let stats = TableStats {
            total_rows: rows.len(),
            ..self.stats.clone()
        };
        Table {
            name: self.name.clone(),
            headers: self.headers.clone(),
            rows,
            kinds: self.kinds.clone(),
            stats,
        }
    }

    /// Rows paired with the header order, for order-preserving serialization.
    pub fn ordered_rows(&self) -> impl Iterator<Item = OrderedRow<'_>> {
        self.rows.iter().map(move |row| OrderedRow {
            headers: &self.headers,
            row,
        })
    }
}

/// A row serialized as an object whose keys follow the table's header order.
pub struct OrderedRow<'a> {
    headers: &'a [String],
    row: &'a Row,
}

impl Serialize for OrderedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for header in self.headers {
            map.serialize_entry(header, self.row.get(header))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cells(values: &[CellValue]) -> ColumnKind {
        classify_column(values.iter())
    }

    #[test]
    fn numeric_column_tolerates_blanks() {
        let kind = cells(&["1".into(), "2".into(), "".into(), CellValue::Null]);
        assert_eq!(kind, ColumnKind::Numeric);
    }

    #[test]
    fn all_empty_column_is_text() {
        let kind = cells(&["".into(), "".into(), CellValue::Null]);
        assert_eq!(kind, ColumnKind::Text);
    }

    #[test]
    fn one_word_makes_column_text() {
        assert_eq!(cells(&["1".into(), "abc".into()]), ColumnKind::Text);
    }

    #[test]
    fn rows_are_padded_to_headers() {
        let headers = vec!["name".to_string(), "qty".to_string()];
        let rows = vec![Row::from_iter([("name", CellValue::from("A"))])];
        let table = Table::new("t", headers.clone(), rows);

        assert_eq!(table.rows()[0].len(), headers.len());
        assert_eq!(table.rows()[0].get("qty"), &CellValue::Null);
        assert_eq!(table.stats().text_columns, vec!["name", "qty"]);
    }

    #[test]
    fn filtered_keeps_classification() {
        let headers = vec!["name".to_string(), "qty".to_string()];
        let rows = vec![
            Row::from_iter([("name", CellValue::from("A")), ("qty", CellValue::from(1.0))]),
            Row::from_iter([("name", CellValue::from("B")), ("qty", CellValue::from(2.0))]),
        ];
        let table = Table::new("t", headers, rows);
        let only_b = table.filtered(|row| row.get("name").to_key() == "B");

        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b.stats().total_rows, 1);
        assert_eq!(only_b.stats().numeric_columns, vec!["qty"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn ordered_rows_follow_header_order() {
        let headers = vec!["z".to_string(), "a".to_string()];
        let rows = vec![Row::from_iter([("z", CellValue::from(1.0)), ("a", CellValue::from("x"))])];
        let table = Table::new("t", headers, rows);
        let json = serde_json::to_string(&table.ordered_rows().collect::<Vec<_>>()).unwrap();
        assert_eq!(json, r#"[{"z":1,"a":"x"}]"#);
    }
}
