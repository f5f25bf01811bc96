//! Data Processor Module
//! Row filtering (free-text search + exact column matches), picker values and paging.

use super::table::{Row, Table};
use super::value::CellValue;
use rustc_hash::FxHashSet;

/// Free-text search plus exact-match column filters.
///
/// An empty filter passes every row through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    search: Option<String>,
    exact: Vec<(String, String)>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring search over every cell. Blank terms are ignored.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.is_empty() {
            None
        } else {
            Some(term.to_lowercase())
        };
        self
    }

    /// Require `column` to render exactly as `value`. Filters combine with AND.
    pub fn with_exact(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.exact.push((column.into(), value.into()));
        self
    }

    pub fn is_passthrough(&self) -> bool {
        self.search.is_none() && self.exact.is_empty()
    }

    pub fn matches(&self, row: &Row) -> bool {
        let exact_ok = self
            .exact
            .iter()
            .all(|(column, value)| row.get(column).to_key() == *value);
        if !exact_ok {
            return false;
        }
        match &self.search {
            Some(term) => row
                .values()
                .any(|v| v.to_key().to_lowercase().contains(term.as_str())),
            None => true,
        }
    }
}

/// One page of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
}

/// Filtering and listing helpers over tables and record slices.
pub struct DataProcessor;

impl DataProcessor {
    /// Apply a filter, producing a new table. A passthrough filter clones the table.
    pub fn filter_table(table: &Table, filter: &RowFilter) -> Table {
        if filter.is_passthrough() {
            return table.clone();
        }
        let filtered = table.filtered(|row| filter.matches(row));
        tracing::debug!(
            table = table.name(),
            kept = filtered.len(),
            total = table.len(),
            "filter applied"
        );
        filtered
    }

    /// First-seen distinct non-null values of a column, at most `limit`.
    pub fn distinct_values(table: &Table, column: &str, limit: usize) -> Vec<CellValue> {
        let mut seen = FxHashSet::default();
        table
            .column(column)
            .filter(|v| !matches!(v, CellValue::Null))
            .filter(|v| seen.insert(v.to_key()))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Sorted distinct non-empty keys, for filter pickers.
    pub fn sorted_distinct<T, K>(items: &[T], key_fn: K) -> Vec<String>
    where
        K: Fn(&T) -> Option<String>,
    {
        let mut keys: Vec<String> = items
            .iter()
            .filter_map(&key_fn)
            .filter(|k| !k.is_empty())
            .collect::<FxHashSet<_>>()
            .into_iter()
            .collect();
        keys.sort();
        keys
    }

    /// Slice out 1-based page `page` of `per_page` items. Out-of-range pages clamp.
    pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
        let per_page = per_page.max(1);
        let total_pages = items.len().div_ceil(per_page);
        let page = page.clamp(1, total_pages.max(1));
        let start = ((page - 1) * per_page).min(items.len());
        let end = (start + per_page).min(items.len());
        Page {
            items: &items[start..end],
            page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Table {
        let headers = vec!["supplier".to_string(), "buyer".to_string(), "qty".to_string()];
        let rows = vec![
            Row::from_iter([
                ("supplier", CellValue::from("Acme Foods")),
                ("buyer", CellValue::from("ANA")),
                ("qty", CellValue::from(10.0)),
            ]),
            Row::from_iter([
                ("supplier", CellValue::from("Beta")),
                ("buyer", CellValue::from("ANA")),
                ("qty", CellValue::from(25.0)),
            ]),
            Row::from_iter([
                ("supplier", CellValue::from("Acme Foods")),
                ("buyer", CellValue::from("JOSE")),
                ("qty", CellValue::Null),
            ]),
        ];
        Table::new("sample", headers, rows)
    }

    #[test]
    fn empty_filter_is_passthrough() {
        let table = sample();
        let filter = RowFilter::new().with_search("");
        assert!(filter.is_passthrough());
        assert_eq!(DataProcessor::filter_table(&table, &filter).len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_over_any_cell() {
        let table = sample();
        let filtered = DataProcessor::filter_table(&table, &RowFilter::new().with_search("acme"));
        assert_eq!(filtered.len(), 2);

        let by_number = DataProcessor::filter_table(&table, &RowFilter::new().with_search("25"));
        assert_eq!(by_number.len(), 1);
    }

    #[test]
    fn exact_filters_combine_with_and() {
        let table = sample();
        let filter = RowFilter::new()
            .with_exact("supplier", "Acme Foods")
            .with_exact("buyer", "JOSE");
        let filtered = DataProcessor::filter_table(&table, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.stats().total_rows, 1);
    }

    #[test]
    fn distinct_values_skip_null_and_keep_first_seen_order() {
        let table = sample();
        let values = DataProcessor::distinct_values(&table, "supplier", 10);
        assert_eq!(values, vec![CellValue::from("Acme Foods"), CellValue::from("Beta")]);
        assert_eq!(DataProcessor::distinct_values(&table, "qty", 10).len(), 2);
    }

    #[test]
    fn sorted_distinct_drops_blanks() {
        let names = vec![Some("b".to_string()), None, Some("".to_string()), Some("a".to_string()), Some("b".to_string())];
        let keys = DataProcessor::sorted_distinct(&names, |n| n.clone());
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn paginate_clamps_pages() {
        let items: Vec<u32> = (1..=32).collect();
        let first = DataProcessor::paginate(&items, 1, 15);
        assert_eq!(first.items.len(), 15);
        assert_eq!(first.total_pages, 3);

        let last = DataProcessor::paginate(&items, 9, 15);
        assert_eq!(last.page, 3);
        assert_eq!(last.items, &[31, 32]);

        let empty: Vec<u32> = Vec::new();
        let page = DataProcessor::paginate(&empty, 1, 15);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }
}
