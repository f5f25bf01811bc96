//! JSON export: a pretty-printed array of row objects in header order.

use crate::data::{OrderedRow, Table};

pub fn to_json(table: &Table) -> Result<String, serde_json::Error> {
    let rows: Vec<OrderedRow<'_>> = table.ordered_rows().collect();
    serde_json::to_string_pretty(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CellValue, Row};

    #[test]
    fn pretty_prints_rows_in_header_order() {
        let table = Table::new(
            "t",
            vec!["name".to_string(), "qty".to_string()],
            vec![Row::from_iter([("name", CellValue::from("A")), ("qty", CellValue::from(10.0))])],
        );
        let json = to_json(&table).unwrap();
        assert_eq!(json, "[\n  {\n    \"name\": \"A\",\n    \"qty\": 10\n  }\n]");
    }

    #[test]
    fn empty_table_is_empty_array() {
        let table = Table::new("t", vec!["a".to_string()], Vec::new());
        assert_eq!(to_json(&table).unwrap(), "[]");
    }
}
