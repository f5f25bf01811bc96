use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use sheetlens::data::{ColumnKind, DataLoader, TabularFileParser};
use sheetlens::export::{render, ExportFormat};
use sheetlens::stats::{group_sum, top_n, SortOrder};
use sheetlens::ParseError;

const SAMPLE: &str = "name,qty\nA,10\nB,20\nC,30\n";

#[test]
fn csv_upload_to_grouped_sums() {
    let table = TabularFileParser::parse(SAMPLE.as_bytes(), "data.csv", Some("text/csv")).unwrap();

    let stats = table.stats();
    assert_eq!(stats.total_rows, 3);
    assert_eq!(stats.numeric_columns, vec!["qty"]);
    assert_eq!(stats.text_columns, vec!["name"]);

    let sums = group_sum(
        table.rows(),
        |r| r.get("name").to_key(),
        |r| r.get("qty").as_number_or_zero(),
    );
    assert_eq!(sums.sum("A"), 10.0);
    assert_eq!(sums.sum("B"), 20.0);
    assert_eq!(sums.sum("C"), 30.0);

    let ranked: Vec<String> = top_n(&sums, 2, SortOrder::Descending)
        .into_iter()
        .map(|e| e.key)
        .collect();
    assert_eq!(ranked, vec!["C", "B"]);
}

#[test]
fn stats_serialize_in_camel_case() {
    let table = TabularFileParser::parse(SAMPLE.as_bytes(), "data.csv", None).unwrap();
    let json = serde_json::to_value(table.stats()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "totalRows": 3,
            "numericColumns": ["qty"],
            "textColumns": ["name"],
        })
    );
}

#[test]
fn exported_csv_parses_back() {
    let source = "label,qty\n\"A, B \"\"test\"\"\",4\nplain,5\n";
    let table = TabularFileParser::parse(source.as_bytes(), "in.csv", None).unwrap();
    assert_eq!(table.rows()[0].get("label").to_key(), "A, B \"test\"");

    let exported = render(&table, ExportFormat::Csv, "").unwrap();
    assert!(exported.contains("\"A, B \"\"test\"\"\",4"));

    let reparsed = TabularFileParser::parse(exported.as_bytes(), "out.csv", None).unwrap();
    assert_eq!(reparsed.len(), 2);
    assert_eq!(reparsed.rows()[0].get("label").to_key(), "A, B \"test\"");
    assert_eq!(reparsed.rows()[1].get("qty").as_number_or_zero(), 5.0);
}

#[test]
fn unsupported_extension_is_rejected() {
    let err = TabularFileParser::parse(b"anything", "notes.txt", None).unwrap_err();
    assert_eq!(err.code(), "UNSUPPORTED_FORMAT");
}

#[test]
fn header_only_csv_is_empty() {
    let err = TabularFileParser::parse(b"name,qty\n", "empty.csv", None).unwrap_err();
    assert!(matches!(err, ParseError::EmptyFile(_)));
}

#[test]
fn loader_keeps_previous_table_on_failure() {
    let mut loader = DataLoader::new();
    loader.load(SAMPLE.as_bytes(), "data.csv", None).unwrap();
    assert!(loader.load(b"", "broken.txt", None).is_err());

    assert_eq!(loader.file_name(), Some("data.csv"));
    assert_eq!(loader.table().map(|t| t.len()), Some(3));
    assert_eq!(loader.last_error().map(|e| e.code()), Some("UNSUPPORTED_FORMAT"));
}

#[test]
fn malformed_upload_is_reported_and_previous_table_kept() {
    let mut loader = DataLoader::new();
    loader.load(SAMPLE.as_bytes(), "data.csv", None).unwrap();

    let err = loader.load(b"name,qty\nA\nB,2\n", "short.csv", None).unwrap_err();
    assert_eq!(err.code(), "MALFORMED_CONTENT");
    assert!(matches!(err, ParseError::MalformedContent(_)));
    assert_eq!(loader.table().map(|t| t.len()), Some(3));

    let err = TabularFileParser::parse_sheets(b"name,qty\nA,1,2\n", "wide.csv", None, None)
        .unwrap_err();
    assert_eq!(err.code(), "MALFORMED_CONTENT");
}

#[test]
fn repeated_headers_match_across_formats() {
    let from_csv = TabularFileParser::parse(b"item,item\nx,1\n", "d.csv", None).unwrap();

    let mut book = Workbook::new();
    let sheet = book.add_worksheet();
    sheet.write_string(0, 0, "item").unwrap();
    sheet.write_string(0, 1, "item").unwrap();
    sheet.write_string(1, 0, "x").unwrap();
    sheet.write_number(1, 1, 1.0).unwrap();
    let from_xlsx = TabularFileParser::parse(&book.save_to_buffer().unwrap(), "d.xlsx", None).unwrap();

    assert_eq!(from_csv.headers(), from_xlsx.headers());
    assert_eq!(from_csv.headers(), ["item", "item_1"]);
}

fn workbook(sheets: &[(&str, &[(&str, f64)])]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).unwrap();
        sheet.write_string(0, 0, "item").unwrap();
        sheet.write_string(0, 1, "value").unwrap();
        for (i, (item, value)) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, *item).unwrap();
            sheet.write_number(row, 1, *value).unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}

#[test]
fn xlsx_multi_sheet_skips_empty_sheets() {
    let bytes = workbook(&[
        ("Produtos", &[("arroz", 3.0), ("feijao", 4.0)]),
        ("Vazia", &[]),
        ("Compradores", &[("ANA", 1.0)]),
    ]);

    let data = TabularFileParser::parse_sheets(&bytes, "dados.xlsx", None, None).unwrap();
    assert_eq!(data.sheet_names, vec!["Produtos", "Compradores"]);
    assert_eq!(data.sheets[0].len(), 2);
    assert_eq!(
        data.sheets[0].column_kind("value"),
        Some(ColumnKind::Numeric)
    );

    let first = TabularFileParser::parse(&bytes, "dados.xlsx", None).unwrap();
    assert_eq!(first.name(), "Produtos");
}

#[test]
fn xlsx_sheet_selection_and_all_empty() {
    let bytes = workbook(&[("A", &[("x", 1.0)]), ("B", &[("y", 2.0)])]);
    let only_second = TabularFileParser::parse_sheets(&bytes, "d.xlsx", None, Some(&[1, 7])).unwrap();
    assert_eq!(only_second.sheet_names, vec!["B"]);

    let empty = workbook(&[("A", &[]), ("B", &[])]);
    let err = TabularFileParser::parse_sheets(&empty, "d.xlsx", None, None).unwrap_err();
    assert_eq!(err.code(), "EMPTY_FILE");
}

#[test]
fn csv_in_multi_sheet_mode_is_one_sheet() {
    let data = TabularFileParser::parse_sheets(SAMPLE.as_bytes(), "data.csv", None, None).unwrap();
    assert_eq!(data.sheet_names, vec!["Sheet1"]);
    assert_eq!(data.sheets[0].len(), 3);
}
