//! Cell Value Module
//! Raw cell values and the loose number coercion used everywhere a cell feeds a metric.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A single raw cell as it came out of a file or a JSON payload.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Null and the empty string count as "no value".
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Values a dashboard would replace with a fallback label or zero:
    /// null, empty text, zero, NaN and `false`.
    pub fn is_falsy(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Bool(b) => !b,
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Text(s) => s.is_empty(),
        }
    }

    /// Coerce to a number. `None` means the value is not numeric.
    ///
    /// Null is treated as "not a value" rather than zero; callers that
    /// want zero use [`CellValue::as_number_or_zero`].
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Number(n) if n.is_nan() => None,
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number(s),
        }
    }

    /// Numeric value with anything non-numeric or missing read as 0.
    pub fn as_number_or_zero(&self) -> f64 {
        self.coerce_number().unwrap_or(0.0)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// String used for grouping keys and free-text search. Null renders as "".
    pub fn to_key(&self) -> String {
        self.to_string()
    }

    /// `self` as a grouping key, or `fallback` when the value is falsy.
    pub fn key_or(&self, fallback: &str) -> String {
        if self.is_falsy() {
            fallback.to_string()
        } else {
            self.to_key()
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// Integral numbers serialize without a fractional part (`10`, not `10.0`).
impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_none(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// Render a number the way a browser would print it in a table cell.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Parse text into a number with browser `Number(text)` rules.
///
/// Surrounding whitespace is ignored, blank text is 0, `Infinity` and
/// `0x`/`0o`/`0b` literals are accepted. Words such as `nan` or `inf`
/// are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [
        ("0x", 16),
        ("0X", 16),
        ("0o", 8),
        ("0O", 8),
        ("0b", 2),
        ("0B", 2),
    ] {
        if let Some(digits) = s.strip_prefix(prefix) {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|v| v as f64);
        }
    }

    let (sign, body) = match s.as_bytes()[0] {
        b'-' => (-1.0, &s[1..]),
        b'+' => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    if body == "Infinity" {
        return Some(sign * f64::INFINITY);
    }

    let allowed = |b: u8| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-');
    if !body.bytes().all(allowed) {
        return None;
    }
    s.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_loose_numbers() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("  -3.5 "), Some(-3.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("0x10"), Some(16.0));
        assert_eq!(parse_number("   "), Some(0.0));
        assert_eq!(parse_number("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn rejects_words_and_mixed_text() {
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("1,5"), None);
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("+0x10"), None);
    }

    #[test]
    fn null_is_empty_but_not_numeric() {
        assert!(CellValue::Null.is_empty());
        assert!(CellValue::Text(String::new()).is_empty());
        assert!(!CellValue::Text(" ".into()).is_empty());
        assert_eq!(CellValue::Null.coerce_number(), None);
        assert_eq!(CellValue::Null.as_number_or_zero(), 0.0);
        assert_eq!(CellValue::Text("x".into()).as_number_or_zero(), 0.0);
        assert_eq!(CellValue::Bool(true).coerce_number(), Some(1.0));
    }

    #[test]
    fn display_matches_table_rendering() {
        assert_eq!(CellValue::Number(10.0).to_string(), "10");
        assert_eq!(CellValue::Number(1.5).to_string(), "1.5");
        assert_eq!(CellValue::Number(-0.0).to_string(), "0");
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Bool(false).to_string(), "false");
    }

    #[test]
    fn falsy_values_fall_back() {
        assert_eq!(CellValue::Null.key_or("Desconhecido"), "Desconhecido");
        assert_eq!(CellValue::Number(0.0).key_or("N/A"), "N/A");
        assert_eq!(CellValue::from("ACME").key_or("N/A"), "ACME");
    }

    #[test]
    fn json_round_trip_is_untagged() {
        let values: Vec<CellValue> = serde_json::from_str(r#"[null, true, 3.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                CellValue::Null,
                CellValue::Bool(true),
                CellValue::Number(3.5),
                CellValue::Text("x".into())
            ]
        );
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"[null,true,3.5,"x"]"#);
        assert_eq!(serde_json::to_string(&CellValue::Number(10.0)).unwrap(), "10");
    }
}
