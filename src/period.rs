//! Period Selection
//! The reporting period (month, quarter or semester of a year) that scopes period-aware views.

use crate::error::PeriodError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

const MONTH_NAMES: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho", "Julho", "Agosto", "Setembro",
    "Outubro", "Novembro", "Dezembro",
];
const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];
/// Month column names of the supplier × buyer sheet.
pub const MONTH_COLUMNS: [&str; 12] = [
    "JAN", "FEV", "MAR", "ABR", "MAI", "JUN", "JUL", "AGO", "SET", "OUT", "NOV", "DEZ",
];

pub const DEFAULT_YEAR: i32 = 2026;
const FIRST_AVAILABLE_YEAR: i32 = 2023;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Month,
    Quarter,
    Semester,
}

impl PeriodType {
    /// Number of calendar months one period covers.
    pub fn span(self) -> u32 {
        match self {
            PeriodType::Month => 1,
            PeriodType::Quarter => 3,
            PeriodType::Semester => 6,
        }
    }

    /// Largest valid sub-selector value.
    pub fn max_index(self) -> u32 {
        12 / self.span()
    }

    fn name(self) -> &'static str {
        match self {
            PeriodType::Month => "month",
            PeriodType::Quarter => "quarter",
            PeriodType::Semester => "semester",
        }
    }
}

#[derive(Deserialize)]
struct RawPeriod {
    #[serde(rename = "type")]
    kind: PeriodType,
    year: i32,
    index: u32,
}

/// Selected period: a type, a year and a 1-based index within the year.
///
/// Changing the type resets the index to 1 and keeps the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct PeriodSelection {
    #[serde(rename = "type")]
    kind: PeriodType,
    year: i32,
    index: u32,
}

impl TryFrom<RawPeriod> for PeriodSelection {
    type Error = PeriodError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Self::new(raw.kind, raw.year, raw.index)
    }
}

impl Default for PeriodSelection {
    fn default() -> Self {
        Self {
            kind: PeriodType::Month,
            year: DEFAULT_YEAR,
            index: 1,
        }
    }
}

impl PeriodSelection {
    pub fn new(kind: PeriodType, year: i32, index: u32) -> Result<Self, PeriodError> {
        check_index(kind, index)?;
        Ok(Self { kind, year, index })
    }

    pub fn month(year: i32, month: u32) -> Result<Self, PeriodError> {
        Self::new(PeriodType::Month, year, month)
    }

    pub fn quarter(year: i32, quarter: u32) -> Result<Self, PeriodError> {
        Self::new(PeriodType::Quarter, year, quarter)
    }

    pub fn semester(year: i32, semester: u32) -> Result<Self, PeriodError> {
        Self::new(PeriodType::Semester, year, semester)
    }

    pub fn kind(&self) -> PeriodType {
        self.kind
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Switch the period type. A different type restarts at index 1.
    pub fn with_kind(self, kind: PeriodType) -> Self {
        if kind == self.kind {
            return self;
        }
        Self {
            kind,
            year: self.year,
            index: 1,
        }
    }

    pub fn with_index(self, index: u32) -> Result<Self, PeriodError> {
        Self::new(self.kind, self.year, index)
    }

    pub fn with_year(self, year: i32) -> Self {
        Self { year, ..self }
    }

    /// Human-readable label: `Janeiro/2026`, `Q1/2026`, `S2/2026`.
    pub fn label(&self) -> String {
        match self.kind {
            PeriodType::Month => {
                format!("{}/{}", MONTH_NAMES[self.index as usize - 1], self.year)
            }
            PeriodType::Quarter => format!("Q{}/{}", self.index, self.year),
            PeriodType::Semester => format!("S{}/{}", self.index, self.year),
        }
    }

    /// Calendar months (1-12) covered by the period.
    pub fn months(&self) -> RangeInclusive<u32> {
        let span = self.kind.span();
        let start = (self.index - 1) * span + 1;
        start..=start + span - 1
    }

    pub fn contains_month(&self, month: u32) -> bool {
        self.months().contains(&month)
    }

    /// Month column names covered by the period, e.g. `["JAN", "FEV", "MAR"]` for Q1.
    pub fn month_columns(&self) -> Vec<&'static str> {
        self.months().filter_map(month_column).collect()
    }

    /// Month keys covered by the period, e.g. `jan/26`.
    pub fn month_keys(&self) -> Vec<String> {
        self.months()
            .filter_map(|m| month_key(m, self.year))
            .collect()
    }
}

impl fmt::Display for PeriodSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn check_index(kind: PeriodType, index: u32) -> Result<(), PeriodError> {
    let max = kind.max_index();
    if (1..=max).contains(&index) {
        Ok(())
    } else {
        Err(PeriodError::IndexOutOfRange {
            kind: kind.name(),
            index,
            max,
        })
    }
}

/// Short month key with a two-digit year: `jan/26`.
pub fn month_key(month: u32, year: i32) -> Option<String> {
    let name = MONTH_ABBREVIATIONS.get(month.checked_sub(1)? as usize)?;
    Some(format!("{}/{:02}", name, year.rem_euclid(100)))
}

/// Column name for a calendar month: `JAN` … `DEZ`.
pub fn month_column(month: u32) -> Option<&'static str> {
    MONTH_COLUMNS.get(month.checked_sub(1)? as usize).copied()
}

/// Years offered by the period picker, oldest first.
pub fn available_years() -> Vec<i32> {
    (FIRST_AVAILABLE_YEAR..=DEFAULT_YEAR).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_is_january_2026() {
        let period = PeriodSelection::default();
        assert_eq!(period.label(), "Janeiro/2026");
        assert_eq!(period.months(), 1..=1);
    }

    #[test]
    fn labels() {
        assert_eq!(PeriodSelection::quarter(2026, 1).unwrap().label(), "Q1/2026");
        assert_eq!(PeriodSelection::semester(2025, 2).unwrap().to_string(), "S2/2025");
        assert_eq!(PeriodSelection::month(2024, 12).unwrap().label(), "Dezembro/2024");
    }

    #[test]
    fn months_are_contiguous_from_index() {
        let q3 = PeriodSelection::quarter(2026, 3).unwrap();
        assert_eq!(q3.months().collect::<Vec<_>>(), vec![7, 8, 9]);
        assert_eq!(q3.month_columns(), vec!["JUL", "AGO", "SET"]);
        assert!(q3.contains_month(8));
        assert!(!q3.contains_month(10));

        let s2 = PeriodSelection::semester(2026, 2).unwrap();
        assert_eq!(s2.months().count(), 6);
        assert_eq!(s2.month_keys().first().map(String::as_str), Some("jul/26"));
    }

    #[test]
    fn changing_type_resets_index_and_keeps_year() {
        let period = PeriodSelection::month(2025, 7).unwrap();
        let quarter = period.with_kind(PeriodType::Quarter);
        assert_eq!(quarter.kind(), PeriodType::Quarter);
        assert_eq!(quarter.index(), 1);
        assert_eq!(quarter.year(), 2025);
        assert_eq!(period.with_kind(PeriodType::Month), period);
    }

    #[test]
    fn changing_index_or_year_keeps_type() {
        let period = PeriodSelection::semester(2026, 1).unwrap();
        let next = period.with_index(2).unwrap().with_year(2024);
        assert_eq!(next.kind(), PeriodType::Semester);
        assert_eq!(next.label(), "S2/2024");
        assert!(period.with_index(3).is_err());
    }

    #[test]
    fn rejects_out_of_range_indices() {
        assert!(PeriodSelection::month(2026, 0).is_err());
        assert!(PeriodSelection::month(2026, 13).is_err());
        assert!(PeriodSelection::quarter(2026, 5).is_err());
    }

    #[test]
    fn month_helpers() {
        assert_eq!(month_key(1, 2026).as_deref(), Some("jan/26"));
        assert_eq!(month_key(12, 2005).as_deref(), Some("dez/05"));
        assert_eq!(month_key(0, 2026), None);
        assert_eq!(month_column(13), None);
        assert_eq!(available_years(), vec![2023, 2024, 2025, 2026]);
    }

    #[test]
    fn serde_validates_index() {
        let json = serde_json::to_string(&PeriodSelection::quarter(2026, 2).unwrap()).unwrap();
        assert_eq!(json, r#"{"type":"quarter","year":2026,"index":2}"#);
        let back: PeriodSelection = serde_json::from_str(&json).unwrap();
        assert_eq!(back.label(), "Q2/2026");
        assert!(serde_json::from_str::<PeriodSelection>(r#"{"type":"month","year":2026,"index":0}"#).is_err());
    }
}
