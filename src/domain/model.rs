use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One valid row of the vacancies export, with salary already converted
/// to roubles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacancy {
    pub name: String,
    pub salary: f64,
    pub area_name: String,
    pub published_at: i32,
}

/// Header labels plus the data rows that passed structural validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub type YearCounts = BTreeMap<i32, u64>;
pub type YearSalaries = BTreeMap<i32, i64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry<V> {
    pub area_name: String,
    pub value: V,
}

impl<V> LocationEntry<V> {
    pub fn new(area_name: impl Into<String>, value: V) -> Self {
        Self {
            area_name: area_name.into(),
            value,
        }
    }
}

/// The seven aggregates of one run. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub profession: String,
    pub vacancies_total: usize,
    pub vacancies_count_by_years: YearCounts,
    pub vacancies_count_by_years_for_profession: YearCounts,
    pub salary_by_years: YearSalaries,
    pub salary_by_years_for_profession: YearSalaries,
    pub vacancies_count_by_cities: Vec<LocationEntry<u64>>,
    pub salary_by_cities: Vec<LocationEntry<i64>>,
    pub vacancies_share_by_cities: Vec<LocationEntry<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Share(f64),
    Blank,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Integer(value) => write!(f, "{}", value),
            Cell::Share(value) => f.write_str(&format_float(*value)),
            Cell::Blank => Ok(()),
        }
    }
}

/// Shortest round-trip form, always with a fractional part (`1.0`, `0.0123`).
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub column_widths: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTables {
    pub years: Table,
    pub cities: Table,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub statistics: Statistics,
    pub tables: ReportTables,
}

/// A rendered output file, not yet written anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct EtlOutcome {
    pub result: TransformResult,
    pub written: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_display_matches_report_text() {
        assert_eq!(Cell::Text("Москва".to_string()).to_string(), "Москва");
        assert_eq!(Cell::Integer(55000).to_string(), "55000");
        assert_eq!(Cell::Share(0.0123).to_string(), "0.0123");
        assert_eq!(Cell::Share(1.0).to_string(), "1.0");
        assert_eq!(Cell::Blank.to_string(), "");
    }
}
