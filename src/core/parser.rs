use crate::core::currency;
use crate::domain::model::{RawTable, Vacancy};
use crate::utils::error::{EtlError, Result};
use csv::ReaderBuilder;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    "name",
    "salary_from",
    "salary_to",
    "salary_currency",
    "area_name",
    "published_at",
];

pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// A data row is usable only if it is as wide as the header and has no
/// empty field.
pub fn is_complete_row(header_len: usize, row: &[String]) -> bool {
    row.len() == header_len && row.iter().all(|field| !field.is_empty())
}

#[derive(Debug, Clone)]
pub struct RecordParser {
    delimiter: u8,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl RecordParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Reads the whole file in one pass, then parses it from memory.
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<RawTable> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
        self.parse_bytes(&path.display().to_string(), &bytes)
    }

    pub fn parse_bytes(&self, source: &str, bytes: &[u8]) -> Result<RawTable> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(strip_bom(bytes));

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        let mut dropped = 0usize;

        for record in reader.records() {
            let row: Vec<String> = record?.iter().map(str::to_string).collect();
            match &headers {
                None => headers = Some(row),
                Some(header) => {
                    if is_complete_row(header.len(), &row) {
                        rows.push(row);
                    } else {
                        dropped += 1;
                    }
                }
            }
        }

        let headers = headers.ok_or_else(|| EtlError::EmptyInput {
            path: source.to_string(),
        })?;
        if rows.is_empty() && dropped == 0 {
            return Err(EtlError::NoData {
                path: source.to_string(),
            });
        }

        if dropped > 0 {
            tracing::info!("Dropped {} incomplete rows from {}", dropped, source);
        }
        tracing::debug!("Parsed {} data rows with {} columns", rows.len(), headers.len());

        Ok(RawTable { headers, rows })
    }
}

/// Positions of the required columns within the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    name: usize,
    salary_from: usize,
    salary_to: usize,
    salary_currency: usize,
    area_name: usize,
    published_at: usize,
}

impl ColumnIndex {
    pub fn from_headers(headers: &[String]) -> Result<Self> {
        let position = |column: &str| {
            headers
                .iter()
                .position(|header| header == column)
                .ok_or_else(|| EtlError::MissingColumn {
                    column: column.to_string(),
                })
        };

        Ok(Self {
            name: position("name")?,
            salary_from: position("salary_from")?,
            salary_to: position("salary_to")?,
            salary_currency: position("salary_currency")?,
            area_name: position("area_name")?,
            published_at: position("published_at")?,
        })
    }

    /// Builds the vacancy for a complete row. Rows whose salary, currency or
    /// year can't be interpreted yield `None`.
    pub fn vacancy(&self, row: &[String]) -> Option<Vacancy> {
        let salary_from: f64 = row.get(self.salary_from)?.trim().parse().ok()?;
        let salary_to: f64 = row.get(self.salary_to)?.trim().parse().ok()?;
        let salary = currency::to_roubles(
            (salary_from + salary_to) / 2.0,
            row.get(self.salary_currency)?,
        )?;

        Some(Vacancy {
            name: row.get(self.name)?.clone(),
            salary,
            area_name: row.get(self.area_name)?.clone(),
            published_at: parse_year(row.get(self.published_at)?)?,
        })
    }
}

/// Year from the leading four characters of an ISO-8601-like timestamp.
pub fn parse_year(timestamp: &str) -> Option<i32> {
    let year: String = timestamp.chars().take(4).collect();
    if year.chars().count() != 4 {
        return None;
    }
    year.parse().ok()
}

impl RawTable {
    pub fn into_vacancies(self) -> Result<Vec<Vacancy>> {
        let columns = ColumnIndex::from_headers(&self.headers)?;
        let total = self.rows.len();

        let vacancies: Vec<Vacancy> = self
            .rows
            .iter()
            .filter_map(|row| columns.vacancy(row))
            .collect();

        if vacancies.len() < total {
            tracing::warn!(
                "Skipped {} rows with unreadable salary, currency or date",
                total - vacancies.len()
            );
        }

        Ok(vacancies)
    }
}
