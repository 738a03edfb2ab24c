use crate::core::parser::strip_bom;
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::collections::BTreeMap;

/// Raw rows of the input split by the year prefix of their last field.
#[derive(Debug, Clone, Default)]
pub struct YearPartitions {
    pub headers: StringRecord,
    pub years: BTreeMap<String, Vec<StringRecord>>,
}

impl YearPartitions {
    /// Rows are copied as-is: no completeness check, no type conversion.
    pub fn from_bytes(bytes: &[u8], delimiter: u8) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(strip_bom(bytes));

        let mut records = reader.records();
        let headers = match records.next() {
            Some(record) => record?,
            None => return Ok(Self::default()),
        };

        let mut years: BTreeMap<String, Vec<StringRecord>> = BTreeMap::new();
        for record in records {
            let record = record?;
            let year: String = record
                .iter()
                .last()
                .unwrap_or_default()
                .chars()
                .take(4)
                .collect();
            years.entry(year).or_default().push(record);
        }

        Ok(Self { headers, years })
    }

    pub fn file_name(year: &str) -> String {
        format!("new_file_{}.csv", year)
    }

    /// Renders one year as BOM-prefixed CSV with `|` as the quote character.
    pub fn render_year(&self, year: &str) -> Result<Vec<u8>> {
        let rows = self.years.get(year).ok_or_else(|| EtlError::ProcessingError {
            message: format!("No rows for year {}", year),
        })?;

        let mut buffer = b"\xEF\xBB\xBF".to_vec();
        {
            let mut writer = WriterBuilder::new()
                .quote(b'|')
                .quote_style(QuoteStyle::Necessary)
                .terminator(Terminator::CRLF)
                .flexible(true)
                .from_writer(&mut buffer);
            writer.write_record(&self.headers)?;
            for row in rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        Ok(buffer)
    }

    pub fn write_all<S: Storage>(&self, storage: &S) -> Result<Vec<String>> {
        let mut written = Vec::with_capacity(self.years.len());
        for year in self.years.keys() {
            let content = self.render_year(year)?;
            let path = storage.write_file(&Self::file_name(year), &content)?;
            tracing::debug!("Wrote {} rows for {} to {}", self.years[year].len(), year, path);
            written.push(path);
        }
        Ok(written)
    }
}
