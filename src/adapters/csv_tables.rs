use crate::domain::model::{Artifact, Table, TransformResult};
use crate::domain::ports::Renderer;
use crate::utils::error::{EtlError, Result};
use csv::WriterBuilder;

/// Writes each report table as a plain CSV file.
#[derive(Debug, Clone, Default)]
pub struct CsvRenderer;

impl CsvRenderer {
    pub fn table_to_csv(&self, table: &Table) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());

        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }

        writer.into_inner().map_err(|e| EtlError::ProcessingError {
            message: format!("Failed to finish CSV table '{}': {}", table.title, e),
        })
    }
}

impl Renderer for CsvRenderer {
    fn format(&self) -> &'static str {
        "csv"
    }

    fn render(&self, result: &TransformResult) -> Result<Vec<Artifact>> {
        Ok(vec![
            Artifact {
                file_name: "years.csv".to_string(),
                content: self.table_to_csv(&result.tables.years)?,
            },
            Artifact {
                file_name: "cities.csv".to_string(),
                content: self.table_to_csv(&result.tables.cities)?,
            },
        ])
    }
}
