use crate::adapters::{self, bundle};
use crate::core::aggregator::Aggregator;
use crate::core::parser::RecordParser;
use crate::core::report::ReportAssembler;
use crate::core::{ConfigProvider, Pipeline, RawTable, Storage, TransformResult};
use crate::utils::error::Result;

/// Reads the vacancies export, aggregates it and writes the report files.
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    fn extract(&self) -> Result<RawTable> {
        tracing::debug!("Reading vacancies from: {}", self.config.input_path());
        RecordParser::new(self.config.delimiter()).read_file(self.config.input_path())
    }

    fn transform(&self, data: RawTable) -> Result<TransformResult> {
        let vacancies = data.into_vacancies()?;
        let profession = self.config.profession();

        let statistics = Aggregator::new(&vacancies, profession).compute();
        let tables = ReportAssembler::new(profession).assemble(&statistics);

        Ok(TransformResult { statistics, tables })
    }

    fn load(&self, result: &TransformResult) -> Result<Vec<String>> {
        let mut artifacts = Vec::new();
        for renderer in adapters::renderers_for(self.config.output_formats()) {
            let rendered = renderer.render(result)?;
            tracing::debug!("Rendered {} file(s) as {}", rendered.len(), renderer.format());
            artifacts.extend(rendered);
        }

        if let Some(bundle_name) = self.config.bundle_name() {
            tracing::debug!("Bundling {} files into {}", artifacts.len(), bundle_name);
            let zip_data = bundle::bundle(&artifacts)?;
            let path = self.storage.write_file(bundle_name, &zip_data)?;
            return Ok(vec![path]);
        }

        artifacts
            .iter()
            .map(|artifact| self.storage.write_file(&artifact.file_name, &artifact.content))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockStorage {
        files: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl Storage for MockStorage {
        fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
            self.files.borrow_mut().insert(path.to_string(), data.to_vec());
            Ok(format!("mock/{}", path))
        }
    }

    struct MockConfig {
        input_path: String,
        profession: String,
        output_formats: Vec<String>,
        bundle_name: Option<String>,
    }

    impl MockConfig {
        fn new(formats: &[&str]) -> Self {
            Self {
                input_path: "unused.csv".to_string(),
                profession: "Программист".to_string(),
                output_formats: formats.iter().map(|f| f.to_string()).collect(),
                bundle_name: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            &self.input_path
        }

        fn profession(&self) -> &str {
            &self.profession
        }

        fn delimiter(&self) -> u8 {
            b','
        }

        fn output_path(&self) -> &str {
            "mock"
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn bundle_name(&self) -> Option<&str> {
            self.bundle_name.as_deref()
        }
    }

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn raw_table() -> RawTable {
        RawTable {
            headers: row(&[
                "name",
                "salary_from",
                "salary_to",
                "salary_currency",
                "area_name",
                "published_at",
            ]),
            rows: vec![
                row(&["Программист", "10000", "100000", "RUR", "Сургут", "2020-07-05T18:19:30+0300"]),
                row(&["Повар", "100", "200", "EUR", "Москва", "2021-07-05T18:19:30+0300"]),
            ],
        }
    }

    #[test]
    fn test_transform_builds_statistics_and_tables() {
        let pipeline = ReportPipeline::new(MockStorage::default(), MockConfig::new(&["json"]));
        let result = pipeline.transform(raw_table()).unwrap();

        assert_eq!(result.statistics.vacancies_total, 2);
        assert_eq!(result.statistics.salary_by_years[&2020], 55_000);
        assert_eq!(result.statistics.salary_by_years_for_profession.len(), 1);
        assert_eq!(result.tables.years.rows.len(), 2);
        assert_eq!(result.tables.cities.rows.len(), 2);
    }

    #[test]
    fn test_load_writes_each_artifact() {
        let storage = MockStorage::default();
        let pipeline = ReportPipeline::new(storage, MockConfig::new(&["xlsx", "csv", "json"]));
        let result = pipeline.transform(raw_table()).unwrap();

        let written = pipeline.load(&result).unwrap();

        assert_eq!(
            written,
            vec![
                "mock/report.xlsx",
                "mock/years.csv",
                "mock/cities.csv",
                "mock/statistics.json"
            ]
        );
        assert_eq!(pipeline.storage.files.borrow().len(), 4);
    }

    #[test]
    fn test_load_bundles_when_configured() {
        let mut config = MockConfig::new(&["csv", "json"]);
        config.bundle_name = Some("report_bundle.zip".to_string());
        let pipeline = ReportPipeline::new(MockStorage::default(), config);
        let result = pipeline.transform(raw_table()).unwrap();

        let written = pipeline.load(&result).unwrap();

        assert_eq!(written, vec!["mock/report_bundle.zip"]);
        let files = pipeline.storage.files.borrow();
        let bundle = files.get("report_bundle.zip").unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(bundle.clone())).unwrap();
        assert_eq!(archive.len(), 3);
    }
}
