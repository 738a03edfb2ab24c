use std::io::Read;
use std::path::Path;
use tempfile::TempDir;
use vacancy_stats::core::{ConfigProvider, Pipeline};
use vacancy_stats::{EtlEngine, EtlError, LocalStorage, ReportPipeline, TomlConfig};

const HEADER: &str = "name,salary_from,salary_to,salary_currency,area_name,published_at";

fn write_input(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("vacancies.csv");
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().replace('\\', "/")
}

fn config(input: &str, output: &Path, profession: &str, formats: &str, extra: &str) -> TomlConfig {
    let output = output.to_str().unwrap().replace('\\', "/");
    let content = format!(
        r#"
[pipeline]
name = "integration"

[source]
path = "{}"

[report]
profession = "{}"

[load]
output_path = "{}"
output_formats = {}
{}
"#,
        input, profession, output, formats, extra
    );
    TomlConfig::from_toml_str(&content).unwrap()
}

fn engine(config: TomlConfig) -> EtlEngine<ReportPipeline<LocalStorage, TomlConfig>> {
    let storage = LocalStorage::new(config.output_path().to_string());
    EtlEngine::new(ReportPipeline::new(storage, config))
}

fn sample_input() -> String {
    format!(
        "\u{feff}{}\n\
         Программист,10000,100000,RUR,Сургут,2020-07-05T18:19:30+0300\n\
         Программист Python,80000,100000,RUR,Москва,2021-03-01T10:00:00+0300\n\
         Повар,20000,30000,RUR,Москва,2021-04-01T10:00:00+0300\n\
         Аналитик,,50000,RUR,Казань,2019-01-01T00:00:00+0300\n\
         Водитель,30000,40000,RUR,Москва,2019-06-01T00:00:00+0300\n",
        HEADER
    )
}

#[test]
fn test_end_to_end_report_files() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, &sample_input());
    let output = temp_dir.path().join("out");
    let engine = engine(config(&input, &output, "Программист", r#"["xlsx", "csv", "json"]"#, ""));

    let outcome = engine.run().unwrap();

    assert_eq!(outcome.written.len(), 4);
    assert!(output.join("report.xlsx").exists());
    assert!(output.join("statistics.json").exists());

    let years = std::fs::read_to_string(output.join("years.csv")).unwrap();
    assert_eq!(
        years,
        "Год,Средняя зарплата,Средняя зарплата - Программист,Количество вакансий,Количество вакансий - Программист\n\
         2019,35000,0,1,0\n\
         2020,55000,55000,1,1\n\
         2021,57500,90000,2,1\n"
    );

    let cities = std::fs::read_to_string(output.join("cities.csv")).unwrap();
    assert_eq!(
        cities,
        "Город,Уровень зарплат,,Город,Доля вакансий\n\
         Сургут,55000,,Москва,0.75\n\
         Москва,50000,,Сургут,0.25\n"
    );
}

#[test]
fn test_statistics_for_sample() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, &sample_input());
    let output = temp_dir.path().join("out");
    let engine = engine(config(&input, &output, "Программист", r#"["json"]"#, ""));

    let statistics = engine.run().unwrap().result.statistics;

    // The Казань row has an empty salary_from and is ignored everywhere.
    assert_eq!(statistics.vacancies_total, 4);
    assert!(statistics
        .vacancies_count_by_cities
        .iter()
        .all(|entry| entry.area_name != "Казань"));
    assert_eq!(statistics.vacancies_count_by_years.values().sum::<u64>(), 4);
    assert_eq!(statistics.salary_by_years[&2021], 57_500);
    assert_eq!(statistics.salary_by_years_for_profession[&2021], 90_000);
}

#[test]
fn test_header_only_input_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, &format!("{}\n", HEADER));
    let output = temp_dir.path().join("out");
    let engine = engine(config(&input, &output, "Программист", r#"["xlsx"]"#, ""));

    let err = engine.run().unwrap_err();

    assert!(matches!(err, EtlError::NoData { .. }));
    assert_eq!(err.user_friendly_message(), "Нет данных");
    assert!(!output.exists());
}

#[test]
fn test_empty_input_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "");
    let output = temp_dir.path().join("out");
    let engine = engine(config(&input, &output, "Программист", r#"["xlsx"]"#, ""));

    let err = engine.run().unwrap_err();

    assert!(matches!(err, EtlError::EmptyInput { .. }));
    assert!(!output.exists());
}

#[test]
fn test_unmatched_profession_uses_sentinel_year() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, &sample_input());
    let output = temp_dir.path().join("out");
    let engine = engine(config(&input, &output, "Космонавт", r#"["csv"]"#, ""));

    let statistics = engine.run().unwrap().result.statistics;

    assert_eq!(
        statistics.vacancies_count_by_years_for_profession,
        [(2022, 0)].into_iter().collect()
    );
    assert_eq!(
        statistics.salary_by_years_for_profession,
        [(2022, 0)].into_iter().collect()
    );
    let years = std::fs::read_to_string(output.join("years.csv")).unwrap();
    assert!(years.contains("\n2020,55000,0,1,0\n"));
}

#[test]
fn test_bundle_contains_every_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, &sample_input());
    let output = temp_dir.path().join("out");
    let compression = "\n[load.compression]\nenabled = true\nfilename = \"report_bundle.zip\"\n";
    let engine = engine(config(&input, &output, "Повар", r#"["xlsx", "json"]"#, compression));

    let outcome = engine.run().unwrap();

    assert_eq!(outcome.written.len(), 1);
    assert!(!output.join("report.xlsx").exists());

    let data = std::fs::read(output.join("report_bundle.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["report.xlsx", "statistics.json"]);

    let mut json = String::new();
    archive
        .by_name("statistics.json")
        .unwrap()
        .read_to_string(&mut json)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["profession"], "Повар");
    assert_eq!(value["vacancies_count_by_years_for_profession"]["2021"], 1);
}

#[test]
fn test_pipeline_phases_can_run_separately() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, &sample_input());
    let output = temp_dir.path().join("out");
    let config = config(&input, &output, "Программист", r#"["json"]"#, "");
    let pipeline = ReportPipeline::new(LocalStorage::new(output.to_str().unwrap().to_string()), config);

    let raw = pipeline.extract().unwrap();
    assert_eq!(raw.rows.len(), 4);

    let first = pipeline.transform(raw.clone()).unwrap();
    let second = pipeline.transform(raw).unwrap();
    assert_eq!(first.statistics, second.statistics);
    assert_eq!(first.tables, second.tables);
}

#[test]
fn test_chart_image_and_pdf_report() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, &sample_input());
    let output = temp_dir.path().join("out");
    let engine = engine(config(&input, &output, "Программист", r#"["png", "pdf"]"#, ""));

    let outcome = engine.run().unwrap();

    assert_eq!(outcome.written.len(), 2);
    let png = std::fs::read(output.join("graph.png")).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    // IHDR width and height
    assert_eq!(&png[16..24], &[0, 0, 5, 0, 0, 0, 3, 192]);

    let pdf = std::fs::read(output.join("report.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
}
