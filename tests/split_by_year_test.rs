use tempfile::TempDir;
use vacancy_stats::core::partition::YearPartitions;
use vacancy_stats::LocalStorage;

const INPUT: &str = "\u{feff}name,salary_from,salary_to,salary_currency,area_name,published_at\n\
                     Программист,10000,,RUR,Сургут,2020-07-05T18:19:30+0300\n\
                     Повар,20000,30000,RUR,Москва,2021-04-01T10:00:00+0300\n\
                     Водитель,30000,40000,RUR,Москва,2020-06-01T00:00:00+0300\n";

#[test]
fn test_split_writes_one_file_per_year() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("new_files");
    let storage = LocalStorage::new(output.to_str().unwrap().to_string());

    let partitions = YearPartitions::from_bytes(INPUT.as_bytes(), b',').unwrap();
    let written = partitions.write_all(&storage).unwrap();

    assert_eq!(written.len(), 2);
    assert!(output.join("new_file_2020.csv").exists());
    assert!(output.join("new_file_2021.csv").exists());

    let content = std::fs::read(output.join("new_file_2020.csv")).unwrap();
    assert!(content.starts_with(b"\xEF\xBB\xBF"));

    // Incomplete rows are kept as-is, the split does no filtering.
    let text = String::from_utf8(content[3..].to_vec()).unwrap();
    assert_eq!(
        text,
        "name,salary_from,salary_to,salary_currency,area_name,published_at\r\n\
         Программист,10000,,RUR,Сургут,2020-07-05T18:19:30+0300\r\n\
         Водитель,30000,40000,RUR,Москва,2020-06-01T00:00:00+0300\r\n"
    );
}

#[test]
fn test_header_only_input_has_no_partitions() {
    let header = "name,salary_from,salary_to,salary_currency,area_name,published_at\n";
    let partitions = YearPartitions::from_bytes(header.as_bytes(), b',').unwrap();

    assert!(partitions.years.is_empty());
    assert_eq!(partitions.headers.len(), 6);
}
