//! Console summary printed after a successful run.

use crate::domain::model::{format_float, LocationEntry, Statistics};
use std::collections::BTreeMap;
use std::fmt::Display;

fn year_map<V: Display>(map: &BTreeMap<i32, V>) -> String {
    let items: Vec<String> = map
        .iter()
        .map(|(year, value)| format!("{}: {}", year, value))
        .collect();
    format!("{{{}}}", items.join(", "))
}

fn location_map<V>(entries: &[LocationEntry<V>], value: impl Fn(&V) -> String) -> String {
    let items: Vec<String> = entries
        .iter()
        .map(|entry| format!("{}: {}", quote(&entry.area_name), value(&entry.value)))
        .collect();
    format!("{{{}}}", items.join(", "))
}

/// Single-quoted literal, switching to double quotes when the text holds a
/// single quote and no double quote.
pub fn quote(text: &str) -> String {
    if text.contains('\'') && !text.contains('"') {
        return format!("\"{}\"", text.replace('\\', "\\\\"));
    }
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

pub fn summary_lines(statistics: &Statistics) -> Vec<String> {
    vec![
        format!(
            "Динамика уровня зарплат по годам: {}",
            year_map(&statistics.salary_by_years)
        ),
        format!(
            "Динамика количества вакансий по годам: {}",
            year_map(&statistics.vacancies_count_by_years)
        ),
        format!(
            "Динамика уровня зарплат по годам для выбранной профессии: {}",
            year_map(&statistics.salary_by_years_for_profession)
        ),
        format!(
            "Динамика количества вакансий по годам для выбранной профессии: {}",
            year_map(&statistics.vacancies_count_by_years_for_profession)
        ),
        format!(
            "Уровень зарплат по городам (в порядке убывания): {}",
            location_map(&statistics.salary_by_cities, |v| v.to_string())
        ),
        format!(
            "Доля вакансий по городам (в порядке убывания): {}",
            location_map(&statistics.vacancies_share_by_cities, |v| format_float(*v))
        ),
    ]
}
