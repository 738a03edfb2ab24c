use crate::core::shaper;
use crate::domain::model::{LocationEntry, Statistics, Vacancy, YearCounts, YearSalaries};
use std::collections::{BTreeMap, HashMap};

/// Year reported for a profession with no matching vacancies.
pub const EMPTY_PROFESSION_YEAR: i32 = 2022;

/// Computes the per-year and per-city aggregates over one vacancy set.
///
/// Mean salaries take the matching count aggregate as an argument rather
/// than recounting, so the denominator is always the published count.
pub struct Aggregator<'a> {
    vacancies: &'a [Vacancy],
    profession: &'a str,
}

impl<'a> Aggregator<'a> {
    pub fn new(vacancies: &'a [Vacancy], profession: &'a str) -> Self {
        Self {
            vacancies,
            profession,
        }
    }

    fn matches_profession(&self, vacancy: &Vacancy) -> bool {
        vacancy.name.contains(self.profession)
    }

    pub fn vacancies_count_by_years(&self) -> YearCounts {
        count_by_year(self.vacancies.iter())
    }

    pub fn vacancies_count_by_years_for_profession(&self) -> YearCounts {
        or_empty_profession(count_by_year(
            self.vacancies.iter().filter(|v| self.matches_profession(v)),
        ))
    }

    pub fn salary_by_years(&self, counts: &YearCounts) -> YearSalaries {
        mean_by_year(salary_sum_by_year(self.vacancies.iter()), counts)
    }

    pub fn salary_by_years_for_profession(&self, counts: &YearCounts) -> YearSalaries {
        let sums = salary_sum_by_year(self.vacancies.iter().filter(|v| self.matches_profession(v)));
        or_empty_profession(mean_by_year(sums, counts))
    }

    /// Vacancy counts per city in order of first appearance.
    pub fn vacancies_count_by_cities(&self) -> Vec<LocationEntry<u64>> {
        let mut entries: Vec<LocationEntry<u64>> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for vacancy in self.vacancies {
            match index.get(vacancy.area_name.as_str()) {
                Some(&i) => entries[i].value += 1,
                None => {
                    index.insert(&vacancy.area_name, entries.len());
                    entries.push(LocationEntry::new(vacancy.area_name.clone(), 1));
                }
            }
        }

        entries
    }

    pub fn salary_by_cities(&self, counts: &[LocationEntry<u64>]) -> Vec<LocationEntry<i64>> {
        let total = self.vacancies.len();
        let counts: HashMap<&str, u64> = counts
            .iter()
            .map(|entry| (entry.area_name.as_str(), entry.value))
            .collect();

        let mut sums: Vec<LocationEntry<f64>> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for vacancy in self.vacancies {
            let count = counts.get(vacancy.area_name.as_str()).copied().unwrap_or(0);
            if !shaper::meets_share_threshold(count, total) {
                continue;
            }
            match index.get(vacancy.area_name.as_str()) {
                Some(&i) => sums[i].value += vacancy.salary,
                None => {
                    index.insert(&vacancy.area_name, sums.len());
                    sums.push(LocationEntry::new(vacancy.area_name.clone(), vacancy.salary));
                }
            }
        }

        let means = sums
            .into_iter()
            .filter_map(|entry| {
                let count = *counts.get(entry.area_name.as_str())?;
                Some(LocationEntry::new(entry.area_name, truncated_mean(entry.value, count)))
            })
            .collect();

        shaper::rank_top(means)
    }

    pub fn vacancies_share_by_cities(&self, counts: &[LocationEntry<u64>]) -> Vec<LocationEntry<f64>> {
        let total = self.vacancies.len();
        let shares = counts
            .iter()
            .filter(|entry| shaper::meets_share_threshold(entry.value, total))
            .map(|entry| LocationEntry::new(entry.area_name.clone(), shaper::share_of(entry.value, total)))
            .collect();

        shaper::rank_top(shares)
            .into_iter()
            .map(|entry| LocationEntry::new(entry.area_name, shaper::round_share(entry.value)))
            .collect()
    }

    pub fn compute(&self) -> Statistics {
        let vacancies_count_by_years = self.vacancies_count_by_years();
        let vacancies_count_by_years_for_profession = self.vacancies_count_by_years_for_profession();
        let salary_by_years = self.salary_by_years(&vacancies_count_by_years);
        let salary_by_years_for_profession =
            self.salary_by_years_for_profession(&vacancies_count_by_years_for_profession);
        let vacancies_count_by_cities = self.vacancies_count_by_cities();
        let vacancies_share_by_cities = self.vacancies_share_by_cities(&vacancies_count_by_cities);
        let salary_by_cities = self.salary_by_cities(&vacancies_count_by_cities);

        tracing::debug!(
            years = vacancies_count_by_years.len(),
            cities = vacancies_count_by_cities.len(),
            "Aggregated {} vacancies",
            self.vacancies.len()
        );

        Statistics {
            profession: self.profession.to_string(),
            vacancies_total: self.vacancies.len(),
            vacancies_count_by_years,
            vacancies_count_by_years_for_profession,
            salary_by_years,
            salary_by_years_for_profession,
            vacancies_count_by_cities,
            salary_by_cities,
            vacancies_share_by_cities,
        }
    }
}

fn count_by_year<'v>(vacancies: impl Iterator<Item = &'v Vacancy>) -> YearCounts {
    let mut counts = BTreeMap::new();
    for vacancy in vacancies {
        *counts.entry(vacancy.published_at).or_insert(0) += 1;
    }
    counts
}

fn salary_sum_by_year<'v>(vacancies: impl Iterator<Item = &'v Vacancy>) -> BTreeMap<i32, f64> {
    let mut sums = BTreeMap::new();
    for vacancy in vacancies {
        *sums.entry(vacancy.published_at).or_insert(0.0) += vacancy.salary;
    }
    sums
}

fn mean_by_year(sums: BTreeMap<i32, f64>, counts: &YearCounts) -> YearSalaries {
    sums.into_iter()
        .filter_map(|(year, sum)| match counts.get(&year) {
            Some(&count) if count > 0 => Some((year, truncated_mean(sum, count))),
            _ => {
                tracing::debug!("No count recorded for year {}, leaving it out", year);
                None
            }
        })
        .collect()
}

/// Mean truncated toward zero, not rounded.
fn truncated_mean(sum: f64, count: u64) -> i64 {
    (sum / count as f64) as i64
}

fn or_empty_profession<V: Default>(map: BTreeMap<i32, V>) -> BTreeMap<i32, V> {
    if map.is_empty() {
        BTreeMap::from([(EMPTY_PROFESSION_YEAR, V::default())])
    } else {
        map
    }
}
