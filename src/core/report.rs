use crate::domain::model::{Cell, ReportTables, Statistics, Table};

pub const YEARS_SHEET: &str = "Статистика по годам";
pub const CITIES_SHEET: &str = "Статистика по городам";

/// Lays the aggregates out as the two report tables.
pub struct ReportAssembler<'a> {
    profession: &'a str,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(profession: &'a str) -> Self {
        Self { profession }
    }

    pub fn assemble(&self, statistics: &Statistics) -> ReportTables {
        ReportTables {
            years: self.years_table(statistics),
            cities: self.cities_table(statistics),
        }
    }

    pub fn years_headers(&self) -> Vec<String> {
        vec![
            "Год".to_string(),
            "Средняя зарплата".to_string(),
            format!("Средняя зарплата - {}", self.profession),
            "Количество вакансий".to_string(),
            format!("Количество вакансий - {}", self.profession),
        ]
    }

    pub fn cities_headers(&self) -> Vec<String> {
        ["Город", "Уровень зарплат", "", "Город", "Доля вакансий"]
            .iter()
            .map(|header| header.to_string())
            .collect()
    }

    /// One row per year of the overall salary mapping. Years the profession
    /// never appears in show zero.
    pub fn years_table(&self, statistics: &Statistics) -> Table {
        let rows: Vec<Vec<Cell>> = statistics
            .salary_by_years
            .iter()
            .map(|(year, salary)| {
                let count = statistics
                    .vacancies_count_by_years
                    .get(year)
                    .copied()
                    .unwrap_or(0);
                let profession_salary = statistics
                    .salary_by_years_for_profession
                    .get(year)
                    .copied()
                    .unwrap_or(0);
                let profession_count = statistics
                    .vacancies_count_by_years_for_profession
                    .get(year)
                    .copied()
                    .unwrap_or(0);
                vec![
                    Cell::Integer(i64::from(*year)),
                    Cell::Integer(*salary),
                    Cell::Integer(profession_salary),
                    Cell::Integer(count as i64),
                    Cell::Integer(profession_count as i64),
                ]
            })
            .collect();

        build_table(YEARS_SHEET, self.years_headers(), rows)
    }

    /// Salary ranking and share ranking side by side with a blank spacer
    /// column between them.
    pub fn cities_table(&self, statistics: &Statistics) -> Table {
        let salaries = &statistics.salary_by_cities;
        let shares = &statistics.vacancies_share_by_cities;
        let height = salaries.len().max(shares.len());

        let rows = (0..height)
            .map(|i| {
                let (salary_city, salary) = match salaries.get(i) {
                    Some(entry) => (Cell::Text(entry.area_name.clone()), Cell::Integer(entry.value)),
                    None => (Cell::Blank, Cell::Blank),
                };
                let (share_city, share) = match shares.get(i) {
                    Some(entry) => (Cell::Text(entry.area_name.clone()), Cell::Share(entry.value)),
                    None => (Cell::Blank, Cell::Blank),
                };
                vec![salary_city, salary, Cell::Blank, share_city, share]
            })
            .collect();

        build_table(CITIES_SHEET, self.cities_headers(), rows)
    }
}

fn build_table(title: &str, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Table {
    let column_widths = column_widths(&headers, &rows);
    Table {
        title: title.to_string(),
        headers,
        rows,
        column_widths,
    }
}

/// `max(len(header) + 2, len(cell) + 2)` per column, counting characters.
pub fn column_widths(headers: &[String], rows: &[Vec<Cell>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count() + 2).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.to_string().chars().count() + 2);
        }
    }
    widths
}
