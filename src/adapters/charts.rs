//! The four report charts on one 2x2 canvas: salary and vacancy count by
//! year (all vs. profession), salary by city and the share-by-city pie.
//!
//! Charts are drawn to SVG with plotters and rasterized with resvg, so no
//! font is needed to build them.

use crate::adapters::markup::strip_invalid_xml;
use crate::adapters::raster;
use crate::domain::model::{Artifact, Statistics, TransformResult};
use crate::domain::ports::Renderer;
use crate::utils::error::Result;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeMap;
use std::f64::consts::PI;

pub const CHART_WIDTH: u32 = 1280;
pub const CHART_HEIGHT: u32 = 960;
/// Pie slice for every vacancy outside the ranked cities.
pub const OTHERS_LABEL: &str = "Другие";

const BAR_WIDTH: f64 = 0.35;
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

type DrawResult<DB> = std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Chart series, one value per year of the years table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub profession: String,
    pub years: Vec<i32>,
    pub salary: Vec<f64>,
    pub salary_for_profession: Vec<f64>,
    pub count: Vec<f64>,
    pub count_for_profession: Vec<f64>,
    pub city_salaries: Vec<(String, f64)>,
    pub city_shares: Vec<(String, f64)>,
}

impl ChartData {
    pub fn from_statistics(statistics: &Statistics) -> Self {
        let years: Vec<i32> = statistics.salary_by_years.keys().copied().collect();

        Self {
            profession: strip_invalid_xml(&statistics.profession).into_owned(),
            salary: per_year(&years, &statistics.salary_by_years, |v: i64| v as f64),
            salary_for_profession: per_year(
                &years,
                &statistics.salary_by_years_for_profession,
                |v: i64| v as f64,
            ),
            count: per_year(&years, &statistics.vacancies_count_by_years, |v: u64| v as f64),
            count_for_profession: per_year(
                &years,
                &statistics.vacancies_count_by_years_for_profession,
                |v: u64| v as f64,
            ),
            city_salaries: statistics
                .salary_by_cities
                .iter()
                .map(|entry| (strip_invalid_xml(&entry.area_name).into_owned(), entry.value as f64))
                .collect(),
            city_shares: statistics
                .vacancies_share_by_cities
                .iter()
                .map(|entry| (strip_invalid_xml(&entry.area_name).into_owned(), entry.value))
                .collect(),
            years,
        }
    }

    /// Ranked shares preceded by the remainder, `1 - sum(shares)`.
    pub fn pie_slices(&self) -> Vec<(String, f64)> {
        let ranked: f64 = self.city_shares.iter().map(|(_, share)| share).sum();
        std::iter::once((OTHERS_LABEL.to_string(), (1.0 - ranked).max(0.0)))
            .chain(self.city_shares.iter().cloned())
            .collect()
    }
}

fn per_year<V: Copy>(years: &[i32], values: &BTreeMap<i32, V>, to_f64: fn(V) -> f64) -> Vec<f64> {
    years
        .iter()
        .map(|year| values.get(year).copied().map(to_f64).unwrap_or(0.0))
        .collect()
}

pub fn chart_svg(data: &ChartData) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        draw_charts(&root, data).map_err(|e| raster::render_error("chart", e))?;
    }
    Ok(svg)
}

fn draw_charts<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, data: &ChartData) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    let areas = root.split_evenly((2, 2));

    draw_year_bars(
        &areas[0],
        "Уровень зарплат по годам",
        &data.years,
        [
            ("средняя з/п".to_string(), &data.salary),
            (format!("з/п {}", data.profession), &data.salary_for_profession),
        ],
    )?;
    draw_year_bars(
        &areas[1],
        "Количество вакансий по годам",
        &data.years,
        [
            ("Количество вакансий".to_string(), &data.count),
            (
                format!("Количество вакансий {}", data.profession),
                &data.count_for_profession,
            ),
        ],
    )?;
    draw_city_bars(&areas[2], "Уровень зарплат по городам", &data.city_salaries)?;
    draw_share_pie(&areas[3], "Доля вакансий по городам", &data.pie_slices())?;

    root.present()?;
    Ok(())
}

fn headroom(top: f64) -> f64 {
    if top > 0.0 {
        top * 1.1
    } else {
        1.0
    }
}

/// Label of the slot at `position`, empty between slots.
fn slot_label<T: ToString>(labels: &[T], position: f64) -> String {
    let slot = position.round();
    if (position - slot).abs() > 1e-6 || slot < 0.0 {
        return String::new();
    }
    labels
        .get(slot as usize)
        .map(|label| label.to_string())
        .unwrap_or_default()
}

fn draw_year_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    years: &[i32],
    series: [(String, &Vec<f64>); 2],
) -> DrawResult<DB> {
    let slots = years.len().max(1) as f64;
    let top = series
        .iter()
        .flat_map(|(_, values)| values.iter().copied())
        .fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 18).into_font())
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(64)
        .build_cartesian_2d(-0.5..slots - 0.5, 0.0..headroom(top))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(years.len().max(1))
        .x_label_formatter(&|x| slot_label(years, *x))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .draw()?;

    for (k, (label, values)) in series.iter().enumerate() {
        let color = PALETTE[k];
        let offset = if k == 0 { -BAR_WIDTH / 2.0 } else { BAR_WIDTH / 2.0 };
        chart
            .draw_series(values.iter().enumerate().map(move |(i, value)| {
                let center = i as f64 + offset;
                Rectangle::new(
                    [(center - BAR_WIDTH / 2.0, 0.0), (center + BAR_WIDTH / 2.0, *value)],
                    color.filled(),
                )
            }))?
            .label(label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

fn draw_city_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    cities: &[(String, f64)],
) -> DrawResult<DB> {
    let count = cities.len();
    let slots = count.max(1) as f64;
    let top = cities.iter().map(|(_, value)| *value).fold(0.0, f64::max);
    // Slot 0 is the bottom row; the best-paid city goes on top.
    let names: Vec<&str> = cities.iter().rev().map(|(name, _)| name.as_str()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 18).into_font())
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(150)
        .build_cartesian_2d(0.0..headroom(top), -0.5..slots - 0.5)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(count.max(1))
        .y_label_formatter(&|y| slot_label(&names, *y))
        .y_label_style(("sans-serif", 11).into_font())
        .x_label_formatter(&|x| format!("{:.0}", x))
        .draw()?;

    chart.draw_series(cities.iter().enumerate().map(|(i, (_, value))| {
        let row = (count - 1 - i) as f64;
        Rectangle::new([(0.0, row - 0.4), (*value, row + 0.4)], PALETTE[0].filled())
    }))?;
    Ok(())
}

fn arc_point(center: (f64, f64), radius: f64, angle: f64) -> (i32, i32) {
    (
        (center.0 + radius * angle.cos()).round() as i32,
        (center.1 - radius * angle.sin()).round() as i32,
    )
}

/// Wedges run counter-clockwise from three o'clock, in slice order.
fn draw_share_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    slices: &[(String, f64)],
) -> DrawResult<DB> {
    let area = area.titled(title, ("sans-serif", 18).into_font())?;
    let total: f64 = slices.iter().map(|(_, share)| share).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let (width, height) = area.dim_in_pixel();
    let center = (f64::from(width) / 2.0, f64::from(height) / 2.0);
    let radius = f64::from(width.min(height)) * 0.36;
    let label_style =
        TextStyle::from(("sans-serif", 11).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

    let mut angle = 0.0;
    for (i, (label, share)) in slices.iter().enumerate() {
        if *share <= 0.0 {
            continue;
        }
        let sweep = share / total * 2.0 * PI;
        let steps = (sweep / (2.0 * PI) * 120.0).ceil().max(2.0) as usize;

        let mut points = vec![arc_point(center, 0.0, 0.0)];
        points.extend((0..=steps).map(|k| arc_point(center, radius, angle + sweep * k as f64 / steps as f64)));
        area.draw(&Polygon::new(points, PALETTE[i % PALETTE.len()].filled()))?;
        area.draw(&Text::new(
            label.clone(),
            arc_point(center, radius * 1.15, angle + sweep / 2.0),
            label_style.clone(),
        ))?;

        angle += sweep;
    }
    Ok(())
}

/// Renders the charts as `graph.png`.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    file_name: String,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new("graph.png")
    }
}

impl ChartRenderer {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl Renderer for ChartRenderer {
    fn format(&self) -> &'static str {
        "png"
    }

    fn render(&self, result: &TransformResult) -> Result<Vec<Artifact>> {
        let svg = chart_svg(&ChartData::from_statistics(&result.statistics))?;
        Ok(vec![Artifact {
            file_name: self.file_name.clone(),
            content: raster::svg_to_png(&svg)?,
        }])
    }
}
