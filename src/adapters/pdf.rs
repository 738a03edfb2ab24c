//! `report.pdf`: the profession title, the chart canvas and both report
//! tables on a single page. The page is laid out as SVG from the
//! `report.svg` template, rasterized and embedded as one image.

use crate::adapters::charts::{self, ChartData, CHART_HEIGHT, CHART_WIDTH};
use crate::adapters::markup::strip_invalid_xml;
use crate::adapters::raster;
use crate::domain::model::{format_float, Artifact, Cell, Table, TransformResult};
use crate::domain::ports::Renderer;
use crate::utils::error::Result;
use askama::Template;
use printpdf::{ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px};
use resvg::tiny_skia::Pixmap;

const PAGE_WIDTH: u32 = 1240;
const PAGE_DPI: f32 = 150.0;
const MARGIN: u32 = 60;
const TITLE_Y: u32 = 64;
const CHART_Y: u32 = 100;
const CAPTION_GAP: u32 = 48;
const ROW_HEIGHT: u32 = 30;
const CHAR_WIDTH: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct PageCell {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub text_x: u32,
    pub text_y: u32,
    pub text: String,
    pub header: bool,
    pub framed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageTable {
    pub caption: String,
    pub caption_y: u32,
    pub cells: Vec<PageCell>,
}

impl PageTable {
    fn bottom(&self) -> u32 {
        self.cells
            .iter()
            .map(|cell| cell.y + cell.height)
            .max()
            .unwrap_or(self.caption_y)
    }
}

#[derive(Template)]
#[template(path = "report.svg", escape = "html")]
pub struct ReportPage {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub title: String,
    pub title_x: u32,
    pub title_y: u32,
    pub chart: String,
    pub chart_y: u32,
    pub chart_scale: f64,
    pub tables: Vec<PageTable>,
}

impl ReportPage {
    pub fn new(result: &TransformResult, chart_svg: &str) -> Self {
        let chart_scale = f64::from(PAGE_WIDTH - 2 * MARGIN) / f64::from(CHART_WIDTH);
        let chart_bottom = CHART_Y + (f64::from(CHART_HEIGHT) * chart_scale).ceil() as u32;

        let years = layout_table(&result.tables.years, chart_bottom + CAPTION_GAP);
        let cities = layout_table(&result.tables.cities, years.bottom() + CAPTION_GAP);
        let height = cities.bottom() + MARGIN;

        Self {
            width: PAGE_WIDTH,
            height,
            margin: MARGIN,
            title: format!(
                "Аналитика по зарплатам и городам для профессии {}",
                strip_invalid_xml(&result.statistics.profession)
            ),
            title_x: PAGE_WIDTH / 2,
            title_y: TITLE_Y,
            chart: strip_xml_declaration(chart_svg).to_string(),
            chart_y: CHART_Y,
            chart_scale,
            tables: vec![years, cities],
        }
    }
}

// The chart is nested inside the page, where a second declaration is invalid.
fn strip_xml_declaration(svg: &str) -> &str {
    svg.find("<svg").map(|start| &svg[start..]).unwrap_or(svg)
}

/// Shares print as percentages with a decimal comma, e.g. `12,34%`.
fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Share(share) => percent(*share),
        other => other.to_string(),
    }
}

fn percent(share: f64) -> String {
    let value = share * 100.0;
    let rounded: f64 = format!("{:.2}", value).parse().unwrap_or(value);
    format!("{}%", format_float(rounded).replace('.', ","))
}

/// Caption baseline at `top`, then the header row and one row per table row.
/// Columns are as wide as the workbook columns; spacer columns (empty
/// header) get no frame.
fn layout_table(table: &Table, top: u32) -> PageTable {
    let mut columns = Vec::with_capacity(table.column_widths.len());
    let mut x = MARGIN;
    for width in &table.column_widths {
        let width = *width as u32 * CHAR_WIDTH;
        columns.push((x, width));
        x += width;
    }
    let framed: Vec<bool> = table.headers.iter().map(|header| !header.is_empty()).collect();

    let lines = std::iter::once(table.headers.clone())
        .chain(table.rows.iter().map(|row| row.iter().map(cell_text).collect()));

    let mut cells = Vec::new();
    for (line, texts) in lines.enumerate() {
        let y = top + 12 + line as u32 * ROW_HEIGHT;
        for (column, text) in texts.iter().enumerate() {
            let Some(&(x, width)) = columns.get(column) else {
                continue;
            };
            cells.push(PageCell {
                x,
                y,
                width,
                height: ROW_HEIGHT,
                text_x: x + 6,
                text_y: y + ROW_HEIGHT - 10,
                text: strip_invalid_xml(text).into_owned(),
                header: line == 0,
                framed: framed.get(column).copied().unwrap_or(true),
            });
        }
    }

    PageTable {
        caption: table.title.clone(),
        caption_y: top,
        cells,
    }
}

fn px_to_mm(px: u32) -> Mm {
    Mm(px as f32 * 25.4 / PAGE_DPI)
}

/// One page exactly the size of `pixmap` at [`PAGE_DPI`].
pub fn page_pdf(title: &str, pixmap: &Pixmap) -> Result<Vec<u8>> {
    let (document, page, layer) = PdfDocument::new(
        title,
        px_to_mm(pixmap.width()),
        px_to_mm(pixmap.height()),
        "report",
    );
    let layer = document.get_page(page).get_layer(layer);

    let image = Image::from(ImageXObject {
        width: Px(pixmap.width() as usize),
        height: Px(pixmap.height() as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: raster::rgb_bytes(pixmap),
        image_filter: None,
        smask: None,
        clipping_bbox: None,
    });
    image.add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm(0.0)),
            translate_y: Some(Mm(0.0)),
            dpi: Some(PAGE_DPI),
            ..Default::default()
        },
    );

    document
        .save_to_bytes()
        .map_err(|e| raster::render_error("pdf", e))
}

#[derive(Debug, Clone)]
pub struct PdfRenderer {
    file_name: String,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new("report.pdf")
    }
}

impl PdfRenderer {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl Renderer for PdfRenderer {
    fn format(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, result: &TransformResult) -> Result<Vec<Artifact>> {
        let chart = charts::chart_svg(&ChartData::from_statistics(&result.statistics))?;
        let page = ReportPage::new(result, &chart);
        let svg = page.render().map_err(|e| raster::render_error("pdf", e))?;
        let pixmap = raster::rasterize(&svg, "pdf")?;
        tracing::debug!("Report page is {}x{} px", pixmap.width(), pixmap.height());

        Ok(vec![Artifact {
            file_name: self.file_name.clone(),
            content: page_pdf(&page.title, &pixmap)?,
        }])
    }
}
