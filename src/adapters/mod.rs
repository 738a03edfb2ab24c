// Adapters layer: renderers turning the assembled report into files, plus
// the console summary.

pub mod bundle;
pub mod charts;
pub mod console;
pub mod csv_tables;
pub mod json;
pub mod markup;
pub mod pdf;
pub mod raster;
pub mod xlsx;

use crate::domain::ports::Renderer;

/// Renderers for the requested formats, in request order. Unknown formats
/// are rejected by config validation before this point.
pub fn renderers_for(formats: &[String]) -> Vec<Box<dyn Renderer>> {
    formats
        .iter()
        .filter_map(|format| -> Option<Box<dyn Renderer>> {
            match format.as_str() {
                "xlsx" => Some(Box::new(xlsx::XlsxRenderer::default())),
                "png" => Some(Box::new(charts::ChartRenderer::default())),
                "pdf" => Some(Box::new(pdf::PdfRenderer::default())),
                "csv" => Some(Box::new(csv_tables::CsvRenderer)),
                "json" => Some(Box::new(json::JsonRenderer)),
                other => {
                    tracing::warn!("Ignoring unsupported output format: {}", other);
                    None
                }
            }
        })
        .collect()
}
