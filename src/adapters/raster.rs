//! SVG to pixels, for the PNG chart and the PDF page.

use crate::utils::error::{EtlError, Result};
use resvg::{tiny_skia, usvg};
use std::fmt::Display;
use std::sync::{Arc, OnceLock};

// Text without an installed font is skipped, not an error.
fn system_fonts() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut fonts = usvg::fontdb::Database::new();
            fonts.load_system_fonts();
            tracing::debug!("Loaded {} system font faces", fonts.len());
            Arc::new(fonts)
        })
        .clone()
}

pub fn render_error(format: &str, error: impl Display) -> EtlError {
    EtlError::RenderError {
        format: format.to_string(),
        message: error.to_string(),
    }
}

pub fn rasterize(svg: &str, format: &str) -> Result<tiny_skia::Pixmap> {
    let mut options = usvg::Options::default();
    options.fontdb = system_fonts();

    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| render_error(format, e))?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        render_error(
            format,
            format!("invalid canvas size {}x{}", size.width(), size.height()),
        )
    })?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    Ok(pixmap)
}

pub fn svg_to_png(svg: &str) -> Result<Vec<u8>> {
    rasterize(svg, "png")?
        .encode_png()
        .map_err(|e| render_error("png", e))
}

/// Packed 8-bit RGB. Pages are drawn on an opaque background, so dropping
/// the (premultiplied) alpha channel keeps the colours.
pub fn rgb_bytes(pixmap: &tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|pixel| [pixel[0], pixel[1], pixel[2]])
        .collect()
}
