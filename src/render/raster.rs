//! PNG rasterization of SVG charts via usvg/resvg/tiny-skia.

use std::sync::Arc;

use crate::error::{Error, Result};

/// Rasterize an SVG document to PNG bytes at its intrinsic size.
pub fn svg_to_png(svg: &str, fontdb: Arc<usvg::fontdb::Database>) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb = fontdb;
    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| Error::Render(format!("SVG parsing failed: {e}")))?;

    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        Error::Render(format!(
            "failed to create pixmap ({}x{})",
            size.width(),
            size.height()
        ))
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);

    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| Error::Render(format!("PNG encoding failed: {e}")))
}

/// Load the system font database, once per renderer.
pub fn load_fonts() -> Arc<usvg::fontdb::Database> {
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    if fontdb.is_empty() {
        log::warn!("no system fonts found, chart text may not render");
    }
    Arc::new(fontdb)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_svg_to_png_produces_png_bytes() {
        let svg = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\" height=\"10\">\
                   <rect x=\"0\" y=\"0\" width=\"10\" height=\"10\" fill=\"#ff0000\"/></svg>";
        let png = svg_to_png(svg, load_fonts()).unwrap();
        assert_eq!(&png[0..8], &PNG_MAGIC);
    }

    #[test]
    fn test_malformed_svg_is_an_error() {
        let err = svg_to_png("not svg at all", load_fonts()).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }
}
