//! Chart rendering and fallback tables.
//!
//! Rendering sits behind the [`ChartRenderer`] capability trait so the
//! rest of the pipeline can be tested without a graphics backend. The
//! built-in renderers draw the chart as SVG; the `raster` feature adds
//! PNG output on top of it.
//!
//! Failures stop at the render boundary: a chart that cannot be drawn
//! degrades to "no image" while the fallback table is still produced,
//! so one bad block never aborts the batch.

#[cfg(feature = "raster")]
mod raster;
mod series;
mod svg;
mod table;

pub use series::{build_spec, ChartKind, ChartSpec, Series};
pub use table::fallback_table;

use crate::classify::{self, ChartType};
use crate::error::Result;
use crate::model::{DataBlock, SourceSpan};
use crate::report::Reporter;

/// Renders a chart spec to encoded image bytes.
///
/// Each call owns its drawing surface; nothing is shared across calls.
pub trait ChartRenderer {
    /// Human-readable name of this renderer.
    fn name(&self) -> &'static str;

    /// MIME type of the produced bytes.
    fn mime_type(&self) -> &'static str;

    /// Render a chart.
    fn render(&self, spec: &ChartSpec) -> Result<Vec<u8>>;
}

/// Built-in renderer producing standalone SVG documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRenderer;

impl ChartRenderer for SvgRenderer {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn mime_type(&self) -> &'static str {
        "image/svg+xml"
    }

    fn render(&self, spec: &ChartSpec) -> Result<Vec<u8>> {
        svg::chart_svg(spec).map(String::into_bytes)
    }
}

/// Renderer that rasterizes the SVG chart to PNG.
#[cfg(feature = "raster")]
pub struct PngRenderer {
    fontdb: std::sync::Arc<usvg::fontdb::Database>,
}

#[cfg(feature = "raster")]
impl PngRenderer {
    /// Create a renderer with the system font database loaded.
    pub fn new() -> Self {
        Self {
            fontdb: raster::load_fonts(),
        }
    }
}

#[cfg(feature = "raster")]
impl Default for PngRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "raster")]
impl ChartRenderer for PngRenderer {
    fn name(&self) -> &'static str {
        "png"
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }

    fn render(&self, spec: &ChartSpec) -> Result<Vec<u8>> {
        let svg = svg::chart_svg(spec)?;
        raster::svg_to_png(&svg, self.fontdb.clone())
    }
}

/// An encoded chart image.
#[derive(Debug, Clone)]
pub struct ChartImage {
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// MIME type of `data`
    pub mime_type: &'static str,
}

/// The rendered outputs for one block.
#[derive(Debug, Clone)]
pub struct RenderedBlock {
    /// The chart recommendation the block received
    pub chart_type: ChartType,

    /// The chart image; `None` for table-only blocks and on render
    /// failure
    pub image: Option<ChartImage>,

    /// The fallback table, always present
    pub table_html: String,

    /// The source span to substitute
    pub span: SourceSpan,
}

/// Classify a block, render its chart, and build its fallback table.
pub fn render_block(
    block: &DataBlock,
    renderer: &dyn ChartRenderer,
    reporter: &dyn Reporter,
) -> RenderedBlock {
    let chart_type = classify::classify(block);
    let image = render_chart(block, chart_type, renderer, reporter);
    RenderedBlock {
        chart_type,
        image,
        table_html: table::fallback_table(block),
        span: block.span.clone(),
    }
}

fn render_chart(
    block: &DataBlock,
    chart_type: ChartType,
    renderer: &dyn ChartRenderer,
    reporter: &dyn Reporter,
) -> Option<ChartImage> {
    let spec = match series::build_spec(block, chart_type) {
        Ok(Some(spec)) => spec,
        Ok(None) => return None,
        Err(e) => {
            reporter.render_failed(&block_context(block), &e);
            return None;
        }
    };
    match renderer.render(&spec) {
        Ok(data) => Some(ChartImage {
            data,
            mime_type: renderer.mime_type(),
        }),
        Err(e) => {
            reporter.render_failed(&block_context(block), &e);
            None
        }
    }
}

fn block_context(block: &DataBlock) -> String {
    format!(
        "{} block at {}..{}",
        block.kind(),
        block.span.start,
        block.span.end
    )
}
