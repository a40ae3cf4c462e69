//! # mdchart
//!
//! Automatic chart inference and rendering for numeric data blocks in
//! Markdown.
//!
//! This library scans raw Markdown text for candidate data blocks
//! (pipe tables, numeric bullet lists, numeric fenced code), classifies
//! each block into a recommended chart shape, and renders both a chart
//! image and an HTML fallback table. Everything is synchronous, pure,
//! and batch-oriented: one buffer in, one sequence of rendered blocks
//! out, nothing cached across calls.
//!
//! ## Quick Start
//!
//! ```
//! use mdchart::{classify, extract, ChartType};
//!
//! let text = "\
//! | 年份 | 收入 |
//! | --- | --- |
//! | 2021 | 100 |
//! | 2022 | 150 |
//! ";
//!
//! let extraction = extract(text);
//! assert_eq!(extraction.blocks.len(), 1);
//! assert_eq!(classify(&extraction.blocks[0]), ChartType::Line);
//! ```
//!
//! ## Buffer Conversion
//!
//! ```
//! use mdchart::{convert, ConvertOptions, ImageFormat};
//!
//! let options = ConvertOptions::new().with_image_format(ImageFormat::Svg);
//! let converted = convert("- alpha 10\n- beta 20\n", &options);
//! assert!(converted.output.contains("data:image/svg+xml;base64,"));
//! ```
//!
//! ## Features
//!
//! - `raster` (default): PNG output via SVG rasterization

pub mod classify;
pub mod convert;
pub mod error;
pub mod extract;
pub mod model;
pub mod render;
pub mod report;

// Re-exports
pub use classify::{classify, ChartType};
pub use convert::{convert, convert_with_reporter, ConvertOptions, Converted, ImageFormat};
pub use error::{Error, Result};
pub use extract::{extract, extract_with_reporter, Extraction};
#[cfg(feature = "raster")]
pub use render::PngRenderer;
pub use render::{
    render_block, ChartImage, ChartKind, ChartRenderer, ChartSpec, RenderedBlock, Series,
    SvgRenderer,
};
pub use model::{BlockKind, BlockPayload, DataBlock, SourceSpan, TableData};
pub use report::{LogReporter, NullReporter, Reporter};

/// Scan a buffer and render every detected block.
///
/// Returns one entry per block in extraction order, each carrying the
/// source span to substitute and the rendered outputs. The caller owns
/// substitution; [`convert`] does it in place instead.
///
/// # Example
///
/// ```
/// use mdchart::{process, NullReporter, SvgRenderer};
///
/// let text = "- alpha 10\n- beta 20\n";
/// let rendered = process(text, &SvgRenderer, &NullReporter);
/// assert_eq!(rendered.len(), 1);
/// assert!(rendered[0].image.is_some());
/// ```
pub fn process(
    text: &str,
    renderer: &dyn render::ChartRenderer,
    reporter: &dyn report::Reporter,
) -> Vec<render::RenderedBlock> {
    extract::extract_with_reporter(text, reporter)
        .blocks
        .iter()
        .map(|block| render::render_block(block, renderer, reporter))
        .collect()
}
