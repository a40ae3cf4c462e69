//! Whole-buffer conversion.
//!
//! Performs the substitution the library's callers would otherwise do
//! themselves: every detected numeric block is replaced in place by a
//! centered fragment holding the chart image (when one rendered) and
//! the fallback table. Explicit `chart`-fenced blocks carrying a JSON
//! spec are rendered first, so the numeric scans do not re-detect
//! their payloads; `mermaid`-fenced blocks become a placeholder note.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::extract;
use crate::model::SourceSpan;
use crate::render::{self, ChartImage, ChartKind, ChartRenderer, ChartSpec, RenderedBlock, Series, SvgRenderer};
use crate::report::{LogReporter, Reporter};

static CHART_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"```chart\s*([\s\S]*?)```").unwrap());
static MERMAID_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```mermaid\s*([\s\S]*?)```").unwrap());

const MERMAID_PLACEHOLDER: &str =
    "<div style=\"text-align:center;color:#888;\"><b>[mermaid diagram omitted]</b></div>";

/// Which image encoding conversion embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Standalone SVG documents
    Svg,
    /// PNG rasterized from the SVG
    #[cfg(feature = "raster")]
    Png,
}

impl Default for ImageFormat {
    #[cfg(feature = "raster")]
    fn default() -> Self {
        ImageFormat::Png
    }

    #[cfg(not(feature = "raster"))]
    fn default() -> Self {
        ImageFormat::Svg
    }
}

/// Options for buffer conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Image encoding for rendered charts
    pub image_format: ImageFormat,

    /// Render explicit `chart`-fenced blocks carrying a JSON spec
    pub chart_blocks: bool,

    /// Replace `mermaid`-fenced blocks with a placeholder note
    pub mermaid_placeholder: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            image_format: ImageFormat::default(),
            chart_blocks: true,
            mermaid_placeholder: true,
        }
    }
}

impl ConvertOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image encoding.
    pub fn with_image_format(mut self, format: ImageFormat) -> Self {
        self.image_format = format;
        self
    }

    /// Enable or disable explicit chart-block rendering.
    pub fn with_chart_blocks(mut self, enabled: bool) -> Self {
        self.chart_blocks = enabled;
        self
    }

    /// Enable or disable the mermaid placeholder.
    pub fn with_mermaid_placeholder(mut self, enabled: bool) -> Self {
        self.mermaid_placeholder = enabled;
        self
    }
}

/// The outcome of one buffer conversion.
#[derive(Debug, Clone)]
pub struct Converted {
    /// The buffer with every replacement applied
    pub output: String,

    /// Number of auto-detected blocks replaced
    pub replaced: usize,

    /// Number of explicit chart blocks rendered
    pub chart_blocks: usize,

    /// Number of blocks skipped because their span overlaps an
    /// earlier replacement
    pub skipped: usize,

    /// Table-shaped substrings that were rejected during extraction
    pub unsupported: Vec<String>,
}

/// Convert a buffer, logging diagnostics through the `log` facade.
pub fn convert(text: &str, options: &ConvertOptions) -> Converted {
    convert_with_reporter(text, options, &LogReporter)
}

/// Convert a buffer, reporting diagnostics to `reporter`.
pub fn convert_with_reporter(
    text: &str,
    options: &ConvertOptions,
    reporter: &dyn Reporter,
) -> Converted {
    let renderer = renderer_for(options.image_format);

    // Explicit blocks first, so the numeric scans below do not
    // re-detect their payloads.
    let mut chart_count = 0;
    let mut buffer = if options.chart_blocks {
        replace_chart_blocks(text, renderer.as_ref(), reporter, &mut chart_count)
    } else {
        text.to_string()
    };
    if options.mermaid_placeholder {
        buffer = MERMAID_BLOCK
            .replace_all(&buffer, MERMAID_PLACEHOLDER)
            .into_owned();
    }

    // Auto-detected numeric blocks, replaced span by span. The first
    // replacement of a region wins; later blocks whose spans overlap
    // it are skipped.
    let extraction = extract::extract_with_reporter(&buffer, reporter);
    let mut selected: Vec<(SourceSpan, String)> = Vec::new();
    let mut skipped = 0;
    for block in &extraction.blocks {
        if selected.iter().any(|(span, _)| span.overlaps(&block.span)) {
            reporter.overlap_skipped(&block.span);
            skipped += 1;
            continue;
        }
        let rendered = render::render_block(block, renderer.as_ref(), reporter);
        selected.push((block.span.clone(), block_fragment(&rendered)));
    }
    selected.sort_by_key(|(span, _)| span.start);

    let mut output = String::with_capacity(buffer.len());
    let mut pos = 0;
    for (span, fragment) in &selected {
        output.push_str(&buffer[pos..span.start]);
        output.push_str(fragment);
        pos = span.end;
    }
    output.push_str(&buffer[pos..]);

    Converted {
        output,
        replaced: selected.len(),
        chart_blocks: chart_count,
        skipped,
        unsupported: extraction.unsupported,
    }
}

/// Build the HTML fragment that replaces one block: the chart image
/// (when one rendered) followed by the fallback table.
pub fn block_fragment(rendered: &RenderedBlock) -> String {
    let mut html = String::from("<div style=\"text-align:center;margin:1em 0;\">");
    if let Some(image) = &rendered.image {
        html.push_str(&image_tag(image));
    }
    html.push_str(&rendered.table_html);
    html.push_str("</div>");
    html
}

fn image_tag(image: &ChartImage) -> String {
    format!(
        "<img src=\"data:{};base64,{}\" style=\"max-width:100%;height:auto;\"/>",
        image.mime_type,
        STANDARD.encode(&image.data)
    )
}

fn renderer_for(format: ImageFormat) -> Box<dyn ChartRenderer> {
    match format {
        ImageFormat::Svg => Box::new(SvgRenderer),
        #[cfg(feature = "raster")]
        ImageFormat::Png => Box::new(render::PngRenderer::new()),
    }
}

/// The JSON payload of an explicit `chart`-fenced block.
#[derive(Debug, Deserialize)]
struct ChartBlockSpec {
    #[serde(rename = "type")]
    kind: JsonChartKind,
    labels: Vec<String>,
    data: Vec<f64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    xlabel: Option<String>,
    #[serde(default)]
    ylabel: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum JsonChartKind {
    Bar,
    Line,
    Pie,
}

impl From<JsonChartKind> for ChartKind {
    fn from(kind: JsonChartKind) -> Self {
        match kind {
            JsonChartKind::Bar => ChartKind::Bar,
            JsonChartKind::Line => ChartKind::Line,
            JsonChartKind::Pie => ChartKind::Pie,
        }
    }
}

fn replace_chart_blocks(
    text: &str,
    renderer: &dyn ChartRenderer,
    reporter: &dyn Reporter,
    count: &mut usize,
) -> String {
    CHART_BLOCK
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let body = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            match render_chart_block(body, renderer) {
                Ok(image) => {
                    *count += 1;
                    format!(
                        "<div style=\"text-align:center;margin:1em 0;\">{}</div>",
                        image_tag(&image)
                    )
                }
                Err(e) => {
                    // Malformed specs leave the block untouched.
                    reporter.render_failed("chart block", &e);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

fn render_chart_block(body: &str, renderer: &dyn ChartRenderer) -> Result<ChartImage> {
    let spec: ChartBlockSpec = serde_json::from_str(body.trim())?;
    if spec.labels.len() != spec.data.len() {
        return Err(Error::ChartSpec(format!(
            "{} labels for {} data points",
            spec.labels.len(),
            spec.data.len()
        )));
    }
    let chart = ChartSpec {
        kind: spec.kind.into(),
        title: spec.title,
        x_label: spec.xlabel,
        y_label: spec.ylabel,
        labels: spec.labels,
        series: vec![Series::new("", spec.data)],
    };
    let data = renderer.render(&chart)?;
    Ok(ChartImage {
        data,
        mime_type: renderer.mime_type(),
    })
}
