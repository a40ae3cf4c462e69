//! End-to-end pipeline tests: extract -> classify -> render ->
//! substitute, including the degrade-on-failure paths.

use mdchart::{
    classify, convert, convert_with_reporter, extract, process, render_block, ChartRenderer,
    ChartSpec, ChartType, ConvertOptions, Error, ImageFormat, NullReporter, Result, SvgRenderer,
};

/// Renderer returning fixed bytes, so the pipeline can be exercised
/// without any graphics backend.
struct FakeRenderer;

impl ChartRenderer for FakeRenderer {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }

    fn render(&self, _spec: &ChartSpec) -> Result<Vec<u8>> {
        Ok(b"PNGBYTES".to_vec())
    }
}

/// Renderer that always fails, to prove failures stay at the boundary.
struct FailingRenderer;

impl ChartRenderer for FailingRenderer {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }

    fn render(&self, _spec: &ChartSpec) -> Result<Vec<u8>> {
        Err(Error::Render("backend unavailable".to_string()))
    }
}

const REVENUE_TABLE: &str = "\
| 年份 | 收入 |
| --- | --- |
| 2021 | 100 |
| 2022 | 150 |
";

#[test]
fn end_to_end_revenue_table() {
    let extraction = extract(REVENUE_TABLE);
    assert_eq!(extraction.blocks.len(), 1);
    assert!(extraction.unsupported.is_empty());

    let block = &extraction.blocks[0];
    let table = block.as_table().unwrap();
    assert_eq!(table.column_count(), 2);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.numeric_column(1), Some(vec![100.0, 150.0]));

    assert_eq!(classify(block), ChartType::Line);

    let rendered = render_block(block, &FakeRenderer, &NullReporter);
    assert_eq!(rendered.image.as_ref().map(|i| i.data.as_slice()), Some(&b"PNGBYTES"[..]));
    assert_eq!(rendered.table_html.matches("<th>").count(), 2);
    assert_eq!(rendered.table_html.matches("<td>").count(), 4);
}

#[test]
fn classification_matches_reference_examples() {
    // Year-like labels under an unrecognized header still give a line
    let text = "| Year | Revenue |\n| --- | --- |\n| 2021 | 100 |\n| 2022 | 150 |\n";
    let extraction = extract(text);
    assert_eq!(classify(&extraction.blocks[0]), ChartType::Line);

    // Category labels give a bar
    let text = "| Product | Sales |\n| --- | --- |\n| apples | 3 |\n| pears | 5 |\n";
    let extraction = extract(text);
    assert_eq!(classify(&extraction.blocks[0]), ChartType::Bar);

    // A proportion marker in any header of a wide table gives a pie
    let text = "| 部门 | 人数 | 占比 |\n| - | - | - |\n| a | 10 | 25 |\n| b | 30 | 75 |\n";
    let extraction = extract(text);
    assert_eq!(classify(&extraction.blocks[0]), ChartType::Pie);
}

#[test]
fn render_failure_never_reaches_the_caller() {
    let extraction = extract(REVENUE_TABLE);
    let rendered = render_block(&extraction.blocks[0], &FailingRenderer, &NullReporter);
    assert!(rendered.image.is_none());
    // fallback still carries the original cells verbatim
    assert!(rendered.table_html.contains("<td>2021</td>"));
    assert!(rendered.table_html.contains("<td>150</td>"));
}

#[test]
fn malformed_numeric_payload_degrades_to_table() {
    // Wide table without a proportion marker classifies as a stacked
    // bar, but the text column makes the series unbuildable.
    let text = "| Region | Q1 | Note |\n| - | - | - |\n| north | 1 | ok |\n| south | 2 | meh |\n";
    let extraction = extract(text);
    let block = &extraction.blocks[0];
    assert_eq!(classify(block), ChartType::StackedBar);

    let rendered = render_block(block, &SvgRenderer, &NullReporter);
    assert!(rendered.image.is_none());
    assert!(rendered.table_html.contains("<td>ok</td>"));
    assert!(rendered.table_html.contains("<td>meh</td>"));
}

#[test]
fn classification_is_deterministic_across_calls() {
    let extraction = extract(REVENUE_TABLE);
    let block = &extraction.blocks[0];
    assert_eq!(classify(block), classify(block));

    let a = SvgRenderer
        .render(&mdchart::render::build_spec(block, classify(block)).unwrap().unwrap())
        .unwrap();
    let b = SvgRenderer
        .render(&mdchart::render::build_spec(block, classify(block)).unwrap().unwrap())
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn process_returns_span_fragment_pairs() {
    let text = format!("intro\n\n{REVENUE_TABLE}\n- alpha 10\n- beta 20\n");
    let rendered = process(&text, &FakeRenderer, &NullReporter);
    assert_eq!(rendered.len(), 2);
    for block in &rendered {
        assert_eq!(&text[block.span.start..block.span.end], block.span.text);
    }
    assert_eq!(rendered[0].chart_type, ChartType::Line);
    assert_eq!(rendered[1].chart_type, ChartType::Bar);
}

#[test]
fn convert_replaces_every_block_kind() {
    let text = format!(
        "# Report\n\n{REVENUE_TABLE}\nHighlights:\n\n- alpha 10\n- beta 20\n\n```\njan,1\nfeb,2\n```\n"
    );
    let options = ConvertOptions::new().with_image_format(ImageFormat::Svg);
    let converted = convert(&text, &options);
    assert_eq!(converted.replaced, 3);
    assert_eq!(converted.skipped, 0);
    assert!(converted.output.contains("# Report"));
    assert!(converted.output.contains("Highlights:"));
    assert!(!converted.output.contains("| 2021 |"));
    assert!(!converted.output.contains("- alpha 10"));
    assert_eq!(converted.output.matches("data:image/svg+xml;base64,").count(), 3);
}

#[test]
fn code_bar_gap_yields_table_without_image() {
    // Comma-less digit lines classify as a bar, but there is no
    // value-extraction rule for them; only the fallback table remains.
    let text = "```\nx = 1\ny = 2\n```\n";
    let extraction = extract(text);
    let block = &extraction.blocks[0];
    assert_eq!(classify(block), ChartType::Bar);

    let rendered = render_block(block, &SvgRenderer, &NullReporter);
    assert!(rendered.image.is_none());
    assert!(rendered.table_html.contains("<td>x = 1</td>"));
    assert!(rendered.table_html.contains("<td>y = 2</td>"));
}

#[test]
fn overlap_is_never_replaced_twice() {
    let text = "```\n| A | B |\n| - | - |\n| 1 | 2 |\n| 3 | 4 |\n```\n";
    let options = ConvertOptions::new().with_image_format(ImageFormat::Svg);
    let converted = convert_with_reporter(text, &options, &NullReporter);
    assert_eq!(converted.replaced, 1);
    assert_eq!(converted.skipped, 1);
    // exactly one fragment was inserted
    assert_eq!(converted.output.matches("<div style=\"text-align:center;margin:1em 0;\">").count(), 1);
}

#[cfg(feature = "raster")]
#[test]
fn png_renderer_produces_png_bytes() {
    use mdchart::PngRenderer;

    let extraction = extract(REVENUE_TABLE);
    let rendered = render_block(&extraction.blocks[0], &PngRenderer::new(), &NullReporter);
    let image = rendered.image.expect("png render should succeed");
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(&image.data[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
}
