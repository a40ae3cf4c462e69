//! Deterministic SVG chart drawing.
//!
//! Charts are built as plain SVG text with a fixed 800x500 canvas, so
//! identical specs always produce identical bytes. Rasterization to
//! PNG is a separate step (see the `raster` module).

use std::f64::consts::{PI, TAU};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::series::{ChartKind, ChartSpec, Series};
use crate::error::{Error, Result};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 500.0;

const PLOT_LEFT: f64 = 70.0;
const PLOT_RIGHT: f64 = WIDTH - 30.0;
const PLOT_TOP: f64 = 50.0;
const PLOT_BOTTOM: f64 = HEIGHT - 70.0;

const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";
const AXIS_COLOR: &str = "#333333";
const GRID_COLOR: &str = "#dddddd";

/// Series colors, cycled.
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Approximate glyph column width in pixels for the chart font.
const CHAR_PX: f64 = 7.5;

/// Build the SVG document for a chart spec.
pub fn chart_svg(spec: &ChartSpec) -> Result<String> {
    validate(spec)?;
    match spec.kind {
        ChartKind::Bar => Ok(axis_chart(spec, false)),
        ChartKind::Line => Ok(axis_chart(spec, true)),
        ChartKind::StackedBar => Ok(stacked_chart(spec)),
        ChartKind::Pie => pie_chart(spec),
    }
}

fn validate(spec: &ChartSpec) -> Result<()> {
    if spec.labels.is_empty() || spec.series.is_empty() {
        return Err(Error::Render("empty series".to_string()));
    }
    for series in &spec.series {
        if series.values.len() != spec.labels.len() {
            return Err(Error::Render(format!(
                "series {:?} has {} values for {} labels",
                series.name,
                series.values.len(),
                spec.labels.len()
            )));
        }
        if series.values.iter().any(|v| !v.is_finite()) {
            return Err(Error::Render("non-finite value".to_string()));
        }
    }
    Ok(())
}

fn color(idx: usize) -> &'static str {
    PALETTE[idx % PALETTE.len()]
}

fn px(v: f64) -> String {
    format!("{v:.1}")
}

/// Bar and line charts share the axis frame; only the marks differ.
fn axis_chart(spec: &ChartSpec, as_line: bool) -> String {
    let values = &spec.series[0].values;
    let scale = ValueScale::fit(values.iter().copied());
    let mut canvas = Canvas::new();
    draw_chrome(&mut canvas, spec, &scale);
    draw_category_labels(&mut canvas, &spec.labels);

    let slot = (PLOT_RIGHT - PLOT_LEFT) / spec.labels.len() as f64;
    if as_line {
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (PLOT_LEFT + (i as f64 + 0.5) * slot, scale.y(*v)))
            .collect();
        canvas.polyline(&points, color(0), 2.0);
        for (x, y) in &points {
            canvas.circle(*x, *y, 4.0, color(0));
        }
    } else {
        let bar_w = slot * 0.6;
        let baseline = scale.y(0.0);
        for (i, v) in values.iter().enumerate() {
            let x = PLOT_LEFT + i as f64 * slot + (slot - bar_w) / 2.0;
            let y = scale.y(*v);
            let (top, height) = if y <= baseline {
                (y, baseline - y)
            } else {
                (baseline, y - baseline)
            };
            canvas.rect(x, top, bar_w, height, color(0));
        }
    }
    canvas.finish()
}

fn stacked_chart(spec: &ChartSpec) -> String {
    let n = spec.labels.len();

    // Scale over the stacked extents per slot.
    let mut lo = 0.0f64;
    let mut hi = 0.0f64;
    for i in 0..n {
        let mut acc = 0.0;
        for series in &spec.series {
            acc += series.values[i];
            lo = lo.min(acc);
            hi = hi.max(acc);
        }
    }
    let scale = ValueScale::new(lo, hi);

    let mut canvas = Canvas::new();
    draw_chrome(&mut canvas, spec, &scale);
    draw_category_labels(&mut canvas, &spec.labels);

    let slot = (PLOT_RIGHT - PLOT_LEFT) / n as f64;
    let bar_w = slot * 0.6;
    for i in 0..n {
        let x = PLOT_LEFT + i as f64 * slot + (slot - bar_w) / 2.0;
        let mut acc = 0.0;
        for (k, series) in spec.series.iter().enumerate() {
            let from = scale.y(acc);
            acc += series.values[i];
            let to = scale.y(acc);
            let (top, height) = if to <= from { (to, from - to) } else { (from, to - from) };
            canvas.rect(x, top, bar_w, height, color(k));
        }
    }
    draw_legend(&mut canvas, &spec.series);
    canvas.finish()
}

fn pie_chart(spec: &ChartSpec) -> Result<String> {
    let values = &spec.series[0].values;
    if values.iter().any(|v| *v < 0.0) {
        return Err(Error::Render("negative slice value".to_string()));
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Err(Error::Render("slice values sum to zero".to_string()));
    }

    let mut canvas = Canvas::new();
    if let Some(title) = &spec.title {
        canvas.bold_text(WIDTH / 2.0, 30.0, "middle", 16.0, title);
    }

    let cx = WIDTH / 2.0;
    let cy = PLOT_TOP + (PLOT_BOTTOM - PLOT_TOP) / 2.0 + 10.0;
    let r = 160.0;

    let mut angle = -PI / 2.0;
    for (i, v) in values.iter().enumerate() {
        let frac = v / total;
        if frac <= 0.0 {
            continue;
        }
        let sweep = frac * TAU;
        if frac >= 1.0 - 1e-9 {
            canvas.circle(cx, cy, r, color(i));
        } else {
            let (x1, y1) = arc_point(cx, cy, r, angle);
            let (x2, y2) = arc_point(cx, cy, r, angle + sweep);
            let large = if frac > 0.5 { 1 } else { 0 };
            let d = format!(
                "M {} {} L {} {} A {} {} 0 {} 1 {} {} Z",
                px(cx),
                px(cy),
                px(x1),
                px(y1),
                px(r),
                px(r),
                large,
                px(x2),
                px(y2)
            );
            canvas.path(&d, color(i));
        }

        let mid = angle + sweep / 2.0;
        let (tx, ty) = arc_point(cx, cy, r * 0.6, mid);
        canvas.text(
            tx,
            ty + 4.0,
            "middle",
            12.0,
            "#000000",
            &format!("{:.1}%", frac * 100.0),
        );
        let (lx, ly) = arc_point(cx, cy, r * 1.15, mid);
        let anchor = if mid.cos() >= 0.0 { "start" } else { "end" };
        canvas.text(
            lx,
            ly + 4.0,
            anchor,
            12.0,
            AXIS_COLOR,
            &truncate_label(&spec.labels[i], 140.0),
        );
        angle += sweep;
    }
    Ok(canvas.finish())
}

fn arc_point(cx: f64, cy: f64, r: f64, angle: f64) -> (f64, f64) {
    (cx + r * angle.cos(), cy + r * angle.sin())
}

/// Title, gridlines, axes, value ticks, and axis labels.
fn draw_chrome(canvas: &mut Canvas, spec: &ChartSpec, scale: &ValueScale) {
    if let Some(title) = &spec.title {
        canvas.bold_text(WIDTH / 2.0, 30.0, "middle", 16.0, title);
    }
    for tick in scale.ticks() {
        let y = scale.y(tick);
        canvas.line(PLOT_LEFT, y, PLOT_RIGHT, y, GRID_COLOR, 1.0);
        canvas.text(
            PLOT_LEFT - 8.0,
            y + 4.0,
            "end",
            12.0,
            AXIS_COLOR,
            &format_number(tick),
        );
    }
    canvas.line(PLOT_LEFT, PLOT_TOP, PLOT_LEFT, PLOT_BOTTOM, AXIS_COLOR, 1.5);
    let baseline = scale.y(0.0);
    canvas.line(PLOT_LEFT, baseline, PLOT_RIGHT, baseline, AXIS_COLOR, 1.5);

    if let Some(x_label) = &spec.x_label {
        canvas.text(
            (PLOT_LEFT + PLOT_RIGHT) / 2.0,
            HEIGHT - 14.0,
            "middle",
            13.0,
            AXIS_COLOR,
            x_label,
        );
    }
    if let Some(y_label) = &spec.y_label {
        canvas.rotated_text(18.0, (PLOT_TOP + PLOT_BOTTOM) / 2.0, y_label);
    }
}

fn draw_category_labels(canvas: &mut Canvas, labels: &[String]) {
    let slot = (PLOT_RIGHT - PLOT_LEFT) / labels.len() as f64;
    for (i, label) in labels.iter().enumerate() {
        let x = PLOT_LEFT + (i as f64 + 0.5) * slot;
        canvas.text(
            x,
            PLOT_BOTTOM + 20.0,
            "middle",
            12.0,
            AXIS_COLOR,
            &truncate_label(label, slot - 6.0),
        );
    }
}

fn draw_legend(canvas: &mut Canvas, series: &[Series]) {
    let x = PLOT_RIGHT - 150.0;
    for (k, s) in series.iter().enumerate() {
        let y = PLOT_TOP + 8.0 + k as f64 * 18.0;
        canvas.rect(x, y - 9.0, 12.0, 12.0, color(k));
        canvas.text(
            x + 18.0,
            y + 2.0,
            "start",
            12.0,
            AXIS_COLOR,
            &truncate_label(&s.name, 120.0),
        );
    }
}

/// Linear value axis including zero.
struct ValueScale {
    lo: f64,
    hi: f64,
}

impl ValueScale {
    fn new(lo: f64, hi: f64) -> Self {
        let lo = lo.min(0.0);
        let mut hi = hi.max(0.0);
        if hi - lo < f64::EPSILON {
            hi = lo + 1.0;
        }
        Self { lo, hi }
    }

    fn fit(values: impl Iterator<Item = f64>) -> Self {
        let mut lo = 0.0f64;
        let mut hi = 0.0f64;
        for v in values {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        Self::new(lo, hi)
    }

    fn y(&self, v: f64) -> f64 {
        PLOT_BOTTOM - (v - self.lo) / (self.hi - self.lo) * (PLOT_BOTTOM - PLOT_TOP)
    }

    fn ticks(&self) -> Vec<f64> {
        let step = nice_step((self.hi - self.lo) / 5.0);
        let mut ticks = Vec::new();
        let mut k = (self.lo / step).ceil();
        let last = (self.hi / step).floor();
        while k <= last {
            ticks.push(k * step);
            k += 1.0;
        }
        ticks
    }
}

/// Round a raw interval up to a 1/2/5 step.
fn nice_step(raw: f64) -> f64 {
    let mag = 10f64.powf(raw.abs().log10().floor());
    let norm = raw / mag;
    if norm <= 1.0 {
        mag
    } else if norm <= 2.0 {
        2.0 * mag
    } else if norm <= 5.0 {
        5.0 * mag
    } else {
        10.0 * mag
    }
}

/// Format a number, removing unnecessary trailing zeros.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        let s = format!("{n:.6}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Shorten a label to roughly `max_px` of rendered width.
fn truncate_label(label: &str, max_px: f64) -> String {
    if label.width() as f64 * CHAR_PX <= max_px {
        return label.to_string();
    }
    let budget = (max_px / CHAR_PX).floor().max(1.0) as usize;
    let mut out = String::new();
    let mut used = 0usize;
    for ch in label.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Accumulates SVG elements over a fixed white canvas.
struct Canvas {
    body: String,
}

impl Canvas {
    fn new() -> Self {
        let mut body = String::with_capacity(4096);
        body.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            w = WIDTH as u32,
            h = HEIGHT as u32
        ));
        body.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#ffffff\"/>\n",
            WIDTH as u32, HEIGHT as u32
        ));
        Self { body }
    }

    fn finish(mut self) -> String {
        self.body.push_str("</svg>\n");
        self.body
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) {
        self.body.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
            px(x),
            px(y),
            px(w),
            px(h),
            fill
        ));
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
        self.body.push_str(&format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>\n",
            px(x1),
            px(y1),
            px(x2),
            px(y2),
            stroke,
            px(width)
        ));
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &str, width: f64) {
        let coords: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{},{}", px(*x), px(*y)))
            .collect();
        self.body.push_str(&format!(
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>\n",
            coords.join(" "),
            stroke,
            px(width)
        ));
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        self.body.push_str(&format!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\"/>\n",
            px(cx),
            px(cy),
            px(r),
            fill
        ));
    }

    fn path(&mut self, d: &str, fill: &str) {
        self.body
            .push_str(&format!("<path d=\"{}\" fill=\"{}\"/>\n", d, fill));
    }

    fn text(&mut self, x: f64, y: f64, anchor: &str, size: f64, fill: &str, content: &str) {
        self.body.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>\n",
            px(x),
            px(y),
            anchor,
            FONT_FAMILY,
            px(size),
            fill,
            escape_text(content)
        ));
    }

    fn bold_text(&mut self, x: f64, y: f64, anchor: &str, size: f64, content: &str) {
        self.body.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>\n",
            px(x),
            px(y),
            anchor,
            FONT_FAMILY,
            px(size),
            AXIS_COLOR,
            escape_text(content)
        ));
    }

    fn rotated_text(&mut self, x: f64, y: f64, content: &str) {
        self.body.push_str(&format!(
            "<text x=\"{x}\" y=\"{y}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"13\" fill=\"{}\" transform=\"rotate(-90 {x} {y})\">{}</text>\n",
            FONT_FAMILY,
            AXIS_COLOR,
            escape_text(content),
            x = px(x),
            y = px(y)
        ));
    }
}
