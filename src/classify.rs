//! Chart-type classification for extracted blocks.
//!
//! A total, deterministic function from block shape and content to a
//! recommended chart: it always returns a recommendation, falling back
//! to [`ChartType::TableOnly`] when no rule matches.

use serde::{Deserialize, Serialize};

use crate::model::{BlockPayload, DataBlock, TableData};

/// Header tokens that mark the first column as a time/period axis.
const PERIOD_TOKENS: [&str; 4] = ["年", "月", "date", "time"];

/// Header tokens that mark a column as a proportion/percentage.
const PROPORTION_TOKENS: [&str; 2] = ["占比", "比例"];

/// The recommended visualization shape for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    /// One bar per category
    Bar,
    /// Values over a period axis
    Line,
    /// Per-row running sums of the value columns, stacked
    StackedBar,
    /// Share-of-total slices
    Pie,
    /// No chart; only the fallback table applies
    TableOnly,
}

impl ChartType {
    /// Returns a human-readable name for this chart type.
    pub fn name(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::StackedBar => "stacked bar",
            ChartType::Pie => "pie",
            ChartType::TableOnly => "table only",
        }
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Recommend a chart type for a block.
pub fn classify(block: &DataBlock) -> ChartType {
    match &block.payload {
        BlockPayload::Table(table) => classify_table(table),
        BlockPayload::NumericList(_) => ChartType::Bar,
        BlockPayload::NumericCode(lines) => classify_code(lines),
    }
}

fn classify_table(table: &TableData) -> ChartType {
    match table.column_count() {
        2 if table.is_numeric_column(1) => {
            if is_period_column(&table.headers[0], &table.column(0)) {
                ChartType::Line
            } else {
                ChartType::Bar
            }
        }
        n if n > 2 => {
            let has_proportion_header = table
                .headers
                .iter()
                .any(|h| PROPORTION_TOKENS.iter().any(|t| h.contains(t)));
            if has_proportion_header {
                ChartType::Pie
            } else {
                ChartType::StackedBar
            }
        }
        _ => ChartType::TableOnly,
    }
}

/// Period detection: the header names a time unit, or every label in
/// the column is all digits (checked on the verbatim cell text).
fn is_period_column(header: &str, labels: &[&str]) -> bool {
    if PERIOD_TOKENS.iter().any(|t| header.contains(t)) {
        return true;
    }
    !labels.is_empty()
        && labels
            .iter()
            .all(|l| !l.is_empty() && l.chars().all(|c| c.is_ascii_digit()))
}

fn classify_code(lines: &[String]) -> ChartType {
    if lines.iter().all(|line| line.contains(',')) {
        ChartType::Line
    } else {
        ChartType::Bar
    }
}

/// Interpret a list item's digit characters, concatenated in order, as
/// one integer value.
///
/// This is a lossy, order-preserving digit extraction, not a
/// decimal-aware parse: `"item 12 of 2024"` yields `122024.0`. The rule
/// is kept for compatibility and lives only here, so a corrected parser
/// can be substituted without touching the rest of the pipeline.
pub fn concatenated_digits(item: &str) -> Option<f64> {
    let digits: String = item.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok()
}
