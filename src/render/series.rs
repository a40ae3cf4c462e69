//! Chart series assembly.
//!
//! Turns a classified block into the label/value series a renderer
//! draws. This is where the original value-extraction rules live, and
//! where payloads that cannot carry the requested shape are rejected
//! (the render boundary catches the error and degrades to no image).

use serde::{Deserialize, Serialize};

use crate::classify::{self, ChartType};
use crate::error::{Error, Result};
use crate::model::{BlockPayload, DataBlock, TableData};

/// The drawable chart shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    StackedBar,
    Pie,
}

/// One named sequence of values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    /// Legend label; empty for single-series charts
    #[serde(default)]
    pub name: String,
    /// One value per category label
    pub values: Vec<f64>,
}

impl Series {
    /// Create a named series.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    /// The shape to draw
    pub kind: ChartKind,

    /// Chart title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Horizontal axis label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,

    /// Vertical axis label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,

    /// Category labels, one per slot/slice
    pub labels: Vec<String>,

    /// Value series; single-element except for stacked bars
    pub series: Vec<Series>,
}

impl ChartSpec {
    /// Create a single-series spec.
    pub fn single(kind: ChartKind, labels: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            kind,
            title: None,
            x_label: None,
            y_label: None,
            labels,
            series: vec![Series::new("", values)],
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Build the chart spec for a block and its recommendation.
///
/// Returns `Ok(None)` for [`ChartType::TableOnly`]; errors mean the
/// payload cannot be drawn as the requested shape.
pub fn build_spec(block: &DataBlock, chart_type: ChartType) -> Result<Option<ChartSpec>> {
    let kind = match chart_type {
        ChartType::TableOnly => return Ok(None),
        ChartType::Bar => ChartKind::Bar,
        ChartType::Line => ChartKind::Line,
        ChartType::StackedBar => ChartKind::StackedBar,
        ChartType::Pie => ChartKind::Pie,
    };

    let spec = match (&block.payload, kind) {
        (BlockPayload::Table(table), ChartKind::Bar | ChartKind::Line) => {
            let (labels, values) = table_xy(table)?;
            ChartSpec::single(kind, labels, values)
                .with_title(format!("{} vs {}", table.headers[0], table.headers[1]))
        }
        (BlockPayload::Table(table), ChartKind::StackedBar) => stacked_table(table)?,
        (BlockPayload::Table(table), ChartKind::Pie) => {
            let (labels, values) = table_xy(table)?;
            ChartSpec::single(ChartKind::Pie, labels, values)
        }
        (BlockPayload::NumericList(items), ChartKind::Bar) => list_bars(items)?,
        (BlockPayload::NumericCode(lines), ChartKind::Line) => {
            let (labels, values) = code_xy(lines)?;
            ChartSpec::single(ChartKind::Line, labels, values)
        }
        (BlockPayload::NumericCode(lines), ChartKind::Bar) => {
            // Lines without a comma have no value-extraction rule;
            // refuse instead of guessing.
            let (labels, values) = code_xy(lines)?;
            ChartSpec::single(ChartKind::Bar, labels, values)
        }
        (payload, kind) => {
            return Err(Error::InvalidData(format!(
                "{} payload cannot be drawn as {:?}",
                kind_name(payload),
                kind
            )))
        }
    };
    Ok(Some(spec))
}

fn kind_name(payload: &BlockPayload) -> &'static str {
    match payload {
        BlockPayload::Table(_) => "table",
        BlockPayload::NumericList(_) => "numeric list",
        BlockPayload::NumericCode(_) => "numeric code",
    }
}

/// First column as labels, second column as numeric values.
fn table_xy(table: &TableData) -> Result<(Vec<String>, Vec<f64>)> {
    if table.column_count() < 2 {
        return Err(Error::InvalidData(
            "table needs a label column and a value column".to_string(),
        ));
    }
    let values = table
        .numeric_column(1)
        .ok_or_else(|| Error::InvalidData("value column is not numeric".to_string()))?;
    let labels = table.column(0).iter().map(|s| s.to_string()).collect();
    Ok((labels, values))
}

/// Running sum across the value columns, one series per column.
///
/// The series carry the running sums themselves; the renderer stacks
/// them as segment heights, reproducing the original's cumulative
/// stacking.
fn stacked_table(table: &TableData) -> Result<ChartSpec> {
    if table.column_count() < 2 {
        return Err(Error::InvalidData(
            "table needs a label column and value columns".to_string(),
        ));
    }
    let labels: Vec<String> = table.column(0).iter().map(|s| s.to_string()).collect();
    let mut running = vec![0.0; table.row_count()];
    let mut series = Vec::with_capacity(table.column_count() - 1);
    for idx in 1..table.column_count() {
        let column = table.numeric_column(idx).ok_or_else(|| {
            Error::InvalidData(format!("column {:?} is not numeric", table.headers[idx]))
        })?;
        for (acc, v) in running.iter_mut().zip(&column) {
            *acc += v;
        }
        series.push(Series::new(table.headers[idx].clone(), running.clone()));
    }
    Ok(ChartSpec {
        kind: ChartKind::StackedBar,
        title: None,
        x_label: None,
        y_label: None,
        labels,
        series,
    })
}

/// One bar per item, labeled by 1-based position, valued by digit
/// concatenation (see [`classify::concatenated_digits`]).
fn list_bars(items: &[String]) -> Result<ChartSpec> {
    let labels: Vec<String> = (1..=items.len()).map(|i| i.to_string()).collect();
    let values: Result<Vec<f64>> = items
        .iter()
        .map(|item| {
            classify::concatenated_digits(item)
                .ok_or_else(|| Error::InvalidData(format!("list item without digits: {item:?}")))
        })
        .collect();
    Ok(ChartSpec::single(ChartKind::Bar, labels, values?))
}

/// Comma-separated code lines: first field is the label, second the
/// value. A line without a comma is an error, not a guess.
fn code_xy(lines: &[String]) -> Result<(Vec<String>, Vec<f64>)> {
    let mut labels = Vec::with_capacity(lines.len());
    let mut values = Vec::with_capacity(lines.len());
    for line in lines {
        let mut fields = line.splitn(3, ',');
        let (Some(label), Some(value)) = (fields.next(), fields.next()) else {
            return Err(Error::InvalidData(format!(
                "no value-extraction rule for code line without a comma: {line:?}"
            )));
        };
        let parsed = value
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::InvalidData(format!("not a number: {value:?}")))?;
        labels.push(label.to_string());
        values.push(parsed);
    }
    Ok((labels, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceSpan;

    fn span() -> SourceSpan {
        SourceSpan::new(0, 0, "")
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> TableData {
        TableData::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_table_line_spec() {
        let block = DataBlock::table(
            table(&["年份", "收入"], &[&["2021", "100"], &["2022", "150"]]),
            span(),
        );
        let spec = build_spec(&block, ChartType::Line).unwrap().unwrap();
        assert_eq!(spec.kind, ChartKind::Line);
        assert_eq!(spec.labels, vec!["2021", "2022"]);
        assert_eq!(spec.series[0].values, vec![100.0, 150.0]);
        assert_eq!(spec.title.as_deref(), Some("年份 vs 收入"));
    }

    #[test]
    fn test_table_only_builds_nothing() {
        let block = DataBlock::table(table(&["A"], &[&["1"]]), span());
        assert!(build_spec(&block, ChartType::TableOnly).unwrap().is_none());
    }

    #[test]
    fn test_non_numeric_value_column_is_rejected() {
        let block = DataBlock::table(table(&["A", "B"], &[&["x", "high"]]), span());
        let err = build_spec(&block, ChartType::Bar).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_stacked_series_carry_running_sums() {
        let block = DataBlock::table(
            table(
                &["Region", "Q1", "Q2"],
                &[&["north", "1", "2"], &["south", "3", "4"]],
            ),
            span(),
        );
        let spec = build_spec(&block, ChartType::StackedBar).unwrap().unwrap();
        assert_eq!(spec.series.len(), 2);
        assert_eq!(spec.series[0].name, "Q1");
        assert_eq!(spec.series[0].values, vec![1.0, 3.0]);
        // second series holds Q1 + Q2 per row
        assert_eq!(spec.series[1].values, vec![3.0, 7.0]);
    }

    #[test]
    fn test_stacked_rejects_text_column() {
        let block = DataBlock::table(
            table(
                &["Region", "Q1", "Note"],
                &[&["north", "1", "ok"], &["south", "3", "fine"]],
            ),
            span(),
        );
        assert!(build_spec(&block, ChartType::StackedBar).is_err());
    }

    #[test]
    fn test_list_bars_use_digit_concatenation() {
        let block = DataBlock::numeric_list(
            vec!["item 12 of 2024".to_string(), "count 7".to_string()],
            span(),
        );
        let spec = build_spec(&block, ChartType::Bar).unwrap().unwrap();
        assert_eq!(spec.labels, vec!["1", "2"]);
        assert_eq!(spec.series[0].values, vec![122024.0, 7.0]);
    }

    #[test]
    fn test_code_line_spec() {
        let block = DataBlock::numeric_code(
            vec!["jan,10".to_string(), "feb,20.5".to_string()],
            span(),
        );
        let spec = build_spec(&block, ChartType::Line).unwrap().unwrap();
        assert_eq!(spec.labels, vec!["jan", "feb"]);
        assert_eq!(spec.series[0].values, vec![10.0, 20.5]);
    }

    #[test]
    fn test_code_line_without_comma_is_rejected() {
        let block = DataBlock::numeric_code(vec!["x = 1".to_string()], span());
        let err = build_spec(&block, ChartType::Bar).unwrap_err();
        assert!(err.to_string().contains("without a comma"));
    }

    #[test]
    fn test_code_extra_fields_are_ignored() {
        let block = DataBlock::numeric_code(vec!["a,1,junk,more".to_string()], span());
        let spec = build_spec(&block, ChartType::Line).unwrap().unwrap();
        assert_eq!(spec.series[0].values, vec![1.0]);
    }

    #[test]
    fn test_mismatched_payload_and_kind() {
        let block = DataBlock::numeric_list(vec!["a 1".to_string()], span());
        assert!(build_spec(&block, ChartType::Pie).is_err());
    }
}
