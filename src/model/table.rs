//! Tabular data extracted from Markdown pipe tables.

use serde::{Deserialize, Serialize};

/// A rectangular grid with a header row and at least one data row.
///
/// Every data row has exactly one cell per column; ragged rows are
/// dropped during extraction and never reach this type. Cell text is
/// stored verbatim so fallback rendering can reproduce the source
/// exactly; numeric interpretation is derived per column on demand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableData {
    /// Column names from the header row
    pub headers: Vec<String>,

    /// Data rows, each with `headers.len()` cells
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    /// Create a table from a header row and data rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of data rows (header excluded).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the cell texts of one column, top to bottom.
    pub fn column(&self, idx: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.get(idx).map(String::as_str))
            .collect()
    }

    /// Parse one column as floating-point values.
    ///
    /// All-or-nothing: returns `Some` only when every cell in the
    /// column parses as `f64`. Columns with any non-numeric cell stay
    /// text and return `None`.
    pub fn numeric_column(&self, idx: usize) -> Option<Vec<f64>> {
        if idx >= self.column_count() || self.rows.is_empty() {
            return None;
        }
        self.rows
            .iter()
            .map(|row| row.get(idx).and_then(|cell| cell.trim().parse::<f64>().ok()))
            .collect()
    }

    /// Check whether every cell in a column parses as a number.
    pub fn is_numeric_column(&self, idx: usize) -> bool {
        self.numeric_column(idx).is_some()
    }
}
