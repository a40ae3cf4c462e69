//! Numeric data blocks and their source spans.

use super::TableData;
use serde::{Deserialize, Serialize};

/// The exact region of the input text that produced a block.
///
/// `text` is the verbatim substring; `start..end` is its byte range in
/// the scanned buffer. Substitution replaces this region in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Byte offset of the span start in the scanned buffer
    pub start: usize,
    /// Byte offset one past the span end
    pub end: usize,
    /// The verbatim source substring
    pub text: String,
}

impl SourceSpan {
    /// Create a span from a byte range and its text.
    pub fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check whether two spans cover overlapping byte ranges.
    pub fn overlaps(&self, other: &SourceSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// The kind of a data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Markdown pipe table
    Table,
    /// Run of bullet-list lines that each contain a digit
    NumericList,
    /// Fenced code block filtered to digit-bearing lines
    NumericCode,
}

impl BlockKind {
    /// Returns a human-readable name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Table => "table",
            BlockKind::NumericList => "numeric list",
            BlockKind::NumericCode => "numeric code",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The payload of a data block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum BlockPayload {
    /// A rectangular grid with a header row and at least one data row
    Table(TableData),
    /// Ordered list items, bullet markers stripped, each containing a digit
    NumericList(Vec<String>),
    /// Raw code lines, filtered to those containing a digit
    NumericCode(Vec<String>),
}

/// A contiguous span of source text recognized as numeric data.
///
/// Blocks are created by one scan over an input buffer, consumed
/// immediately by classification and rendering, and discarded when the
/// enclosing conversion returns. Nothing is cached across calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataBlock {
    /// The extracted data
    #[serde(flatten)]
    pub payload: BlockPayload,

    /// Where in the input the block came from
    pub span: SourceSpan,
}

impl DataBlock {
    /// Create a table block.
    pub fn table(data: TableData, span: SourceSpan) -> Self {
        Self {
            payload: BlockPayload::Table(data),
            span,
        }
    }

    /// Create a numeric-list block.
    pub fn numeric_list(items: Vec<String>, span: SourceSpan) -> Self {
        Self {
            payload: BlockPayload::NumericList(items),
            span,
        }
    }

    /// Create a numeric-code block.
    pub fn numeric_code(lines: Vec<String>, span: SourceSpan) -> Self {
        Self {
            payload: BlockPayload::NumericCode(lines),
            span,
        }
    }

    /// Get the kind of this block.
    pub fn kind(&self) -> BlockKind {
        match self.payload {
            BlockPayload::Table(_) => BlockKind::Table,
            BlockPayload::NumericList(_) => BlockKind::NumericList,
            BlockPayload::NumericCode(_) => BlockKind::NumericCode,
        }
    }

    /// Get the table payload, if this is a table block.
    pub fn as_table(&self) -> Option<&TableData> {
        match &self.payload {
            BlockPayload::Table(table) => Some(table),
            _ => None,
        }
    }
}
