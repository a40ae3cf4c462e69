//! Numeric data block extraction.
//!
//! Three independent scans over one text buffer detect Markdown pipe
//! tables, runs of numeric bullet-list lines, and fenced code blocks
//! containing digits. The scans do not know about each other: text that
//! satisfies more than one pattern is yielded more than once, and
//! substitution deals with the overlap (see [`crate::convert`]).
//!
//! Extraction never fails. Rows that do not fit a candidate table are
//! dropped, and table-shaped text that cannot be parsed is collected
//! for diagnostics instead of being yielded.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{DataBlock, SourceSpan, TableData};
use crate::report::{NullReporter, Reporter};

/// Run of two or more bullet lines, each containing a digit.
static LIST_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^- .*[0-9].*(?:\n- .*[0-9].*)+").unwrap());

/// Fenced code block; the language tag is matched but ignored.
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[a-zA-Z0-9]*\n([\s\S]*?)```").unwrap());

/// The result of scanning one buffer.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Detected blocks: all tables first, then lists, then code blocks
    pub blocks: Vec<DataBlock>,

    /// Table-shaped substrings that were rejected, for diagnostics only
    pub unsupported: Vec<String>,
}

/// Scan a buffer for numeric data blocks.
pub fn extract(text: &str) -> Extraction {
    extract_with_reporter(text, &NullReporter)
}

/// Scan a buffer for numeric data blocks, reporting diagnostics.
pub fn extract_with_reporter(text: &str, reporter: &dyn Reporter) -> Extraction {
    let mut extraction = Extraction::default();
    scan_tables(text, &mut extraction, reporter);
    scan_lists(text, &mut extraction);
    scan_code(text, &mut extraction);
    if extraction.blocks.is_empty() {
        reporter.nothing_detected();
    }
    extraction
}

/// Byte ranges of each line, excluding the trailing newline.
fn line_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            ranges.push((start, i));
            start = i + 1;
        }
    }
    if start < text.len() {
        ranges.push((start, text.len()));
    }
    ranges
}

/// A pipe-delimited row: starts and ends with `|` after trimming.
fn is_row_line(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 2 && t.starts_with('|') && t.ends_with('|')
}

/// A separator row: only pipes, dashes, colons, and spaces, with at
/// least one dash or colon.
fn is_separator_line(line: &str) -> bool {
    let t = line.trim();
    !t.is_empty()
        && t.chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
        && t.chars().any(|c| c == '-' || c == ':')
}

fn split_cells(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn scan_tables(text: &str, extraction: &mut Extraction, reporter: &dyn Reporter) {
    let lines = line_ranges(text);
    let mut i = 0;
    while i < lines.len() {
        let (start, end) = lines[i];
        let line = &text[start..end];
        if !is_row_line(line) || is_separator_line(line) {
            i += 1;
            continue;
        }
        let separator_follows = lines
            .get(i + 1)
            .map(|&(s, e)| is_row_line(&text[s..e]) && is_separator_line(&text[s..e]))
            .unwrap_or(false);
        if !separator_follows {
            i += 1;
            continue;
        }

        // Collect the run of row-shaped lines (separators included).
        let mut j = i + 1;
        while j < lines.len() && is_row_line(&text[lines[j].0..lines[j].1]) {
            j += 1;
        }

        let span_start = start;
        let mut span_end = lines[j - 1].1;
        if text.as_bytes().get(span_end) == Some(&b'\n') {
            span_end += 1;
        }
        let raw = &text[span_start..span_end];

        match parse_table(text, &lines[i..j]) {
            Some(table) => extraction.blocks.push(DataBlock::table(
                table,
                SourceSpan::new(span_start, span_end, raw),
            )),
            None => {
                extraction.unsupported.push(raw.to_string());
                reporter.unsupported_table(raw);
            }
        }
        i = j;
    }
}

/// Parse the collected lines into a table, or `None` if the candidate
/// has fewer than two usable rows or no data row matches the header's
/// cell count.
fn parse_table(text: &str, lines: &[(usize, usize)]) -> Option<TableData> {
    let data_lines: Vec<&str> = lines
        .iter()
        .map(|&(s, e)| text[s..e].trim())
        .filter(|l| !l.is_empty() && !is_separator_line(l))
        .collect();
    if data_lines.len() < 2 {
        return None;
    }

    let headers = split_cells(data_lines[0]);
    let rows: Vec<Vec<String>> = data_lines[1..]
        .iter()
        .map(|line| split_cells(line))
        .filter(|row| row.len() == headers.len())
        .collect();
    if rows.is_empty() {
        return None;
    }

    Some(TableData::new(headers, rows))
}

fn scan_lists(text: &str, extraction: &mut Extraction) {
    for m in LIST_RUN.find_iter(text) {
        let items: Vec<String> = m
            .as_str()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.trim_matches(|c| c == '-' || c == ' ').to_string())
            .collect();
        extraction.blocks.push(DataBlock::numeric_list(
            items,
            SourceSpan::new(m.start(), m.end(), m.as_str()),
        ));
    }
}

fn scan_code(text: &str, extraction: &mut Extraction) {
    for caps in CODE_FENCE.captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let lines: Vec<String> = body
            .as_str()
            .trim()
            .lines()
            .filter(|line| line.chars().any(|c| c.is_ascii_digit()))
            .map(|line| line.to_string())
            .collect();
        if lines.is_empty() {
            continue;
        }
        extraction.blocks.push(DataBlock::numeric_code(
            lines,
            SourceSpan::new(whole.start(), whole.end(), whole.as_str()),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockKind;

    #[test]
    fn test_table_extraction() {
        let text = "\
| 年份 | 收入 |
| --- | --- |
| 2021 | 100 |
| 2022 | 150 |
";
        let extraction = extract(text);
        assert_eq!(extraction.blocks.len(), 1);
        assert!(extraction.unsupported.is_empty());

        let table = extraction.blocks[0].as_table().unwrap();
        assert_eq!(table.headers, vec!["年份", "收入"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.numeric_column(1), Some(vec![100.0, 150.0]));
        assert_eq!(extraction.blocks[0].span.text, text);
    }

    #[test]
    fn test_table_span_covers_source() {
        let text = "before\n\n| A | B |\n| - | - |\n| 1 | 2 |\n\nafter\n";
        let extraction = extract(text);
        assert_eq!(extraction.blocks.len(), 1);
        let span = &extraction.blocks[0].span;
        assert_eq!(&text[span.start..span.end], span.text);
        assert!(span.text.starts_with("| A | B |"));
        assert!(span.text.ends_with("| 1 | 2 |\n"));
    }

    #[test]
    fn test_ragged_rows_are_dropped() {
        let text = "\
| A | B |
| - | - |
| 1 | 2 | 3 |
| 4 | 5 |
";
        let extraction = extract(text);
        assert_eq!(extraction.blocks.len(), 1);
        let table = extraction.blocks[0].as_table().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0], vec!["4", "5"]);
    }

    #[test]
    fn test_header_and_separator_only_is_unsupported() {
        let text = "| A | B |\n| - | - |\n";
        let extraction = extract(text);
        assert!(extraction.blocks.is_empty());
        assert_eq!(extraction.unsupported.len(), 1);
        assert!(extraction.unsupported[0].starts_with("| A | B |"));
    }

    #[test]
    fn test_all_rows_ragged_is_unsupported() {
        let text = "| A | B |\n| - | - |\n| 1 |\n";
        let extraction = extract(text);
        assert!(extraction.blocks.is_empty());
        assert_eq!(extraction.unsupported.len(), 1);
    }

    #[test]
    fn test_plain_pipe_lines_without_separator_are_ignored() {
        let text = "| a | b |\n| c | d |\n";
        let extraction = extract(text);
        assert!(extraction.blocks.is_empty());
        assert!(extraction.unsupported.is_empty());
    }

    #[test]
    fn test_numeric_list_extraction() {
        let text = "intro\n- first 10\n- second 20\n- third 30\ntail\n";
        let extraction = extract(text);
        assert_eq!(extraction.blocks.len(), 1);
        assert_eq!(extraction.blocks[0].kind(), BlockKind::NumericList);
        match &extraction.blocks[0].payload {
            crate::model::BlockPayload::NumericList(items) => {
                assert_eq!(items, &["first 10", "second 20", "third 30"]);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_single_list_line_is_not_a_block() {
        let extraction = extract("- only 1 line\n");
        assert!(extraction.blocks.is_empty());
    }

    #[test]
    fn test_list_line_without_digit_breaks_the_run() {
        let text = "- one 1\n- two\n- three 3\n";
        let extraction = extract(text);
        // "two" has no digit, so neither neighbor pair forms a run
        assert!(extraction.blocks.is_empty());
    }

    #[test]
    fn test_numeric_code_extraction() {
        let text = "```python\nx = 1\ncomment\ny = 2\n```\n";
        let extraction = extract(text);
        assert_eq!(extraction.blocks.len(), 1);
        assert_eq!(extraction.blocks[0].kind(), BlockKind::NumericCode);
        match &extraction.blocks[0].payload {
            crate::model::BlockPayload::NumericCode(lines) => {
                assert_eq!(lines, &["x = 1", "y = 2"]);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
        // span includes the fences
        assert!(extraction.blocks[0].span.text.starts_with("```python"));
        assert!(extraction.blocks[0].span.text.ends_with("```"));
    }

    #[test]
    fn test_code_block_without_digits_is_skipped() {
        let extraction = extract("```\nno numbers here\n```\n");
        assert!(extraction.blocks.is_empty());
    }

    #[test]
    fn test_scan_order_tables_then_lists_then_code() {
        let text = concat!(
            "```\nv = 9\n```\n\n",
            "- item 1\n- item 2\n\n",
            "| A | B |\n| - | - |\n| 1 | 2 |\n| 3 | 4 |\n",
        );
        let extraction = extract(text);
        let kinds: Vec<BlockKind> = extraction.blocks.iter().map(|b| b.kind()).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Table, BlockKind::NumericList, BlockKind::NumericCode]
        );
    }

    #[test]
    fn test_table_inside_fence_is_matched_twice() {
        // The scans are independent; overlap handling happens at
        // substitution time, not here.
        let text = "```\n| A | B |\n| - | - |\n| 1 | 2 |\n| 3 | 4 |\n```\n";
        let extraction = extract(text);
        let kinds: Vec<BlockKind> = extraction.blocks.iter().map(|b| b.kind()).collect();
        assert_eq!(kinds, vec![BlockKind::Table, BlockKind::NumericCode]);
        assert!(extraction.blocks[1].span.overlaps(&extraction.blocks[0].span));
    }

    #[test]
    fn test_empty_input() {
        let extraction = extract("");
        assert!(extraction.blocks.is_empty());
        assert!(extraction.unsupported.is_empty());
    }
}
