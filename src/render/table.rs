//! HTML fallback tables.
//!
//! Every block gets a guaranteed-renderable tabular representation,
//! whether or not its chart image succeeded. Cell text is shown
//! verbatim (HTML-escaped).

use crate::model::{BlockPayload, DataBlock};

const TABLE_OPEN: &str = "<div style=\"overflow-x:auto;\"><table border=\"1\" cellpadding=\"4\" \
                          cellspacing=\"0\" style=\"border-collapse:collapse;width:auto;\">\n";
const TABLE_CLOSE: &str = "</table></div>";

/// Render a block's fallback table.
///
/// The header row reflects the block's shape: the original column
/// headers for tables, `Index`/`Content` for numeric lists, and
/// `Content` for numeric code.
pub fn fallback_table(block: &DataBlock) -> String {
    let mut html = String::from(TABLE_OPEN);
    match &block.payload {
        BlockPayload::Table(table) => {
            push_row(&mut html, "th", table.headers.iter().map(String::as_str));
            for row in &table.rows {
                push_row(&mut html, "td", row.iter().map(String::as_str));
            }
        }
        BlockPayload::NumericList(items) => {
            push_row(&mut html, "th", ["Index", "Content"].into_iter());
            for (i, item) in items.iter().enumerate() {
                let index = (i + 1).to_string();
                push_row(&mut html, "td", [index.as_str(), item.as_str()].into_iter());
            }
        }
        BlockPayload::NumericCode(lines) => {
            push_row(&mut html, "th", ["Content"].into_iter());
            for line in lines {
                push_row(&mut html, "td", [line.as_str()].into_iter());
            }
        }
    }
    html.push_str(TABLE_CLOSE);
    html
}

fn push_row<'a>(html: &mut String, tag: &str, cells: impl Iterator<Item = &'a str>) {
    html.push_str("  <tr>");
    for cell in cells {
        html.push_str(&format!("<{tag}>{}</{tag}>", escape_html(cell)));
    }
    html.push_str("</tr>\n");
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
