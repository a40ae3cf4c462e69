//! Diagnostic reporting for the extraction and render pipeline.
//!
//! The core stages are side-effect-free; everything they want to tell
//! the caller about (table-shaped text that could not be parsed, charts
//! that failed to render, spans skipped during substitution) goes
//! through an injected [`Reporter`] instead of ad hoc printing.

use crate::error::Error;
use crate::model::SourceSpan;

/// Receiver for pipeline diagnostics.
///
/// All methods have no-op defaults, so implementors only override what
/// they care about. Diagnostics never affect processing: a reported
/// condition has already been handled (block dropped, image skipped).
pub trait Reporter {
    /// Table-shaped text was found but could not be parsed into a
    /// table block (fewer than two usable rows, or no row matched the
    /// header's cell count).
    fn unsupported_table(&self, raw: &str) {
        let _ = raw;
    }

    /// A chart could not be rendered; the block degrades to its
    /// fallback table.
    fn render_failed(&self, context: &str, error: &Error) {
        let _ = (context, error);
    }

    /// A block was skipped during substitution because its span
    /// overlaps an earlier replacement.
    fn overlap_skipped(&self, span: &SourceSpan) {
        let _ = span;
    }

    /// A scan finished without detecting any numeric data block.
    fn nothing_detected(&self) {}
}

/// Reporter that discards all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Reporter that forwards diagnostics to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn unsupported_table(&self, raw: &str) {
        log::warn!(
            "unsupported table-shaped block ({} bytes), excluded from charting",
            raw.len()
        );
    }

    fn render_failed(&self, context: &str, error: &Error) {
        log::warn!("chart render failed for {context}: {error}");
    }

    fn overlap_skipped(&self, span: &SourceSpan) {
        log::warn!(
            "span {}..{} overlaps an earlier replacement, skipped",
            span.start,
            span.end
        );
    }

    fn nothing_detected(&self) {
        log::debug!("no numeric data blocks detected");
    }
}
