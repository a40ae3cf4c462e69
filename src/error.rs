//! Error types for the mdchart library.

use std::io;
use thiserror::Error;

/// Result type alias for mdchart operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during chart inference and rendering.
///
/// Extraction and classification never fail; only the render boundary
/// and the buffer-conversion surfaces produce errors, and a render
/// error for one block never aborts the rest of the batch.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A block's payload does not fit the chart shape it was asked to render.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// An explicit chart block carried a malformed or unsupported spec.
    #[error("Invalid chart spec: {0}")]
    ChartSpec(String),

    /// Error during chart image generation.
    #[error("Render error: {0}")]
    Render(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ChartSpec(err.to_string())
    }
}
