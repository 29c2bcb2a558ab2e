//! Error types for tablift.
//!
//! Row grouping and column splitting never fail; everything here belongs to
//! the collaborators around them (PDF loading, rendering, OCR, output).

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for table extraction.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("page {0} not found")]
    PageNotFound(usize),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to run {tool} ({path}): {source}")]
    ToolSpawn {
        tool: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("malformed OCR output at line {line}: {msg}")]
    OcrOutput { line: usize, msg: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

/// Convenience Result type alias for TableError.
pub type Result<T> = std::result::Result<T, TableError>;
