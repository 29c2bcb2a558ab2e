//! High-level API module for table extraction.
//!
//! # Example
//!
//! ```ignore
//! use tablift_core::api::{extract_tables_from_path, ExtractOptions};
//!
//! let table = extract_tables_from_path("report.pdf", &ExtractOptions::default())?;
//! for page in &table.pages {
//!     println!("page {}: {} rows", page.page_number, page.rows.len());
//! }
//! ```

pub mod builder;
pub mod high_level;

// Re-export for convenience
pub use builder::TableExtractorBuilder;
pub use high_level::{
    ExtractOptions, ExtractionMode, extract_scanned, extract_tables, extract_tables_from_bytes,
    extract_tables_from_path, extract_tables_with, extract_text_layer, resolve_kind,
};
