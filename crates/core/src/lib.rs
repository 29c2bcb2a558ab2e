//! tablift - rebuild tables from native-text and scanned PDFs.

pub mod api;
pub mod converter;
pub mod document;
pub mod error;
pub mod ocr;
pub mod table;

// Re-export high_level at the crate root
pub use api::high_level;
pub use error::{Result, TableError};
