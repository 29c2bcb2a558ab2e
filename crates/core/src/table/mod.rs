//! Table reconstruction from positioned text.
//!
//! This module groups positioned fragments into rows and splits rows into
//! columns. It works on in-memory geometry only and has no failure paths.

mod clustering;
mod columns;
mod ocr;
mod text_layer;
mod types;

// Re-export public types
pub use types::{
    BBox, DEFAULT_BUCKET_HEIGHT, DEFAULT_ROW_TOLERANCE, DocumentTable, Fragment, OcrWord, PageKind,
    PageTable, Positioned, TextLine,
};

// Re-export public API functions
pub use clustering::{RowGrouping, bucket_key, group_bucketed, group_chained, sort_left_to_right};
pub use columns::{ColumnSplit, SplitRule, split_columns, split_row};
pub use ocr::{extract_ocr_page, extract_ocr_rows};
pub use text_layer::{extract_text_layer_page, extract_text_layer_rows};
