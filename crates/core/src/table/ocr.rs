//! OCR extraction: word boxes to rows, one column per word.

use tracing::debug;

use super::clustering::{RowGrouping, sort_left_to_right};
use super::types::{OcrWord, PageTable};

/// Rebuild the rows of one OCR page.
///
/// Blank words are dropped, the rest are grouped with `grouping` and ordered
/// left-to-right. Every word becomes its own column; the column splitter is
/// not consulted because OCR output is already segmented per word.
pub fn extract_ocr_rows(words: Vec<OcrWord>, grouping: RowGrouping) -> Vec<Vec<String>> {
    let words: Vec<OcrWord> = words
        .into_iter()
        .filter(|w| !w.text.trim().is_empty())
        .collect();

    let rows: Vec<Vec<String>> = grouping
        .group(words)
        .into_iter()
        .map(|mut row| {
            sort_left_to_right(&mut row);
            row.into_iter().map(|w| w.text.trim().to_string()).collect()
        })
        .collect();
    debug!(rows = rows.len(), "ocr rows");
    rows
}

/// Rebuild one OCR page as a [`PageTable`].
pub fn extract_ocr_page(page_number: usize, words: Vec<OcrWord>, grouping: RowGrouping) -> PageTable {
    PageTable::new(page_number, extract_ocr_rows(words, grouping))
}
