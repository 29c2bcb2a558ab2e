//! Text-layer extraction: native line geometry to rows of columns.

use tracing::debug;

use super::clustering::{RowGrouping, sort_left_to_right};
use super::columns::split_columns;
use super::types::{Fragment, PageTable, TextLine};

/// Rebuild the rows of one text-layer page.
///
/// Lines are grouped with `grouping`, each row's fragments are ordered
/// left-to-right, blank fragments are dropped, and the remaining texts go
/// through the column splitter. Rows left without text are discarded.
pub fn extract_text_layer_rows(lines: Vec<TextLine>, grouping: RowGrouping) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for line_group in grouping.group(lines) {
        let mut fragments: Vec<Fragment> = line_group
            .into_iter()
            .flat_map(|line| line.fragments)
            .collect();
        sort_left_to_right(&mut fragments);

        let pieces: Vec<&str> = fragments
            .iter()
            .map(|f| f.text.as_str())
            .filter(|text| !text.trim().is_empty())
            .collect();
        if pieces.is_empty() {
            continue;
        }
        rows.push(split_columns(&pieces));
    }
    debug!(rows = rows.len(), "text layer rows");
    rows
}

/// Rebuild one text-layer page as a [`PageTable`].
pub fn extract_text_layer_page(
    page_number: usize,
    lines: Vec<TextLine>,
    grouping: RowGrouping,
) -> PageTable {
    PageTable::new(page_number, extract_text_layer_rows(lines, grouping))
}
