//! Output sinks for reconstructed tables.
//!
//! A document becomes a workbook of named sheets, one per page that kept at
//! least one row. Writers:
//! - `CsvWorkbook` - one CSV file per sheet inside a directory
//! - `JsonWorkbook` - all sheets in a single JSON file

mod csv;
mod json;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::table::DocumentTable;

pub use self::csv::CsvWorkbook;
pub use self::json::JsonWorkbook;

/// Sheet written when a document produced no rows at all.
pub const PLACEHOLDER_SHEET: &str = "No_Data";

/// Single cell of the placeholder sheet.
pub const PLACEHOLDER_TEXT: &str = "No table data detected in this PDF";

/// How strictly a sheet is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SheetStyle {
    /// Rectangular: every row padded to the widest row.
    Formatted,
    /// Rows as-is, control characters removed.
    Plain,
}

/// A named grid of cells.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// The sheet for the 1-based `page_number`.
    pub fn for_page(page_number: usize, rows: Vec<Vec<String>>) -> Self {
        Self::new(format!("Page_{page_number}"), rows)
    }

    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_SHEET, vec![vec![PLACEHOLDER_TEXT.to_string()]])
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Rows as they should be written in `style`.
    pub fn styled_rows(&self, style: SheetStyle) -> Vec<Vec<String>> {
        match style {
            SheetStyle::Formatted => {
                let width = self.width();
                self.rows
                    .iter()
                    .map(|row| {
                        let mut row = row.clone();
                        row.resize(width, String::new());
                        row
                    })
                    .collect()
            }
            SheetStyle::Plain => self
                .rows
                .iter()
                .map(|row| row.iter().map(|cell| sanitize_cell(cell)).collect())
                .collect(),
        }
    }
}

/// Destination for the sheets of one document.
pub trait SheetWriter {
    /// Write one sheet. A failed call may be retried with another style.
    fn write_sheet(&mut self, sheet: &Sheet, style: SheetStyle) -> Result<()>;

    /// Flush everything written so far.
    fn finish(&mut self) -> Result<()>;
}

/// What [`write_document`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub sheets_written: usize,
    /// Sheets that needed the plain retry.
    pub plain_retries: usize,
    /// Names of sheets that failed both attempts.
    pub skipped: Vec<String>,
    pub placeholder: bool,
}

/// Trim every cell and drop rows that end up empty.
pub fn clean_rows(rows: &[Vec<String>]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.trim().to_string()).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect()
}

/// One sheet per page that keeps at least one row after cleaning.
pub fn document_sheets(doc: &DocumentTable) -> Vec<Sheet> {
    doc.pages
        .iter()
        .filter_map(|page| {
            let rows = clean_rows(&page.rows);
            (!rows.is_empty()).then(|| Sheet::for_page(page.page_number, rows))
        })
        .collect()
}

/// Remove control characters; line breaks and tabs become spaces.
pub fn sanitize_cell(cell: &str) -> String {
    cell.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Write `doc` through `writer`.
///
/// Each sheet is tried formatted first and once more plain. A sheet that
/// fails both times is logged and skipped. When nothing was written the
/// placeholder sheet is written instead.
pub fn write_document<W: SheetWriter + ?Sized>(
    doc: &DocumentTable,
    writer: &mut W,
) -> Result<WriteSummary> {
    let mut summary = WriteSummary::default();

    for sheet in document_sheets(doc) {
        match writer.write_sheet(&sheet, SheetStyle::Formatted) {
            Ok(()) => {
                debug!(sheet = %sheet.name, rows = sheet.rows.len(), "sheet written");
                summary.sheets_written += 1;
            }
            Err(err) => {
                warn!(sheet = %sheet.name, error = %err, "retrying sheet without formatting");
                summary.plain_retries += 1;
                match writer.write_sheet(&sheet, SheetStyle::Plain) {
                    Ok(()) => summary.sheets_written += 1,
                    Err(err) => {
                        error!(sheet = %sheet.name, error = %err, "failed to write sheet");
                        summary.skipped.push(sheet.name);
                    }
                }
            }
        }
    }

    if summary.sheets_written == 0 {
        writer.write_sheet(&Sheet::placeholder(), SheetStyle::Plain)?;
        summary.placeholder = true;
    }
    writer.finish()?;
    info!(
        sheets = summary.sheets_written,
        skipped = summary.skipped.len(),
        placeholder = summary.placeholder,
        "document written"
    );
    Ok(summary)
}
