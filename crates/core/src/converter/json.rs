//! JSON workbook: every sheet of a document in one file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use super::{Sheet, SheetStyle, SheetWriter};
use crate::error::Result;

/// Collects sheets and writes them as a JSON array of
/// `{"name": ..., "rows": [[...]]}` objects on [`SheetWriter::finish`].
#[derive(Debug)]
pub struct JsonWorkbook {
    path: PathBuf,
    sheets: Vec<Sheet>,
}

impl JsonWorkbook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheets: Vec::new(),
        }
    }

    /// Workbook `<out_dir>/<stem>.json`.
    pub fn for_document(out_dir: &Path, stem: &str) -> Self {
        Self::new(out_dir.join(format!("{stem}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }
}

impl SheetWriter for JsonWorkbook {
    fn write_sheet(&mut self, sheet: &Sheet, style: SheetStyle) -> Result<()> {
        self.sheets
            .push(Sheet::new(sheet.name.clone(), sheet.styled_rows(style)));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut out, &self.sheets)?;
        writeln!(out)?;
        out.flush()?;
        info!(path = %self.path.display(), sheets = self.sheets.len(), "wrote workbook");
        Ok(())
    }
}
