//! CSV workbook: a directory holding one `<sheet>.csv` per sheet.

use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::info;

use super::{Sheet, SheetStyle, SheetWriter};
use crate::error::Result;

#[derive(Debug)]
pub struct CsvWorkbook {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl CsvWorkbook {
    /// Workbook stored in `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
        }
    }

    /// Workbook for the document `stem` under `out_dir`.
    pub fn for_document(out_dir: &Path, stem: &str) -> Self {
        Self::new(out_dir.join(stem))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in write order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl SheetWriter for CsvWorkbook {
    fn write_sheet(&mut self, sheet: &Sheet, style: SheetStyle) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.csv", sheet.name));
        let mut writer = WriterBuilder::new()
            .flexible(style == SheetStyle::Plain)
            .from_path(&path)?;
        for row in sheet.styled_rows(style) {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        info!(path = %path.display(), rows = sheet.rows.len(), "wrote sheet");
        if !self.files.contains(&path) {
            self.files.push(path);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
