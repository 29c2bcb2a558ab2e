//! Page rasterization through poppler's `pdftoppm`.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::debug;

use super::{PageRenderer, run_tool};
use crate::error::{Result, TableError};

/// Renders pages with the `pdftoppm` command line tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdftoppm {
    binary: PathBuf,
}

impl Default for Pdftoppm {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl Pdftoppm {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Arguments rendering page `page_number` (1-based) of `source` to
    /// `<prefix>.png`.
    pub(crate) fn args(source: &Path, page_number: usize, dpi: u32, prefix: &Path) -> Vec<String> {
        let page = page_number.to_string();
        vec![
            "-png".to_string(),
            "-r".to_string(),
            dpi.to_string(),
            "-f".to_string(),
            page.clone(),
            "-l".to_string(),
            page,
            "-singlefile".to_string(),
            source.to_string_lossy().into_owned(),
            prefix.to_string_lossy().into_owned(),
        ]
    }
}

impl PageRenderer for Pdftoppm {
    fn render_page(&self, source: &Path, page_index: usize, dpi: u32) -> Result<DynamicImage> {
        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("page");
        let page_number = page_index + 1;
        run_tool(
            "pdftoppm",
            &self.binary,
            Self::args(source, page_number, dpi, &prefix),
        )?;

        let png = prefix.with_extension("png");
        if !png.exists() {
            return Err(TableError::PageNotFound(page_number));
        }
        let image = image::open(&png)?;
        debug!(
            page = page_number,
            width = image.width(),
            height = image.height(),
            "rendered page"
        );
        Ok(image)
    }
}
