//! OCR collaborators for scanned documents.
//!
//! Pages are rasterized by a [`PageRenderer`], binarized, and handed to an
//! [`OcrEngine`] that reports word boxes in pixel space. The default
//! implementations shell out to `pdftoppm` and `tesseract`.

mod render;
mod tesseract;

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

use crate::error::{Result, TableError};
use crate::table::OcrWord;

pub use render::Pdftoppm;
pub use tesseract::{Tesseract, parse_tsv};

/// Rendering resolution used for OCR.
pub const DEFAULT_DPI: u32 = 300;

/// Gray levels below this become black, the rest white.
pub const DEFAULT_BINARIZE_THRESHOLD: u8 = 200;

/// Rasterizes one page of a PDF file.
pub trait PageRenderer {
    /// `page_index` is 0-based.
    fn render_page(&self, source: &Path, page_index: usize, dpi: u32) -> Result<DynamicImage>;
}

/// Recognizes words in a prepared page image.
pub trait OcrEngine {
    fn recognize_words(&self, image: &GrayImage) -> Result<Vec<OcrWord>>;
}

/// Grayscale then hard threshold: `< threshold` to 0, otherwise 255.
pub fn binarize(image: &DynamicImage, threshold: u8) -> GrayImage {
    let mut gray = image.to_luma8();
    for Luma([value]) in gray.pixels_mut() {
        *value = if *value < threshold { 0 } else { 255 };
    }
    gray
}

/// Run an external tool to completion, turning spawn failures and non-zero
/// exits into [`TableError`]s.
pub(crate) fn run_tool<I, S>(tool: &'static str, binary: &Path, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(binary)
        .args(args)
        .output()
        .map_err(|source| TableError::ToolSpawn {
            tool,
            path: binary.to_path_buf(),
            source,
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(TableError::ToolFailed {
            tool,
            status: output.status.to_string(),
            stderr,
        });
    }
    debug!(tool, stdout_bytes = output.stdout.len(), "tool finished");
    Ok(output)
}
