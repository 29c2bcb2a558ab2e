//! Builder pattern for table extraction.
//!
//! Provides a fluent API for configuring and executing extraction.
//!
//! # Example
//! ```ignore
//! use tablift_core::api::TableExtractorBuilder;
//!
//! let table = TableExtractorBuilder::new("scan.pdf")
//!     .ocr()
//!     .dpi(400)
//!     .tesseract_lang("deu")
//!     .extract()?;
//! ```

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::table::DocumentTable;

use super::high_level::{ExtractOptions, ExtractionMode, extract_tables_from_path};

/// A builder for configuring table extraction.
///
/// Wraps [`ExtractOptions`] and [`extract_tables_from_path`].
#[derive(Debug, Clone)]
pub struct TableExtractorBuilder {
    source: PathBuf,
    options: ExtractOptions,
}

impl TableExtractorBuilder {
    /// Creates a builder for the PDF at `source`.
    pub fn new(source: impl AsRef<Path>) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            options: ExtractOptions::default(),
        }
    }

    pub fn mode(mut self, mode: ExtractionMode) -> Self {
        self.options.mode = mode;
        self
    }

    /// Skip classification and read the native text layer.
    pub fn text_layer(self) -> Self {
        self.mode(ExtractionMode::TextLayer)
    }

    /// Skip classification and OCR every page.
    pub fn ocr(self) -> Self {
        self.mode(ExtractionMode::Ocr)
    }

    /// Sets how many leading pages the classifier inspects.
    ///
    /// # Example
    /// ```ignore
    /// let builder = TableExtractorBuilder::new("mixed.pdf")
    ///     .probe_pages(5);
    /// ```
    pub fn probe_pages(mut self, pages: usize) -> Self {
        self.options.probe_pages = pages;
        self
    }

    pub fn min_chars(mut self, chars: usize) -> Self {
        self.options.min_chars = chars;
        self
    }

    /// Sets the chained row tolerance for text-layer lines, in points.
    pub fn row_tolerance(mut self, tolerance: f64) -> Self {
        self.options.row_tolerance = tolerance;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.options.dpi = dpi;
        self
    }

    pub fn binarize_threshold(mut self, threshold: u8) -> Self {
        self.options.binarize_threshold = threshold;
        self
    }

    /// Sets the OCR row bucket height, in pixels.
    pub fn bucket_height(mut self, height: f64) -> Self {
        self.options.bucket_height = height;
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.tesseract_path = path.into();
        self
    }

    /// Sets the tesseract language, e.g. `"eng"` or `"fin+eng"`.
    pub fn tesseract_lang(mut self, lang: impl Into<String>) -> Self {
        self.options.tesseract_lang = lang.into();
        self
    }

    pub fn tesseract_psm(mut self, psm: u8) -> Self {
        self.options.tesseract_psm = psm;
        self
    }

    pub fn tesseract_oem(mut self, oem: u8) -> Self {
        self.options.tesseract_oem = oem;
        self
    }

    pub fn pdftoppm_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.pdftoppm_path = path.into();
        self
    }

    /// Returns the source path.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Returns the options built so far.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Consumes the builder and returns its options.
    pub fn into_options(self) -> ExtractOptions {
        self.options
    }

    /// Opens the source and rebuilds its tables.
    pub fn extract(&self) -> Result<DocumentTable> {
        extract_tables_from_path(&self.source, &self.options)
    }
}
