//! High-level table extraction API.
//!
//! Provides the main public API for rebuilding tables from PDFs:
//! - `extract_tables()` - Rebuild the tables of a loaded document
//! - `extract_tables_from_path()` - Open a file and rebuild its tables
//! - `extract_tables_with()` - Same, with caller-supplied OCR collaborators

use std::path::{Path, PathBuf};

use tracing::info;

use crate::document::{ClassifyParams, PdfDocument, TextGeometry, classify};
use crate::error::{Result, TableError};
use crate::ocr::{
    DEFAULT_BINARIZE_THRESHOLD, DEFAULT_DPI, OcrEngine, PageRenderer, Pdftoppm, Tesseract,
    binarize,
};
use crate::table::{
    DEFAULT_BUCKET_HEIGHT, DEFAULT_ROW_TOLERANCE, DocumentTable, PageKind, RowGrouping,
    extract_ocr_page, extract_text_layer_page,
};

/// Which reader to use for a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Classify the document first.
    #[default]
    Auto,
    /// Always read the native text layer.
    TextLayer,
    /// Always render and OCR.
    Ocr,
}

impl std::str::FromStr for ExtractionMode {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "text" | "text-layer" | "text_layer" => Ok(Self::TextLayer),
            "ocr" => Ok(Self::Ocr),
            other => Err(TableError::InvalidOption(format!(
                "unknown extraction mode {other:?}"
            ))),
        }
    }
}

/// Options for table extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub mode: ExtractionMode,

    /// Pages inspected by the classifier.
    pub probe_pages: usize,

    /// A probed page needs more trimmed characters than this to count as text.
    pub min_chars: usize,

    /// Chained row tolerance for text-layer lines, in points.
    pub row_tolerance: f64,

    /// Rendering resolution for OCR.
    pub dpi: u32,

    /// Binarization threshold applied before OCR.
    pub binarize_threshold: u8,

    /// Row bucket height for OCR words, in pixels.
    pub bucket_height: f64,

    pub tesseract_path: PathBuf,
    pub tesseract_lang: String,

    /// Tesseract page segmentation mode.
    pub tesseract_psm: u8,

    /// Tesseract engine mode.
    pub tesseract_oem: u8,

    pub pdftoppm_path: PathBuf,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Auto,
            probe_pages: crate::document::DEFAULT_PROBE_PAGES,
            min_chars: crate::document::DEFAULT_MIN_CHARS,
            row_tolerance: DEFAULT_ROW_TOLERANCE,
            dpi: DEFAULT_DPI,
            binarize_threshold: DEFAULT_BINARIZE_THRESHOLD,
            bucket_height: DEFAULT_BUCKET_HEIGHT,
            tesseract_path: PathBuf::from("tesseract"),
            tesseract_lang: "eng".to_string(),
            tesseract_psm: 6,
            tesseract_oem: 3,
            pdftoppm_path: PathBuf::from("pdftoppm"),
        }
    }
}

impl ExtractOptions {
    /// Reject values the reconstruction cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.row_tolerance.is_finite() || self.row_tolerance < 0.0 {
            return Err(TableError::InvalidOption(format!(
                "row tolerance must be a non-negative number, got {}",
                self.row_tolerance
            )));
        }
        if !self.bucket_height.is_finite() || self.bucket_height <= 0.0 {
            return Err(TableError::InvalidOption(format!(
                "bucket height must be positive, got {}",
                self.bucket_height
            )));
        }
        if self.dpi == 0 {
            return Err(TableError::InvalidOption("dpi must be positive".into()));
        }
        if self.tesseract_lang.trim().is_empty() {
            return Err(TableError::InvalidOption(
                "tesseract language must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn classify_params(&self) -> ClassifyParams {
        ClassifyParams {
            probe_pages: self.probe_pages,
            min_chars: self.min_chars,
        }
    }

    pub fn text_grouping(&self) -> RowGrouping {
        RowGrouping::Chained {
            tolerance: self.row_tolerance,
        }
    }

    pub fn ocr_grouping(&self) -> RowGrouping {
        RowGrouping::Bucketed {
            height: self.bucket_height,
        }
    }

    pub fn tesseract(&self) -> Tesseract {
        Tesseract::new(&self.tesseract_path)
            .lang(self.tesseract_lang.clone())
            .psm(self.tesseract_psm)
            .oem(self.tesseract_oem)
    }

    pub fn renderer(&self) -> Pdftoppm {
        Pdftoppm::new(&self.pdftoppm_path)
    }
}

/// How `doc` will be read under `options`.
pub fn resolve_kind<G: TextGeometry + ?Sized>(doc: &G, options: &ExtractOptions) -> Result<PageKind> {
    let kind = match options.mode {
        ExtractionMode::Auto => classify(doc, options.classify_params())?,
        ExtractionMode::TextLayer => PageKind::TextLayer,
        ExtractionMode::Ocr => PageKind::Scanned,
    };
    info!(?kind, mode = ?options.mode, pages = doc.page_count(), "document classified");
    Ok(kind)
}

/// Rebuild every page from native text geometry.
pub fn extract_text_layer<G: TextGeometry + ?Sized>(
    doc: &G,
    grouping: RowGrouping,
) -> Result<DocumentTable> {
    let mut table = DocumentTable::new(PageKind::TextLayer);
    for page_index in 0..doc.page_count() {
        let page_number = page_index + 1;
        info!(page = page_number, "parsing page");
        let lines = doc.page_lines(page_index)?;
        table.push_page(extract_text_layer_page(page_number, lines, grouping));
    }
    Ok(table)
}

/// Render, binarize and OCR pages `0..page_count` of the PDF at `source`.
pub fn extract_scanned<R, E>(
    source: &Path,
    page_count: usize,
    renderer: &R,
    engine: &E,
    options: &ExtractOptions,
) -> Result<DocumentTable>
where
    R: PageRenderer + ?Sized,
    E: OcrEngine + ?Sized,
{
    let grouping = options.ocr_grouping();
    let mut table = DocumentTable::new(PageKind::Scanned);
    for page_index in 0..page_count {
        let page_number = page_index + 1;
        info!(page = page_number, "OCR processing page");
        let image = renderer.render_page(source, page_index, options.dpi)?;
        let prepared = binarize(&image, options.binarize_threshold);
        let words = engine.recognize_words(&prepared)?;
        table.push_page(extract_ocr_page(page_number, words, grouping));
    }
    Ok(table)
}

/// Rebuild the tables of `doc` with caller-supplied OCR collaborators.
pub fn extract_tables_with<R, E>(
    doc: &PdfDocument,
    options: &ExtractOptions,
    renderer: &R,
    engine: &E,
) -> Result<DocumentTable>
where
    R: PageRenderer + ?Sized,
    E: OcrEngine + ?Sized,
{
    options.validate()?;
    let table = match resolve_kind(doc, options)? {
        PageKind::TextLayer => extract_text_layer(doc, options.text_grouping())?,
        PageKind::Scanned => doc.with_source_file(|source| {
            extract_scanned(source, doc.page_count(), renderer, engine, options)
        })?,
    };
    info!(
        kind = ?table.kind,
        pages = table.pages.len(),
        rows = table.row_count(),
        "tables rebuilt"
    );
    Ok(table)
}

/// Rebuild the tables of `doc`.
///
/// # Example
/// ```ignore
/// use tablift_core::document::PdfDocument;
/// use tablift_core::high_level::{extract_tables, ExtractOptions};
///
/// let doc = PdfDocument::open("report.pdf")?;
/// let table = extract_tables(&doc, &ExtractOptions::default())?;
/// ```
pub fn extract_tables(doc: &PdfDocument, options: &ExtractOptions) -> Result<DocumentTable> {
    extract_tables_with(doc, options, &options.renderer(), &options.tesseract())
}

/// Open the PDF at `path` and rebuild its tables.
pub fn extract_tables_from_path(
    path: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<DocumentTable> {
    let doc = PdfDocument::open(path)?;
    extract_tables(&doc, options)
}

/// Load a PDF from memory and rebuild its tables.
pub fn extract_tables_from_bytes(bytes: Vec<u8>, options: &ExtractOptions) -> Result<DocumentTable> {
    let doc = PdfDocument::from_bytes(bytes)?;
    extract_tables(&doc, options)
}
