//! PDF document module - loading, native text geometry, and page classification.
//!
//! This module contains:
//! - `page` - page boxes and inherited attribute lookup
//! - `content` - content-stream walk that recovers positioned text lines
//! - `classify` - text-layer vs scanned decision for a document

pub mod classify;
pub mod content;
pub mod page;

use std::io::Write;
use std::path::{Path, PathBuf};

use lopdf::{Document, ObjectId};
use tracing::debug;

use crate::error::{Result, TableError};
use crate::table::TextLine;

// Re-export main types for convenience
pub use classify::{ClassifyParams, DEFAULT_MIN_CHARS, DEFAULT_PROBE_PAGES, classify, page_has_text};
pub use page::{DEFAULT_MEDIA_BOX, media_box};

/// Source of per-page native text geometry.
///
/// Page indices are 0-based; line coordinates are top-left page space.
pub trait TextGeometry {
    fn page_count(&self) -> usize;
    fn page_lines(&self, page_index: usize) -> Result<Vec<TextLine>>;
}

#[derive(Debug)]
enum PdfSource {
    File(PathBuf),
    Memory(Vec<u8>),
}

/// A loaded PDF document.
#[derive(Debug)]
pub struct PdfDocument {
    inner: Document,
    source: PdfSource,
    page_ids: Vec<ObjectId>,
}

impl PdfDocument {
    /// Load a PDF from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let inner = Document::load(path)?;
        Ok(Self::with_source(inner, PdfSource::File(path.to_path_buf())))
    }

    /// Load a PDF held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let inner = Document::load_mem(&bytes)?;
        Ok(Self::with_source(inner, PdfSource::Memory(bytes)))
    }

    fn with_source(inner: Document, source: PdfSource) -> Self {
        let page_ids: Vec<ObjectId> = inner.get_pages().into_values().collect();
        debug!(pages = page_ids.len(), "loaded PDF");
        Self {
            inner,
            source,
            page_ids,
        }
    }

    /// Path of the file this document was opened from.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            PdfSource::File(path) => Some(path),
            PdfSource::Memory(_) => None,
        }
    }

    /// Underlying lopdf document.
    pub fn lopdf(&self) -> &Document {
        &self.inner
    }

    fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(page_index)
            .copied()
            .ok_or(TableError::PageNotFound(page_index + 1))
    }

    /// Run `f` with a filesystem path holding this document.
    ///
    /// Documents loaded from memory are written to a temporary file that lives
    /// for the duration of the call.
    pub fn with_source_file<R>(&self, f: impl FnOnce(&Path) -> Result<R>) -> Result<R> {
        match &self.source {
            PdfSource::File(path) => f(path),
            PdfSource::Memory(bytes) => {
                let mut file = tempfile::Builder::new()
                    .prefix("tablift-")
                    .suffix(".pdf")
                    .tempfile()?;
                file.write_all(bytes)?;
                file.flush()?;
                f(file.path())
            }
        }
    }
}

impl TextGeometry for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_lines(&self, page_index: usize) -> Result<Vec<TextLine>> {
        let page_id = self.page_id(page_index)?;
        content::page_text_lines(&self.inner, page_id)
    }
}
