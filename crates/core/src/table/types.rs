//! Positioned-text types shared by the text-layer and OCR paths.

use serde::Serialize;

/// Chained row tolerance for text-layer lines, in points.
pub const DEFAULT_ROW_TOLERANCE: f64 = 5.0;

/// Bucket height for OCR words, in pixels.
pub const DEFAULT_BUCKET_HEIGHT: f64 = 10.0;

/// Axis-aligned box in top-left page space (y grows downwards).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Anything that can be placed on a page for row grouping.
pub trait Positioned {
    /// Vertical coordinate used to group rows.
    fn top(&self) -> f64;
    /// Horizontal coordinate used to order a row left-to-right.
    fn left(&self) -> f64;
}

/// One run of text from the native text layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub bbox: BBox,
}

impl Fragment {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

impl Positioned for Fragment {
    fn top(&self) -> f64 {
        self.bbox.top
    }
    fn left(&self) -> f64 {
        self.bbox.x0
    }
}

/// A line record as the text-geometry provider reports it: a vertical span
/// plus the fragments laid out on it.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub top: f64,
    pub bottom: f64,
    pub fragments: Vec<Fragment>,
}

impl TextLine {
    /// Builds a line whose vertical span covers all of `fragments`.
    pub fn from_fragments(fragments: Vec<Fragment>) -> Self {
        if fragments.is_empty() {
            return Self {
                top: 0.0,
                bottom: 0.0,
                fragments,
            };
        }
        let top = fragments
            .iter()
            .map(|f| f.bbox.top)
            .fold(f64::INFINITY, f64::min);
        let bottom = fragments
            .iter()
            .map(|f| f.bbox.bottom)
            .fold(f64::NEG_INFINITY, f64::max);
        Self {
            top,
            bottom,
            fragments,
        }
    }

    /// Concatenated text of the line, in fragment order.
    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }
}

impl Positioned for TextLine {
    fn top(&self) -> f64 {
        self.top
    }
    fn left(&self) -> f64 {
        self.fragments
            .iter()
            .map(|f| f.bbox.x0)
            .fold(f64::INFINITY, f64::min)
    }
}

/// One word recognized by the OCR engine.
#[derive(Clone, Debug, PartialEq)]
pub struct OcrWord {
    pub text: String,
    pub bbox: BBox,
    /// Engine confidence in 0..=100, or negative when the engine gave none.
    /// Carried through but not used for grouping.
    pub confidence: f32,
}

impl Positioned for OcrWord {
    fn top(&self) -> f64 {
        self.bbox.top
    }
    fn left(&self) -> f64 {
        self.bbox.x0
    }
}

/// How a document's pages were read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// Native text layer with positioned spans.
    TextLayer,
    /// Image-only pages that went through OCR.
    Scanned,
}

/// Reconstructed rows of one page. Each row holds at least one column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageTable {
    /// 1-based page number in the source document.
    pub page_number: usize,
    pub rows: Vec<Vec<String>>,
}

impl PageTable {
    pub fn new(page_number: usize, rows: Vec<Vec<String>>) -> Self {
        Self { page_number, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reconstructed tables of a whole document.
///
/// Built once per input document and handed to a sink; pages without rows
/// never make it in.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentTable {
    pub kind: PageKind,
    pub pages: Vec<PageTable>,
}

impl DocumentTable {
    pub fn new(kind: PageKind) -> Self {
        Self {
            kind,
            pages: Vec::new(),
        }
    }

    /// Appends `page` unless it has no rows.
    pub fn push_page(&mut self, page: PageTable) {
        if !page.is_empty() {
            self.pages.push(page);
        }
    }

    /// True when no page produced a row.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.pages.iter().map(|p| p.rows.len()).sum()
    }
}
