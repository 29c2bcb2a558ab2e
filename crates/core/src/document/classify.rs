//! Text-layer vs scanned classification.
//!
//! Probes the first few pages and calls the document a text-layer document
//! as soon as one of them carries a meaningful amount of native text.

use tracing::{debug, warn};

use super::TextGeometry;
use crate::error::Result;
use crate::table::{PageKind, TextLine};

/// Pages inspected before giving up on finding native text.
pub const DEFAULT_PROBE_PAGES: usize = 3;

/// A probed page needs strictly more characters than this to count.
pub const DEFAULT_MIN_CHARS: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassifyParams {
    pub probe_pages: usize,
    pub min_chars: usize,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            probe_pages: DEFAULT_PROBE_PAGES,
            min_chars: DEFAULT_MIN_CHARS,
        }
    }
}

/// True when the page's trimmed text has more than `min_chars` characters.
///
/// Fragments on a line are counted with one space between them.
pub fn page_has_text(lines: &[TextLine], min_chars: usize) -> bool {
    let text = lines
        .iter()
        .map(|line| {
            line.fragments
                .iter()
                .map(|f| f.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n");
    text.trim().chars().count() > min_chars
}

/// Decide how a document's pages should be read.
///
/// Documents without pages are reported as scanned. A probed page whose
/// text cannot be read counts as a page without native text.
pub fn classify<G: TextGeometry + ?Sized>(doc: &G, params: ClassifyParams) -> Result<PageKind> {
    let probe = doc.page_count().min(params.probe_pages);
    for page_index in 0..probe {
        let lines = match doc.page_lines(page_index) {
            Ok(lines) => lines,
            Err(err) => {
                warn!(
                    page = page_index + 1,
                    error = %err,
                    "unreadable text layer, probing on"
                );
                continue;
            }
        };
        if page_has_text(&lines, params.min_chars) {
            debug!(page = page_index + 1, "native text found");
            return Ok(PageKind::TextLayer);
        }
    }
    debug!(probed = probe, "no native text in probed pages");
    Ok(PageKind::Scanned)
}
