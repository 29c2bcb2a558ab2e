//! Text geometry from page content streams.
//!
//! Walks the operators of one page, tracking the text and graphics state
//! needed to place each shown string, and returns line records in top-left
//! page space. Glyph advances come from simple-font `Widths`; other fonts
//! use a flat half-em estimate.

use std::collections::{BTreeMap, HashMap};

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::trace;

use super::page::{media_box, number, resolve};
use crate::error::Result;
use crate::table::{BBox, Fragment, TextLine};

/// Advance used for glyphs without a known width, in 1/1000 em.
const DEFAULT_GLYPH_WIDTH: f64 = 500.0;
/// TJ adjustment (1/1000 em) past which a word space is inserted.
const TJ_SPACE_THRESHOLD: f64 = 200.0;
/// Share of the font size above the baseline.
const ASCENT: f64 = 0.8;
/// Share of the font size below the baseline.
const DESCENT: f64 = 0.2;
/// Baselines closer than this (points) belong to the same line.
const BASELINE_EPSILON: f64 = 1.0;
/// Space advance (1/1000 em) for fonts whose space glyph has no width.
const DEFAULT_SPACE_WIDTH: f64 = 250.0;
/// Gaps (points) at or below this are treated as touching.
const TOUCH_EPSILON: f64 = 0.1;

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Matrix([f64; 6]);

impl Matrix {
    pub(crate) const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let mut m = [0.0; 6];
        for (slot, op) in m.iter_mut().zip(operands) {
            *slot = number(op)?;
        }
        Some(Matrix(m))
    }

    fn translate(tx: f64, ty: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`.
    pub(crate) fn multiply(&self, other: &Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    pub(crate) fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    /// Length of the transformed unit y vector.
    fn vertical_scale(&self) -> f64 {
        let [_, _, c, d, _, _] = self.0;
        (c * c + d * d).sqrt()
    }
}

/// Per-font advance widths.
#[derive(Debug, Clone)]
struct FontMetrics {
    first_char: i64,
    widths: Vec<f64>,
    two_byte: bool,
}

impl FontMetrics {
    fn from_dict(doc: &Document, font: &Dictionary) -> Self {
        let two_byte = font
            .get(b"Subtype")
            .and_then(Object::as_name)
            .map(|name| name == b"Type0")
            .unwrap_or(false);
        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(number)
            .unwrap_or(0.0) as i64;
        let widths = font
            .get(b"Widths")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .map(|items| {
                items
                    .iter()
                    .map(|w| {
                        resolve(doc, w)
                            .and_then(number)
                            .unwrap_or(DEFAULT_GLYPH_WIDTH)
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            first_char,
            widths,
            two_byte,
        }
    }

    fn fallback() -> Self {
        Self {
            first_char: 0,
            widths: Vec::new(),
            two_byte: false,
        }
    }

    /// Advance of the space glyph in 1/1000 em.
    fn space_width(&self) -> f64 {
        if self.two_byte {
            return DEFAULT_GLYPH_WIDTH;
        }
        self.glyph_widths(b" ")
            .first()
            .map(|(_, w)| *w)
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_SPACE_WIDTH)
    }

    /// Glyph codes of `bytes` with their widths in 1/1000 em.
    fn glyph_widths(&self, bytes: &[u8]) -> Vec<(u32, f64)> {
        if self.two_byte {
            return bytes
                .chunks(2)
                .map(|c| {
                    let code = c.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32);
                    (code, DEFAULT_GLYPH_WIDTH)
                })
                .collect();
        }
        bytes
            .iter()
            .map(|b| {
                let idx = *b as i64 - self.first_char;
                let width = usize::try_from(idx)
                    .ok()
                    .and_then(|i| self.widths.get(i).copied())
                    .unwrap_or(DEFAULT_GLYPH_WIDTH);
                (*b as u32, width)
            })
            .collect()
    }
}

/// Text state carried across operators.
#[derive(Debug, Clone)]
struct TextState {
    font: Vec<u8>,
    size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    leading: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: Vec::new(),
            size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
        }
    }
}

/// A shown string placed in device space (PDF user space, y up).
#[derive(Debug, Clone)]
struct PlacedSpan {
    text: String,
    x0: f64,
    x1: f64,
    baseline: f64,
    size: f64,
    font: Vec<u8>,
    /// Width of one space in device units.
    space_width: f64,
}

struct PageWalker<'a> {
    doc: &'a Document,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    metrics: HashMap<Vec<u8>, FontMetrics>,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    state: TextState,
    in_text: bool,
    spans: Vec<PlacedSpan>,
}

impl<'a> PageWalker<'a> {
    fn new(doc: &'a Document, page_id: ObjectId) -> Self {
        Self {
            doc,
            fonts: doc.get_page_fonts(page_id).unwrap_or_default(),
            metrics: HashMap::new(),
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            state: TextState::default(),
            in_text: false,
            spans: Vec::new(),
        }
    }

    fn run(mut self, content: &Content) -> Vec<PlacedSpan> {
        for op in &content.operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "q" => self.ctm_stack.push(self.ctm),
                "Q" => {
                    if let Some(ctm) = self.ctm_stack.pop() {
                        self.ctm = ctm;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.ctm = m.multiply(&self.ctm);
                    }
                }
                "BT" => {
                    self.in_text = true;
                    self.text_matrix = Matrix::IDENTITY;
                    self.line_matrix = Matrix::IDENTITY;
                }
                "ET" => self.in_text = false,
                "Tf" => {
                    if let [name, size, ..] = operands {
                        if let Ok(name) = name.as_name() {
                            self.state.font = name.to_vec();
                        }
                        if let Some(size) = number(size) {
                            self.state.size = size;
                        }
                    }
                }
                "Tc" => self.set_state(operands, |s, v| s.char_spacing = v),
                "Tw" => self.set_state(operands, |s, v| s.word_spacing = v),
                "Tz" => self.set_state(operands, |s, v| s.horizontal_scale = v / 100.0),
                "TL" => self.set_state(operands, |s, v| s.leading = v),
                "Td" => {
                    if let Some((tx, ty)) = pair(operands) {
                        self.move_line(tx, ty);
                    }
                }
                "TD" => {
                    if let Some((tx, ty)) = pair(operands) {
                        self.state.leading = -ty;
                        self.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.text_matrix = m;
                        self.line_matrix = m;
                    }
                }
                "T*" => self.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(&[ShowItem::Text(bytes)]);
                    }
                }
                "TJ" => {
                    if let Some(Ok(items)) = operands.first().map(Object::as_array) {
                        let items: Vec<ShowItem<'_>> = items
                            .iter()
                            .filter_map(|item| match item {
                                Object::String(bytes, _) => Some(ShowItem::Text(bytes)),
                                other => number(other).map(ShowItem::Adjust),
                            })
                            .collect();
                        self.show(&items);
                    }
                }
                "'" => {
                    self.next_line();
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(&[ShowItem::Text(bytes)]);
                    }
                }
                "\"" => {
                    if let [aw, ac, Object::String(bytes, _), ..] = operands {
                        self.state.word_spacing = number(aw).unwrap_or(self.state.word_spacing);
                        self.state.char_spacing = number(ac).unwrap_or(self.state.char_spacing);
                        self.next_line();
                        self.show(&[ShowItem::Text(bytes)]);
                    }
                }
                _ => {}
            }
        }
        self.spans
    }

    fn set_state(&mut self, operands: &[Object], apply: impl FnOnce(&mut TextState, f64)) {
        if let Some(v) = operands.first().and_then(number) {
            apply(&mut self.state, v);
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translate(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.state.leading);
    }

    fn font_metrics(&mut self) -> FontMetrics {
        let key = self.state.font.clone();
        if let Some(metrics) = self.metrics.get(&key) {
            return metrics.clone();
        }
        let metrics = match self.fonts.get(&key) {
            Some(font) => FontMetrics::from_dict(self.doc, font),
            None => FontMetrics::fallback(),
        };
        self.metrics.insert(key, metrics.clone());
        metrics
    }

    fn decode(&self, bytes: &[u8]) -> String {
        if let Some(font) = self.fonts.get(&self.state.font) {
            if let Ok(encoding) = font.get_font_encoding(self.doc) {
                if let Ok(text) = Document::decode_text(&encoding, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn advance(&mut self, tx: f64) {
        self.text_matrix = Matrix::translate(tx, 0.0).multiply(&self.text_matrix);
    }

    fn show(&mut self, items: &[ShowItem<'_>]) {
        if !self.in_text {
            return;
        }
        let metrics = self.font_metrics();
        let start = self.text_matrix.multiply(&self.ctm);
        let (x0, baseline) = start.apply(0.0, 0.0);
        let size = self.state.size * start.vertical_scale();
        let space_width =
            metrics.space_width() / 1000.0 * size * self.state.horizontal_scale;

        let mut text = String::new();
        for item in items {
            match *item {
                ShowItem::Text(bytes) => {
                    text.push_str(&self.decode(bytes));
                    let mut tx = 0.0;
                    for (code, width) in metrics.glyph_widths(bytes) {
                        tx += width / 1000.0 * self.state.size + self.state.char_spacing;
                        if code == 32 && !metrics.two_byte {
                            tx += self.state.word_spacing;
                        }
                    }
                    self.advance(tx * self.state.horizontal_scale);
                }
                ShowItem::Adjust(n) => {
                    if -n > TJ_SPACE_THRESHOLD && !text.is_empty() && !text.ends_with(' ') {
                        text.push(' ');
                    }
                    let tx = -n / 1000.0 * self.state.size * self.state.horizontal_scale;
                    self.advance(tx);
                }
            }
        }

        if text.trim().is_empty() {
            return;
        }
        let (x1, _) = self.text_matrix.multiply(&self.ctm).apply(0.0, 0.0);
        trace!(text = %text, x0, baseline, "placed span");
        self.spans.push(PlacedSpan {
            text,
            x0: x0.min(x1),
            x1: x0.max(x1),
            baseline,
            size,
            font: self.state.font.clone(),
            space_width,
        });
    }
}

#[derive(Clone, Copy)]
enum ShowItem<'b> {
    Text(&'b [u8]),
    Adjust(f64),
}

fn pair(operands: &[Object]) -> Option<(f64, f64)> {
    match operands {
        [a, b, ..] => Some((number(a)?, number(b)?)),
        _ => None,
    }
}

/// Decoding used when the font gives no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// True when `next` continues the text run of `prev` on the same line:
/// same font and size, starting less than one space past `prev`'s end.
fn continues_run(prev: &PlacedSpan, next: &PlacedSpan) -> bool {
    prev.font == next.font
        && (prev.size - next.size).abs() <= f64::EPSILON
        && next.x0 - prev.x1 < prev.space_width
}

/// Convert placed spans into line records in top-left page space.
///
/// Consecutive spans whose baselines agree within [`BASELINE_EPSILON`] and
/// that keep moving rightwards share a line. Within a line, spans that
/// continue one text run are merged into a single fragment, with a space
/// inserted across a visible gap.
fn spans_to_lines(spans: Vec<PlacedSpan>, page_box: [f64; 4]) -> Vec<TextLine> {
    let [llx, _, _, ury] = page_box;
    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<Fragment> = Vec::new();
    let mut last: Option<PlacedSpan> = None;

    for span in spans {
        let same_line = last.as_ref().is_some_and(|prev| {
            (span.baseline - prev.baseline).abs() <= BASELINE_EPSILON && span.x0 >= prev.x0
        });
        if !same_line && !current.is_empty() {
            lines.push(TextLine::from_fragments(std::mem::take(&mut current)));
        }

        let baseline_top = ury - span.baseline;
        let bbox = BBox::new(
            span.x0 - llx,
            baseline_top - span.size * ASCENT,
            span.x1 - llx,
            baseline_top + span.size * DESCENT,
        );
        let joined = same_line && last.as_ref().is_some_and(|prev| continues_run(prev, &span));
        match current.last_mut() {
            Some(fragment) if joined => {
                let gap = last.as_ref().map_or(0.0, |prev| span.x0 - prev.x1);
                if gap > TOUCH_EPSILON
                    && !fragment.text.ends_with(char::is_whitespace)
                    && !span.text.starts_with(char::is_whitespace)
                {
                    fragment.text.push(' ');
                }
                fragment.text.push_str(&span.text);
                fragment.bbox = BBox::new(
                    fragment.bbox.x0.min(bbox.x0),
                    fragment.bbox.top.min(bbox.top),
                    fragment.bbox.x1.max(bbox.x1),
                    fragment.bbox.bottom.max(bbox.bottom),
                );
            }
            _ => current.push(Fragment::new(span.text.clone(), bbox)),
        }
        last = Some(span);
    }
    if !current.is_empty() {
        lines.push(TextLine::from_fragments(current));
    }
    lines
}

/// Native text lines of one page.
pub fn page_text_lines(doc: &Document, page_id: ObjectId) -> Result<Vec<TextLine>> {
    let data = doc.get_page_content(page_id)?;
    let content = Content::decode(&data)?;
    let spans = PageWalker::new(doc, page_id).run(&content);
    Ok(spans_to_lines(spans, media_box(doc, page_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x0: f64, baseline: f64) -> PlacedSpan {
        PlacedSpan {
            text: text.to_string(),
            x0,
            x1: x0 + 20.0,
            baseline,
            size: 10.0,
            font: b"F1".to_vec(),
            space_width: 5.0,
        }
    }

    #[test]
    fn matrix_multiply_composes_translations() {
        let m = Matrix::translate(10.0, 5.0).multiply(&Matrix::translate(1.0, 2.0));
        assert_eq!(m.apply(0.0, 0.0), (11.0, 7.0));
    }

    #[test]
    fn matrix_scale_then_translate() {
        let scale = Matrix([2.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
        let m = Matrix::translate(3.0, 4.0).multiply(&scale);
        assert_eq!(m.apply(0.0, 0.0), (6.0, 8.0));
        assert_eq!(m.vertical_scale(), 2.0);
    }

    #[test]
    fn simple_font_widths_use_first_char_offset() {
        let metrics = FontMetrics {
            first_char: 65,
            widths: vec![600.0, 700.0],
            two_byte: false,
        };
        assert_eq!(
            metrics.glyph_widths(b"ABZ"),
            vec![(65, 600.0), (66, 700.0), (90, DEFAULT_GLYPH_WIDTH)]
        );
    }

    #[test]
    fn two_byte_fonts_count_code_pairs() {
        let metrics = FontMetrics {
            first_char: 0,
            widths: Vec::new(),
            two_byte: true,
        };
        assert_eq!(metrics.glyph_widths(&[0, 1, 0, 2]).len(), 2);
    }

    #[test]
    fn simple_decoding_handles_utf16_and_latin1() {
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41]), "A");
        assert_eq!(decode_text_simple(&[0x63, 0x61, 0x66, 0xE9]), "café");
    }

    #[test]
    fn spans_on_one_baseline_share_a_line() {
        let spans = vec![
            span("Alice", 72.0, 700.0),
            span("30", 300.0, 700.5),
            span("Bob", 72.0, 680.0),
        ];
        let lines = spans_to_lines(spans, [0.0, 0.0, 612.0, 792.0]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].fragments.len(), 2);
        assert_eq!(lines[0].text(), "Alice30");
        // Baseline 700 with size 10 and page top 792.
        assert_eq!(lines[0].fragments[0].bbox.top, 84.0);
        assert_eq!(lines[1].fragments[0].bbox.bottom, 114.0);
    }

    #[test]
    fn touching_spans_in_one_font_merge() {
        let mut second = span("report", 92.0, 700.0);
        second.x1 = 122.0;
        let lines = spans_to_lines(
            vec![span("Quarterly ", 72.0, 700.0), second],
            [0.0, 0.0, 612.0, 792.0],
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].fragments.len(), 1);
        assert_eq!(lines[0].fragments[0].text, "Quarterly report");
        assert_eq!(lines[0].fragments[0].bbox.x0, 72.0);
        assert_eq!(lines[0].fragments[0].bbox.x1, 122.0);
    }

    #[test]
    fn small_gap_inserts_a_space() {
        let lines = spans_to_lines(
            vec![span("Total", 72.0, 700.0), span("Qty", 95.0, 700.0)],
            [0.0, 0.0, 612.0, 792.0],
        );
        assert_eq!(lines[0].fragments.len(), 1);
        assert_eq!(lines[0].fragments[0].text, "Total Qty");
    }

    #[test]
    fn font_change_or_wide_gap_keeps_spans_apart() {
        let mut bold = span("Qty", 92.0, 700.0);
        bold.font = b"F2".to_vec();
        let lines = spans_to_lines(
            vec![
                span("Total", 72.0, 700.0),
                bold,
                span("12", 118.0, 700.0),
            ],
            [0.0, 0.0, 612.0, 792.0],
        );
        let texts: Vec<&str> = lines[0].fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["Total", "Qty", "12"]);
    }

    #[test]
    fn space_width_reads_the_space_glyph() {
        let metrics = FontMetrics {
            first_char: 32,
            widths: vec![278.0],
            two_byte: false,
        };
        assert_eq!(metrics.space_width(), 278.0);
        assert_eq!(FontMetrics::fallback().space_width(), DEFAULT_GLYPH_WIDTH);
    }
}
