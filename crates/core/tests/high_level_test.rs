//! Tests for the high-level extraction API over real (synthesized) PDFs.
//!
//! - text-layer documents go through content-stream geometry
//! - scanned documents go through the renderer and OCR engine
//! - mode overrides and option validation

mod common;

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage};
use lopdf::Object;
use lopdf::content::Operation;
use tablift_core::document::{ClassifyParams, PdfDocument, TextGeometry, classify};
use tablift_core::high_level::{
    ExtractOptions, ExtractionMode, extract_tables, extract_tables_from_bytes,
    extract_tables_from_path, extract_tables_with,
};
use tablift_core::ocr::{OcrEngine, PageRenderer};
use tablift_core::table::{BBox, OcrWord, PageKind};
use tablift_core::{Result, TableError};

fn rows(table: &[Vec<String>]) -> Vec<Vec<&str>> {
    table
        .iter()
        .map(|r| r.iter().map(String::as_str).collect())
        .collect()
}

// ============================================================================
// Text layer
// ============================================================================

#[test]
fn test_text_layer_pdf_rebuilds_rows() {
    let table = extract_tables_from_bytes(common::score_table_pdf(), &ExtractOptions::default())
        .unwrap();
    assert_eq!(table.kind, PageKind::TextLayer);
    assert_eq!(table.pages.len(), 1);
    assert_eq!(table.pages[0].page_number, 1);
    assert_eq!(
        rows(&table.pages[0].rows),
        vec![
            vec!["Name", "Score"],
            vec!["Alice", "30"],
            vec!["Bob", "41"]
        ]
    );
}

#[test]
fn test_single_span_rows_use_split_cascade() {
    let pdf = common::text_pdf(&[vec![
        (72.0, 700.0, "Quarterly summary"),
        (72.0, 680.0, "Region    Units"),
        (72.0, 660.0, "North|120"),
        (72.0, 640.0, "TotalQty 12 Price 45.50"),
    ]]);
    let table = extract_tables_from_bytes(pdf, &ExtractOptions::default()).unwrap();
    assert_eq!(
        rows(&table.pages[0].rows),
        vec![
            vec!["Quarterly summary"],
            vec!["Region", "Units"],
            vec!["North", "120"],
            vec!["TotalQty", "12", "Price", "45.50"],
        ]
    );
}

#[test]
fn test_adjacent_show_operators_form_one_cell() {
    let pdf = common::operations_pdf(&[vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
        Operation::new("Td", vec![72.into(), 700.into()]),
        Operation::new("Tj", vec![Object::string_literal("Quarterly ")]),
        Operation::new("Tj", vec![Object::string_literal("report")]),
        Operation::new("ET", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
        Operation::new("Td", vec![300.into(), 700.into()]),
        Operation::new("Tj", vec![Object::string_literal("2024")]),
        Operation::new("ET", vec![]),
    ]]);
    let doc = PdfDocument::from_bytes(pdf).unwrap();
    let lines = doc.page_lines(0).unwrap();
    assert_eq!(lines[0].fragments.len(), 2);
    assert_eq!(lines[0].fragments[0].text, "Quarterly report");

    let table = extract_tables(&doc, &ExtractOptions::default()).unwrap();
    assert_eq!(
        rows(&table.pages[0].rows),
        vec![vec!["Quarterly report", "2024"]]
    );
}

#[test]
fn test_page_geometry_is_top_left() {
    let doc = PdfDocument::from_bytes(common::score_table_pdf()).unwrap();
    assert_eq!(doc.page_count(), 1);
    let lines = doc.page_lines(0).unwrap();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].top < lines[1].top);
    assert_eq!(lines[0].fragments.len(), 2);
    let name = &lines[0].fragments[0];
    assert_eq!(name.text, "Name");
    assert!((name.bbox.x0 - 72.0).abs() < 1e-3);
    // No Widths array, so four glyphs at the default half-em advance.
    assert!((name.bbox.width() - 20.0).abs() < 1e-3);
}

#[test]
fn test_pages_without_rows_are_dropped() {
    let pdf = common::text_pdf(&[
        vec![(72.0, 700.0, "Header text on page one")],
        vec![],
        vec![(72.0, 700.0, "Alice"), (300.0, 700.0, "30")],
    ]);
    let table = extract_tables_from_bytes(pdf, &ExtractOptions::default()).unwrap();
    let numbers: Vec<usize> = table.pages.iter().map(|p| p.page_number).collect();
    assert_eq!(numbers, vec![1, 3]);
}

#[test]
fn test_extract_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.pdf");
    std::fs::write(&path, common::score_table_pdf()).unwrap();
    let table = extract_tables_from_path(&path, &ExtractOptions::default()).unwrap();
    assert_eq!(table.row_count(), 3);
}

#[test]
fn test_malformed_pdf_is_an_error() {
    let err = extract_tables_from_bytes(b"not a pdf".to_vec(), &ExtractOptions::default())
        .unwrap_err();
    assert!(matches!(err, TableError::Pdf(_)));
}

#[test]
fn test_invalid_options_fail_before_reading() {
    let doc = PdfDocument::from_bytes(common::score_table_pdf()).unwrap();
    let options = ExtractOptions {
        bucket_height: -1.0,
        ..ExtractOptions::default()
    };
    assert!(matches!(
        extract_tables(&doc, &options),
        Err(TableError::InvalidOption(_))
    ));
}

// ============================================================================
// Scanned
// ============================================================================

struct RecordingRenderer {
    sources: RefCell<Vec<PathBuf>>,
}

impl PageRenderer for RecordingRenderer {
    fn render_page(&self, source: &Path, _page_index: usize, _dpi: u32) -> Result<DynamicImage> {
        assert!(source.exists(), "renderer needs a file on disk");
        self.sources.borrow_mut().push(source.to_path_buf());
        Ok(DynamicImage::ImageLuma8(GrayImage::new(8, 8)))
    }
}

struct FixedWords;

impl OcrEngine for FixedWords {
    fn recognize_words(&self, image: &GrayImage) -> Result<Vec<OcrWord>> {
        // The engine only ever sees binarized pixels.
        assert!(image.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        let word = |text: &str, left: f64, top: f64| OcrWord {
            text: text.to_string(),
            bbox: BBox::new(left, top, left + 50.0, top + 20.0),
            confidence: 88.0,
        };
        Ok(vec![
            word("Total", 40.0, 108.0),
            word("120", 400.0, 102.0),
            word("Item", 10.0, 100.0),
            word("Tax", 40.0, 150.0),
        ])
    }
}

#[test]
fn test_scanned_pdf_goes_through_ocr() {
    let pdf = common::text_pdf(&[vec![]]);
    let doc = PdfDocument::from_bytes(pdf).unwrap();
    let renderer = RecordingRenderer {
        sources: RefCell::new(Vec::new()),
    };
    let table =
        extract_tables_with(&doc, &ExtractOptions::default(), &renderer, &FixedWords).unwrap();
    assert_eq!(table.kind, PageKind::Scanned);
    assert_eq!(
        rows(&table.pages[0].rows),
        vec![vec!["Item", "Total", "120"], vec!["Tax"]]
    );
    // The spilled temp file is gone once extraction returns.
    let sources = renderer.sources.borrow();
    assert_eq!(sources.len(), 1);
    assert!(!sources[0].exists());
}

#[test]
fn test_inline_image_page_is_classified_scanned() {
    let doc = PdfDocument::from_bytes(common::raw_content_pdf(&[common::inline_image_page()]))
        .unwrap();
    assert_eq!(
        classify(&doc, ClassifyParams::default()).unwrap(),
        PageKind::Scanned
    );

    let renderer = RecordingRenderer {
        sources: RefCell::new(Vec::new()),
    };
    let table =
        extract_tables_with(&doc, &ExtractOptions::default(), &renderer, &FixedWords).unwrap();
    assert_eq!(table.kind, PageKind::Scanned);
    assert_eq!(renderer.sources.borrow().len(), 1);
}

#[test]
fn test_ocr_mode_overrides_text_layer() {
    let doc = PdfDocument::from_bytes(common::score_table_pdf()).unwrap();
    let renderer = RecordingRenderer {
        sources: RefCell::new(Vec::new()),
    };
    let options = ExtractOptions {
        mode: ExtractionMode::Ocr,
        ..ExtractOptions::default()
    };
    let table = extract_tables_with(&doc, &options, &renderer, &FixedWords).unwrap();
    assert_eq!(table.kind, PageKind::Scanned);
}

#[test]
fn test_missing_ocr_binary_is_reported() {
    let doc = PdfDocument::from_bytes(common::text_pdf(&[vec![]])).unwrap();
    let options = ExtractOptions {
        pdftoppm_path: PathBuf::from("/nonexistent/tablift/pdftoppm"),
        ..ExtractOptions::default()
    };
    let err = extract_tables(&doc, &options).unwrap_err();
    assert!(matches!(err, TableError::ToolSpawn { tool: "pdftoppm", .. }));
}
