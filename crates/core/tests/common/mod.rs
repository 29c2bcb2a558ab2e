//! In-memory PDF fixtures built with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// One shown string: `(x, y, text)` in PDF user space.
pub type Placed<'a> = (f64, f64, &'a str);

/// A Courier 10pt document whose pages show the given strings.
///
/// Pages with no strings get an empty content stream, which reads as a
/// page without any text layer.
pub fn text_pdf(pages: &[Vec<Placed<'_>>]) -> Vec<u8> {
    let contents: Vec<Vec<Operation>> = pages
        .iter()
        .map(|strings| {
            strings
                .iter()
                .flat_map(|(x, y, text)| {
                    [
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 10.into()]),
                        Operation::new(
                            "Td",
                            vec![Object::Real(*x as f32), Object::Real(*y as f32)],
                        ),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ]
                })
                .collect()
        })
        .collect();
    operations_pdf(&contents)
}

/// A document whose pages run the given operators, with Courier as `/F1`.
pub fn operations_pdf(pages: &[Vec<Operation>]) -> Vec<u8> {
    let streams: Vec<Vec<u8>> = pages
        .iter()
        .map(|operations| {
            Content {
                operations: operations.clone(),
            }
            .encode()
            .expect("encode content")
        })
        .collect();
    raw_content_pdf(&streams)
}

/// A document whose pages carry the given content stream bytes verbatim.
pub fn raw_content_pdf(pages: &[Vec<u8>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for data in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, data.clone()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}

/// A scanner-style page: one 2x2 gray inline image and no text.
pub fn inline_image_page() -> Vec<u8> {
    let mut data = b"q 100 0 0 100 0 0 cm\nBI /W 2 /H 2 /BPC 8 /CS /G ID ".to_vec();
    data.extend_from_slice(&[0x00, 0xFF, 0xFF, 0x00]);
    data.extend_from_slice(b"\nEI\nQ\n");
    data
}

/// Name/score table with a header row, on one page.
pub fn score_table_pdf() -> Vec<u8> {
    text_pdf(&[vec![
        (72.0, 700.0, "Name"),
        (300.0, 700.0, "Score"),
        (72.0, 680.0, "Alice"),
        (300.0, 680.0, "30"),
        (72.0, 660.0, "Bob"),
        (300.0, 660.0, "41"),
    ]])
}
