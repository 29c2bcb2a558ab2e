//! Page attributes that may be inherited through the page tree.

use lopdf::{Dictionary, Document, Object, ObjectId};

/// US Letter, used when neither the page nor its ancestors carry a MediaBox.
pub const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Read a PDF number operand as f64.
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Follow one level of indirection.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn parse_rect(doc: &Document, obj: &Object) -> Option<[f64; 4]> {
    let items = resolve(doc, obj)?.as_array().ok()?;
    if items.len() != 4 {
        return None;
    }
    let mut rect = [0.0; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        *slot = number(resolve(doc, item)?)?;
    }
    // Normalize so that (x0, y0) is the lower-left corner.
    Some([
        rect[0].min(rect[2]),
        rect[1].min(rect[3]),
        rect[0].max(rect[2]),
        rect[1].max(rect[3]),
    ])
}

/// Look up `key` on the page dictionary or the nearest ancestor that has it.
pub(crate) fn inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current: Option<&Dictionary> = doc.get_dictionary(page_id).ok();
    // Page trees are shallow; the bound guards against Parent cycles.
    for _ in 0..64 {
        let dict = current?;
        if let Ok(obj) = dict.get(key) {
            return Some(obj);
        }
        current = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .ok()
            .and_then(|id| doc.get_dictionary(id).ok());
    }
    None
}

/// MediaBox of a page as `[x0, y0, x1, y1]` in PDF user space.
pub fn media_box(doc: &Document, page_id: ObjectId) -> [f64; 4] {
    inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| parse_rect(doc, obj))
        .unwrap_or(DEFAULT_MEDIA_BOX)
}
