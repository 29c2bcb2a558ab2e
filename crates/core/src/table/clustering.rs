//! Row grouping.
//!
//! Turns the unordered items of one page into rows ordered top-to-bottom.
//! Every input item lands in exactly one row.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use super::types::{DEFAULT_BUCKET_HEIGHT, DEFAULT_ROW_TOLERANCE, Positioned};

/// Policy used to decide which items share a row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RowGrouping {
    /// Sort by top; an item joins the open row when its top is within
    /// `tolerance` of the previous item's top. The comparison is chained, so
    /// a row may span more than one tolerance overall.
    Chained { tolerance: f64 },
    /// Items whose `floor(top / height)` is equal form one row; rows come out
    /// in ascending bucket order.
    Bucketed { height: f64 },
}

impl RowGrouping {
    /// Policy for native text-layer lines.
    pub fn text_layer() -> Self {
        RowGrouping::Chained {
            tolerance: DEFAULT_ROW_TOLERANCE,
        }
    }

    /// Policy for OCR word boxes.
    pub fn ocr() -> Self {
        RowGrouping::Bucketed {
            height: DEFAULT_BUCKET_HEIGHT,
        }
    }

    /// Partition `items` into rows.
    pub fn group<T: Positioned>(&self, items: Vec<T>) -> Vec<Vec<T>> {
        match *self {
            RowGrouping::Chained { tolerance } => group_chained(items, tolerance),
            RowGrouping::Bucketed { height } => group_bucketed(items, height),
        }
    }
}

/// Group items by chained top-coordinate tolerance.
pub fn group_chained<T: Positioned>(mut items: Vec<T>, tolerance: f64) -> Vec<Vec<T>> {
    items.sort_by_key(|item| OrderedFloat(item.top()));

    let mut rows: Vec<Vec<T>> = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut last_top: Option<f64> = None;
    for item in items {
        let top = item.top();
        if last_top.is_some_and(|prev| (top - prev).abs() > tolerance) {
            rows.push(std::mem::take(&mut current));
        }
        current.push(item);
        last_top = Some(top);
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

/// Bucket index of a top coordinate.
pub fn bucket_key(top: f64, height: f64) -> i64 {
    (top / height).floor() as i64
}

/// Group items into fixed-height vertical buckets. Input order is kept
/// within a bucket.
pub fn group_bucketed<T: Positioned>(items: Vec<T>, height: f64) -> Vec<Vec<T>> {
    debug_assert!(height > 0.0, "bucket height must be positive");
    let mut buckets: BTreeMap<i64, Vec<T>> = BTreeMap::new();
    for item in items {
        buckets
            .entry(bucket_key(item.top(), height))
            .or_default()
            .push(item);
    }
    buckets.into_values().collect()
}

/// Stable left-to-right ordering of one row.
pub fn sort_left_to_right<T: Positioned>(row: &mut [T]) {
    row.sort_by_key(|item| OrderedFloat(item.left()));
}
