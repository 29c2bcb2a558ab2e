//! Column splitting for a single row.
//!
//! Rules run from most to least reliable and the first one that yields two
//! or more columns wins. A row that nothing can split comes back as one
//! column, so the output is never empty.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());
static NUMERIC_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+(?:[.,]\d+)?\b").unwrap());

const COLUMN_DELIMITERS: [char; 2] = ['|', '\t'];

/// Minimum number of characters between two numeric anchors for the text in
/// between to count as a label column.
const ANCHOR_LABEL_GAP: usize = 3;

/// The rule that produced a row's columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitRule {
    /// The row already came as several source spans.
    MultiSpan,
    /// Runs of two or more whitespace characters.
    WhitespaceRun,
    /// Literal `|` or tab.
    Delimiter,
    /// Labels and numbers pulled apart around number tokens.
    NumericAnchor,
    /// No rule applied; the whole text is one column.
    Fallback,
}

/// Columns of one row and the rule that produced them.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSplit {
    pub rule: SplitRule,
    pub columns: Vec<String>,
}

type TextRule = fn(&str) -> Option<Vec<String>>;

const TEXT_RULES: [(SplitRule, TextRule); 3] = [
    (SplitRule::WhitespaceRun, split_whitespace_runs as TextRule),
    (SplitRule::Delimiter, split_delimiters as TextRule),
    (SplitRule::NumericAnchor, split_numeric_anchors as TextRule),
];

/// Split the pieces of one row into columns.
pub fn split_row<S: AsRef<str>>(pieces: &[S]) -> ColumnSplit {
    if pieces.len() > 1 {
        return ColumnSplit {
            rule: SplitRule::MultiSpan,
            columns: pieces
                .iter()
                .map(|p| p.as_ref().trim().to_string())
                .collect(),
        };
    }

    let text = join_pieces(pieces);
    for (rule, apply) in TEXT_RULES {
        if let Some(columns) = apply(&text) {
            debug!(?rule, columns = columns.len(), "split row");
            return ColumnSplit { rule, columns };
        }
    }

    ColumnSplit {
        rule: SplitRule::Fallback,
        columns: vec![text.trim().to_string()],
    }
}

/// Shorthand for `split_row(pieces).columns`.
pub fn split_columns<S: AsRef<str>>(pieces: &[S]) -> Vec<String> {
    split_row(pieces).columns
}

fn join_pieces<S: AsRef<str>>(pieces: &[S]) -> String {
    pieces
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keeps non-empty trimmed segments; `None` unless there are at least two.
fn at_least_two<'a>(segments: impl Iterator<Item = &'a str>) -> Option<Vec<String>> {
    let columns: Vec<String> = segments
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (columns.len() >= 2).then_some(columns)
}

fn split_whitespace_runs(text: &str) -> Option<Vec<String>> {
    at_least_two(WHITESPACE_RUN.split(text))
}

fn split_delimiters(text: &str) -> Option<Vec<String>> {
    at_least_two(text.split(COLUMN_DELIMITERS))
}

fn split_numeric_anchors(text: &str) -> Option<Vec<String>> {
    let anchors: Vec<_> = NUMERIC_TOKEN.find_iter(text).collect();
    if anchors.len() < 2 {
        return None;
    }

    let mut columns = Vec::with_capacity(anchors.len() * 2 + 1);
    let mut last_end = 0;
    for anchor in anchors {
        let label = &text[last_end..anchor.start()];
        if label.chars().count() > ANCHOR_LABEL_GAP && !label.trim().is_empty() {
            columns.push(label.trim().to_string());
        }
        columns.push(anchor.as_str().to_string());
        last_end = anchor.end();
    }
    let tail = text[last_end..].trim();
    if !tail.is_empty() {
        columns.push(tail.to_string());
    }

    (columns.len() >= 2).then_some(columns)
}
