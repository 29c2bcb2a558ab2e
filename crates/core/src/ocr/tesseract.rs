//! Word boxes from the `tesseract` command line tool.

use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use image::{GrayImage, ImageFormat};
use tracing::debug;

use super::{OcrEngine, run_tool};
use crate::error::{Result, TableError};
use crate::table::{BBox, OcrWord};

/// TSV `level` value of word rows.
const WORD_LEVEL: i64 = 5;

/// Tesseract invocation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tesseract {
    binary: PathBuf,
    lang: String,
    psm: u8,
    oem: u8,
}

impl Default for Tesseract {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            lang: "eng".to_string(),
            psm: 6,
            oem: 3,
        }
    }
}

impl Tesseract {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::default()
        }
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Page segmentation mode (`--psm`).
    pub fn psm(mut self, psm: u8) -> Self {
        self.psm = psm;
        self
    }

    /// OCR engine mode (`--oem`).
    pub fn oem(mut self, oem: u8) -> Self {
        self.oem = oem;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub(crate) fn args(&self, image: &Path) -> Vec<String> {
        vec![
            image.to_string_lossy().into_owned(),
            "stdout".to_string(),
            "-l".to_string(),
            self.lang.clone(),
            "--psm".to_string(),
            self.psm.to_string(),
            "--oem".to_string(),
            self.oem.to_string(),
            "tsv".to_string(),
        ]
    }
}

impl OcrEngine for Tesseract {
    fn recognize_words(&self, image: &GrayImage) -> Result<Vec<OcrWord>> {
        let mut file = tempfile::Builder::new()
            .prefix("tablift-ocr-")
            .suffix(".png")
            .tempfile()?;
        image.write_to(&mut file, ImageFormat::Png)?;
        file.flush()?;

        let output = run_tool("tesseract", &self.binary, self.args(file.path()))?;
        let words = parse_tsv(&String::from_utf8_lossy(&output.stdout))?;
        debug!(words = words.len(), "tesseract words");
        Ok(words)
    }
}

struct Columns {
    level: usize,
    left: usize,
    top: usize,
    width: usize,
    height: usize,
    conf: usize,
    text: usize,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| TableError::OcrOutput {
                    line: 1,
                    msg: format!("missing column {name:?}"),
                })
        };
        Ok(Self {
            level: find("level")?,
            left: find("left")?,
            top: find("top")?,
            width: find("width")?,
            height: find("height")?,
            conf: find("conf")?,
            text: find("text")?,
        })
    }
}

/// Parse tesseract's TSV output into word boxes.
///
/// Only word-level rows are kept; rows whose text is blank are dropped.
/// An empty input yields no words.
pub fn parse_tsv(tsv: &str) -> Result<Vec<OcrWord>> {
    if tsv.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(tsv.as_bytes());
    let columns = Columns::from_header(reader.headers()?)?;

    let mut words = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = idx + 2;
        let field = |col: usize| record.get(col).unwrap_or("").trim();
        let int = |col: usize| -> Result<i64> {
            field(col).parse::<i64>().map_err(|_| TableError::OcrOutput {
                line,
                msg: format!("expected integer, got {:?}", field(col)),
            })
        };

        if int(columns.level)? != WORD_LEVEL {
            continue;
        }
        let text = record.get(columns.text).unwrap_or("");
        if text.trim().is_empty() {
            continue;
        }
        let (left, top) = (int(columns.left)? as f64, int(columns.top)? as f64);
        let (width, height) = (int(columns.width)? as f64, int(columns.height)? as f64);
        let confidence = field(columns.conf).parse::<f32>().unwrap_or(-1.0);
        words.push(OcrWord {
            text: text.to_string(),
            bbox: BBox::new(left, top, left + width, top + height),
            confidence,
        });
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn keeps_only_non_blank_words() {
        let tsv = format!(
            "{HEADER}\n\
             1\t1\t0\t0\t0\t0\t0\t0\t2550\t3300\t-1\t\n\
             4\t1\t1\t1\t1\t0\t100\t200\t400\t30\t-1\t\n\
             5\t1\t1\t1\t1\t1\t100\t200\t120\t30\t96.5\tAlice\n\
             5\t1\t1\t1\t1\t2\t400\t204\t40\t30\t91\t30\n\
             5\t1\t1\t1\t1\t3\t500\t204\t40\t30\t95\t \n"
        );
        let words = parse_tsv(&tsv).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "Alice");
        assert_eq!(words[0].bbox, BBox::new(100.0, 200.0, 220.0, 230.0));
        assert_eq!(words[0].confidence, 96.5);
        assert_eq!(words[1].bbox.top, 204.0);
    }

    #[test]
    fn empty_output_has_no_words() {
        assert!(parse_tsv("").unwrap().is_empty());
        assert!(parse_tsv(HEADER).unwrap().is_empty());
    }

    #[test]
    fn missing_column_is_reported() {
        let err = parse_tsv("level\tleft\ttop\n5\t1\t2\n").unwrap_err();
        assert!(matches!(err, TableError::OcrOutput { line: 1, .. }));
    }

    #[test]
    fn bad_number_reports_line() {
        let tsv = format!("{HEADER}\n5\t1\t1\t1\t1\t1\tx\t200\t120\t30\t96\tAlice\n");
        let err = parse_tsv(&tsv).unwrap_err();
        assert!(matches!(err, TableError::OcrOutput { line: 2, .. }));
    }

    #[test]
    fn args_carry_lang_psm_and_oem() {
        let engine = Tesseract::default().lang("deu").psm(4);
        assert_eq!(
            engine.args(Path::new("p.png")),
            vec!["p.png", "stdout", "-l", "deu", "--psm", "4", "--oem", "3", "tsv"]
        );
    }
}
