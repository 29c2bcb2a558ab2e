//! pdf2tables - Rebuild tables from PDF files
//!
//! A command line tool that reads native-text or scanned PDFs and writes
//! their tables as one CSV file per page or one JSON workbook per document.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tablift_core::converter::{CsvWorkbook, JsonWorkbook, SheetWriter, WriteSummary, write_document};
use tablift_core::high_level::{ExtractOptions, ExtractionMode, extract_tables_from_path};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Output format for rebuilt tables.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
enum OutputFormat {
    /// One CSV file per page in `<output-dir>/<name>/` (default)
    #[default]
    Csv,
    /// One JSON file per document in `<output-dir>/`
    Json,
}

/// How pages are read.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
enum Mode {
    /// Detect text-layer vs scanned per document (default)
    #[default]
    Auto,
    /// Always use the native text layer
    Text,
    /// Always render and OCR
    Ocr,
}

impl From<Mode> for ExtractionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Auto => ExtractionMode::Auto,
            Mode::Text => ExtractionMode::TextLayer,
            Mode::Ocr => ExtractionMode::Ocr,
        }
    }
}

/// A command line tool that rebuilds tables from native-text and scanned
/// PDFs.
#[derive(Parser, Debug)]
#[command(name = "pdf2tables")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PDF files, or directories to scan for *.pdf
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory where output is written
    #[arg(short = 'o', long = "output-dir", default_value = "output")]
    output_dir: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Page reading mode
    #[arg(short = 'm', long, value_enum, default_value = "auto")]
    mode: Mode,

    /// Number of documents processed in parallel
    #[arg(short = 'j', long, default_value = "1")]
    jobs: usize,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    // === Classifier options ===
    /// Leading pages inspected for native text
    #[arg(long = "probe-pages", default_value = "3")]
    probe_pages: usize,

    /// A probed page needs more than this many characters to count as text
    #[arg(long = "min-chars", default_value = "10")]
    min_chars: usize,

    // === Text-layer options ===
    /// Chained row tolerance in points
    #[arg(long = "row-tolerance", default_value = "5.0")]
    row_tolerance: f64,

    // === OCR options ===
    /// Rendering resolution
    #[arg(long, default_value = "300")]
    dpi: u32,

    /// Binarization threshold (0-255)
    #[arg(long, default_value = "200")]
    threshold: u8,

    /// Row bucket height in pixels
    #[arg(long = "bucket-height", default_value = "10.0")]
    bucket_height: f64,

    /// Path to the tesseract binary
    #[arg(long, default_value = "tesseract")]
    tesseract: PathBuf,

    /// Tesseract language(s), e.g. "eng" or "fin+eng"
    #[arg(short = 'l', long, default_value = "eng")]
    lang: String,

    /// Tesseract page segmentation mode
    #[arg(long, default_value = "6")]
    psm: u8,

    /// Tesseract OCR engine mode
    #[arg(long, default_value = "3")]
    oem: u8,

    /// Path to the pdftoppm binary
    #[arg(long, default_value = "pdftoppm")]
    pdftoppm: PathBuf,
}

fn build_options(args: &Args) -> ExtractOptions {
    ExtractOptions {
        mode: args.mode.into(),
        probe_pages: args.probe_pages,
        min_chars: args.min_chars,
        row_tolerance: args.row_tolerance,
        dpi: args.dpi,
        binarize_threshold: args.threshold,
        bucket_height: args.bucket_height,
        tesseract_path: args.tesseract.clone(),
        tesseract_lang: args.lang.clone(),
        tesseract_psm: args.psm,
        tesseract_oem: args.oem,
        pdftoppm_path: args.pdftoppm.clone(),
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Expand directories into their `*.pdf` entries, sorted by name.
///
/// Files named on the command line are kept as given, whatever their
/// extension.
fn discover_pdfs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)
                .with_context(|| format!("failed to read directory {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_pdf(path))
                .collect();
            found.sort();
            if found.is_empty() {
                warn!(dir = %input.display(), "no PDF files found");
            }
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn document_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

fn process_document(
    path: &Path,
    output_dir: &Path,
    format: OutputFormat,
    options: &ExtractOptions,
) -> Result<WriteSummary> {
    if !path.exists() {
        bail!("file not found: {}", path.display());
    }
    info!(file = %path.display(), "processing");
    let table = extract_tables_from_path(path, options)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let stem = document_stem(path);
    let mut writer: Box<dyn SheetWriter> = match format {
        OutputFormat::Csv => Box::new(CsvWorkbook::for_document(output_dir, &stem)),
        OutputFormat::Json => Box::new(JsonWorkbook::for_document(output_dir, &stem)),
    };
    let summary = write_document(&table, writer.as_mut())
        .with_context(|| format!("failed to write tables for {}", path.display()))?;
    Ok(summary)
}

fn run(args: Args) -> Result<ExitCode> {
    let options = build_options(&args);
    options.validate()?;

    let files = discover_pdfs(&args.inputs)?;
    if files.is_empty() {
        bail!("no PDF files to process");
    }
    fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            args.output_dir.display()
        )
    })?;

    let pool = ThreadPoolBuilder::new()
        .num_threads(args.jobs.max(1))
        .build()
        .context("failed to build worker pool")?;
    let results: Vec<(PathBuf, Result<WriteSummary>)> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let result = process_document(path, &args.output_dir, args.format, &options);
                (path.clone(), result)
            })
            .collect()
    });

    let mut failed = 0usize;
    for (path, result) in &results {
        match result {
            Ok(summary) => info!(
                file = %path.display(),
                sheets = summary.sheets_written,
                skipped = summary.skipped.len(),
                placeholder = summary.placeholder,
                "done"
            ),
            Err(err) => {
                failed += 1;
                error!(file = %path.display(), "{err:#}");
            }
        }
    }
    info!(
        processed = results.len() - failed,
        failed,
        output = %args.output_dir.display(),
        "batch finished"
    );

    Ok(if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.debug);
    run(args)
}
