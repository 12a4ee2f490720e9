//! Report file pipeline
//!
//! Reads `ncu-<label>.out` (or its `.zstd` sibling), streams it through a
//! [`Scanner`], derives the roofline metrics and writes
//! `helper-<label>.out`. The output is rendered in full before the output
//! file is created: a run either writes a complete report or writes nothing.

use std::path::{Path, PathBuf};

use async_compression::tokio::bufread::ZstdDecoder;
use roofline_metrics::{
    derive::{self, Derived, derive},
    format::{DetectionError, ReportFormat, detect_format},
    registry::Registry,
    render::render,
    scan::{self, ScanSummary, Scanner},
};
use tokio::{
    fs,
    io::{AsyncBufReadExt, BufReader},
};
use tokio_stream::{StreamExt, wrappers::LinesStream};
use tokio_util::either;
use tracing::{debug, info, warn};

use crate::config::Settings;

/// Errors produced while processing a report
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The input report does not exist
    #[error("Report file {path:?} does not exist")]
    InputNotFound {
        /// The path that was looked for
        path: PathBuf,
    },
    /// IO errors reading the report or writing the output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The report format could not be detected
    #[error("Failed to detect report format: {0}")]
    Format(#[from] DetectionError),
    /// The report could not be scanned
    #[error("Failed to scan report: {0}")]
    Scan(#[from] scan::Error),
    /// Derived metrics could not be computed
    #[error("Failed to derive metrics: {0}")]
    Derive(#[from] derive::Error),
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// The report that was read
    pub input_path: PathBuf,
    /// Where the rendered report was written
    pub output_path: PathBuf,
    /// Scan bookkeeping
    pub summary: ScanSummary,
    /// The derived metrics
    pub derived: Derived,
    /// The rendered report text
    pub text: String,
}

/// Locate the input report for `settings`, preferring plain text.
///
/// # Errors
///
/// Returns [`Error::InputNotFound`] naming the plain text path if neither the
/// plain nor the compressed report exists.
pub fn locate_input(settings: &Settings) -> Result<PathBuf, Error> {
    let plain = settings.input_path();
    if plain.exists() {
        return Ok(plain);
    }
    let compressed = settings.compressed_input_path();
    if compressed.exists() {
        return Ok(compressed);
    }
    Err(Error::InputNotFound { path: plain })
}

/// Stream the report at `path` into `registry`, decompressing if needed.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds a malformed counter
/// line.
pub async fn scan_file(path: &Path, registry: &mut Registry) -> Result<ScanSummary, Error> {
    let format = detect_format(path)?;
    let file = fs::File::open(path).await?;
    let lines = match format {
        ReportFormat::Plain => {
            let reader = BufReader::new(file);
            either::Either::Left(LinesStream::new(reader.lines()))
        }
        ReportFormat::Zstd => {
            let reader = BufReader::new(file);
            let decoder = ZstdDecoder::new(reader);
            let reader = BufReader::new(decoder);
            either::Either::Right(LinesStream::new(reader.lines()))
        }
    };
    tokio::pin!(lines);

    let mut scanner = Scanner::new(registry);
    while let Some(line) = lines.next().await {
        scanner.scan_line(&line?)?;
    }
    Ok(scanner.finish())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write `contents` to a sibling staging file, then rename it over `path`.
/// A failed write leaves any previous file at `path` untouched.
async fn write_replacing(path: &Path, contents: &str) -> Result<(), Error> {
    let staging = staging_path(path);
    if let Err(err) = fs::write(&staging, contents).await {
        let _ = fs::remove_file(&staging).await;
        return Err(err.into());
    }
    fs::rename(&staging, path).await?;
    Ok(())
}

/// Run the whole pipeline for `settings`.
///
/// # Errors
///
/// Returns an error if the input is missing or malformed, a derived metric
/// cannot be computed, or the output cannot be written. No output file is
/// created in any of these cases.
pub async fn run(settings: &Settings) -> Result<Outcome, Error> {
    let input_path = locate_input(settings)?;
    info!(
        input = %input_path.display(),
        strategy = %settings.strategy,
        "Scanning report"
    );

    let mut registry = Registry::new();
    let summary = scan_file(&input_path, &mut registry).await?;
    info!(
        lines_read = summary.lines_read,
        lines_matched = summary.lines_matched,
        "Scan complete"
    );
    for entry in registry.iter().filter(|entry| !entry.observed()) {
        warn!(
            key = entry.key,
            counter = entry.counter_name,
            "Counter never observed in report"
        );
    }

    let derived = derive(&registry, settings.strategy)?;
    debug!(
        flops = derived.flops,
        memory_bytes = derived.memory_bytes,
        time_ns = derived.time_ns,
        bound = ?derived.bound,
        "Derived metrics"
    );
    let text = render(&registry, &derived);

    fs::create_dir_all(&settings.output_dir).await?;
    let output_path = settings.output_path();
    write_replacing(&output_path, &text).await?;

    Ok(Outcome {
        input_path,
        output_path,
        summary,
        derived,
        text,
    })
}
