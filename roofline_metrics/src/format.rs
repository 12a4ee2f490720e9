//! Format detection for report files
//!
//! `ncu` reports are plain text but archived reports are commonly
//! zstd-compressed. This module tells the two apart by magic bytes and file
//! extension.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The zstd frame magic number, little endian.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// The format of a report file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Plain text
    Plain,
    /// Zstd-compressed text
    Zstd,
}

/// Errors during format detection
#[derive(thiserror::Error, Debug)]
pub enum DetectionError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Detects the format of a report file.
///
/// Detection strategy:
/// 1. Check for the zstd frame magic at the start of the file
/// 2. Fall back to extension-based detection (`.zstd`, `.zst`)
/// 3. Default to plain text
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<ReportFormat, DetectionError> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_ok() && magic == ZSTD_MAGIC {
        return Ok(ReportFormat::Zstd);
    }

    if let Some(ext) = path.extension() {
        if ext == "zstd" || ext == "zst" {
            return Ok(ReportFormat::Zstd);
        }
    }

    Ok(ReportFormat::Plain)
}
