//! Accumulate an `ncu` report into a [`Registry`]
//!
//! The scanner is a single sequential pass. Every line is tokenized and
//! checked against every registry entry; there is no first-match short
//! circuit, a line naming two counters feeds both. When a line matches, its
//! trailing token is parsed as `f64`, added to the entry's total and kept as
//! the entry's last value.
//!
//! A matching line whose trailing token is not a number is fatal. Letting it
//! through would leave an accumulator silently short and skew every derived
//! metric.

use std::io::BufRead;

use tracing::{debug, error};

use crate::line::ReportLine;
use crate::registry::Registry;

/// Errors produced while scanning
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A counter line did not end in a number
    #[error("Line {line_number}: counter {counter} has non-numeric value {token:?}")]
    MalformedCounterLine {
        /// 1-based line number in the report
        line_number: u64,
        /// The counter name that matched the line
        counter: &'static str,
        /// The offending trailing token
        token: String,
    },
    /// IO errors while reading the report
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bookkeeping for a finished scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Lines consumed, blank lines included.
    pub lines_read: u64,
    /// Lines that matched at least one counter.
    pub lines_matched: u64,
}

/// Streams report lines into a borrowed [`Registry`].
#[derive(Debug)]
pub struct Scanner<'r> {
    registry: &'r mut Registry,
    summary: ScanSummary,
}

impl<'r> Scanner<'r> {
    /// Begin a scan pass over `registry`.
    pub fn new(registry: &'r mut Registry) -> Self {
        Self {
            registry,
            summary: ScanSummary::default(),
        }
    }

    /// Feed one raw line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedCounterLine`] if the line names a counter but
    /// its trailing token does not parse as a float. The registry is left
    /// untouched by the failing line.
    pub fn scan_line(&mut self, raw: &str) -> Result<(), Error> {
        self.summary.lines_read += 1;
        let line_number = self.summary.lines_read;
        let line = ReportLine::parse(raw);
        if line.is_empty() {
            return Ok(());
        }

        // Parse lazily: most lines in an ncu report are section headers and
        // metrics we do not track.
        let mut value: Option<f64> = None;
        let mut matched = false;
        for entry in self.registry.entries_mut() {
            if !line.contains(entry.counter_name) {
                continue;
            }
            let v = match value {
                Some(v) => v,
                None => {
                    let token = line.last_token().unwrap_or_default();
                    let parsed = token.parse::<f64>().map_err(|_| {
                        error!(
                            line_number,
                            counter = entry.counter_name,
                            token,
                            "Counter line has non-numeric trailing value"
                        );
                        Error::MalformedCounterLine {
                            line_number,
                            counter: entry.counter_name,
                            token: token.to_string(),
                        }
                    })?;
                    value = Some(parsed);
                    parsed
                }
            };
            debug!(key = entry.key, value = v, "counter matched");
            entry.record(v);
            matched = true;
        }

        if matched {
            self.summary.lines_matched += 1;
        }
        Ok(())
    }

    /// End the pass, releasing the registry.
    #[must_use]
    pub fn finish(self) -> ScanSummary {
        self.summary
    }
}

/// Scan every line of `lines` into `registry`.
///
/// # Errors
///
/// Returns the first [`Error::MalformedCounterLine`] encountered.
pub fn scan_lines<I, S>(lines: I, registry: &mut Registry) -> Result<ScanSummary, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut scanner = Scanner::new(registry);
    for line in lines {
        scanner.scan_line(line.as_ref())?;
    }
    Ok(scanner.finish())
}

/// Scan a buffered reader line by line into `registry`.
///
/// # Errors
///
/// Returns an error if reading fails or a counter line is malformed.
pub fn scan_reader<R: BufRead>(reader: R, registry: &mut Registry) -> Result<ScanSummary, Error> {
    let mut scanner = Scanner::new(registry);
    for line in reader.lines() {
        scanner.scan_line(&line?)?;
    }
    Ok(scanner.finish())
}
