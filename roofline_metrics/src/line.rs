//! A single tokenized line of an `ncu` text report
//!
//! `ncu` pads its report columns with arbitrary runs of spaces, so a line is
//! just its whitespace-delimited tokens. A counter line looks like:
//!
//! ```text
//!     dram__sectors_read.sum                    sector           1024
//! ```
//!
//! with the counter value always in the final column.

/// The tokens of one report line, borrowed from the line text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> ReportLine<'a> {
    /// Split `raw` on whitespace.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        Self {
            tokens: raw.split_whitespace().collect(),
        }
    }

    /// Whether `token` appears verbatim as one of this line's tokens. This is
    /// exact equality, `dram__sectors_read.sum` does not match
    /// `dram__sectors_read.sum.per_second`.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| *t == token)
    }

    /// The trailing token, where the counter value lives.
    #[must_use]
    pub fn last_token(&self) -> Option<&'a str> {
        self.tokens.last().copied()
    }

    /// Tokens in line order.
    #[must_use]
    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }

    /// Whether the line held nothing but whitespace.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_runs_of_whitespace() {
        let line = ReportLine::parse("  dram__sectors_read.sum \t sector    42 ");
        assert_eq!(line.tokens(), &["dram__sectors_read.sum", "sector", "42"]);
        assert_eq!(line.last_token(), Some("42"));
    }

    #[test]
    fn contains_requires_exact_token() {
        let line = ReportLine::parse("smsp__cycles_elapsed.sum.per_second cycle/nsecond 1.5");
        assert!(line.contains("smsp__cycles_elapsed.sum.per_second"));
        assert!(!line.contains("smsp__cycles_elapsed.sum"));
        assert!(!line.contains("cycle"));
    }

    #[test]
    fn blank_line_is_empty() {
        let line = ReportLine::parse("   \t ");
        assert!(line.is_empty());
        assert_eq!(line.last_token(), None);
    }
}
