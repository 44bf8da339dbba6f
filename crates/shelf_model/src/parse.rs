//! Shared helpers for the line-oriented interchange parsers.

use crate::dialect::Dialect;
use crate::error::FormatError;

/// Iterates over the meaningful lines of an interchange file.
///
/// Yields `(line_number, trimmed_line)` pairs with 1-based line numbers,
/// skipping blank lines and comments per the dialect.
pub(crate) struct LineReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    dialect: &'a Dialect,
}

impl<'a> LineReader<'a> {
    pub(crate) fn new(text: &'a str, dialect: &'a Dialect) -> Self {
        Self {
            lines: text.lines().enumerate(),
            dialect,
        }
    }
}

impl<'a> Iterator for LineReader<'a> {
    type Item = (u32, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, raw) in self.lines.by_ref() {
            let line = raw.trim();
            if self.dialect.skips(line) {
                continue;
            }
            return Some((idx as u32 + 1, line));
        }
        None
    }
}

/// Parses a token as a non-negative integer, with line context on failure.
pub(crate) fn parse_u32(token: &str, line: u32, what: &str) -> Result<u32, FormatError> {
    token.parse::<u32>().map_err(|_| {
        FormatError::at_line(
            line,
            format!("expected a non-negative integer for {what}, got '{token}'"),
        )
    })
}

/// Parses a token as a floating-point value, with line context on failure.
pub(crate) fn parse_f64(token: &str, line: u32, what: &str) -> Result<f64, FormatError> {
    token.parse::<f64>().map_err(|_| {
        FormatError::at_line(line, format!("expected a number for {what}, got '{token}'"))
    })
}
