//! Quote-aware parsing of tabular exports into header-keyed rows.
//!
//! The first line with enough fields is the header. Each following line is
//! zipped against it: lines shorter than the header are dropped, and cells past
//! the last header column are ignored.

use filings_core::{FilingError, RawRow, ResearchConfig, Result};
use tracing::debug;

/// Minimum field count of a retained line for the default parser.
pub const DEFAULT_MIN_COLUMNS: usize = 2;

/// Line-oriented parser for quoted, delimiter-separated exports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabularParser {
    delimiter: char,
    min_columns: usize,
}

impl Default for TabularParser {
    fn default() -> Self {
        Self {
            delimiter: ',',
            min_columns: DEFAULT_MIN_COLUMNS,
        }
    }
}

impl TabularParser {
    /// Creates a comma-separated parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser from a research configuration.
    #[must_use]
    pub fn from_config(config: &ResearchConfig) -> Self {
        Self::new()
            .with_delimiter(config.delimiter)
            .with_min_columns(config.min_columns)
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the field count below which lines are dropped as malformed.
    #[must_use]
    pub const fn with_min_columns(mut self, min_columns: usize) -> Self {
        self.min_columns = min_columns;
        self
    }

    /// Parses raw export text into rows.
    ///
    /// # Errors
    /// Returns [`FilingError::MalformedTable`] when the text has fewer than two
    /// non-empty lines, or fewer than two lines reach the minimum column count.
    pub fn parse(&self, raw: &str) -> Result<Vec<RawRow>> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();

        if lines.len() < 2 {
            return Err(FilingError::MalformedTable(format!(
                "expected at least 2 non-empty lines, found {}",
                lines.len()
            )));
        }

        let mut retained = lines
            .iter()
            .map(|line| split_line(line, self.delimiter))
            .filter(|fields| fields.len() >= self.min_columns);

        let Some(header) = retained.next() else {
            return Err(FilingError::MalformedTable(format!(
                "no line has at least {} columns",
                self.min_columns
            )));
        };

        let mut data_lines = 0usize;
        let mut rows = Vec::new();
        for fields in retained {
            data_lines += 1;
            if fields.len() < header.len() {
                continue;
            }
            rows.push(header.iter().cloned().zip(fields).collect::<RawRow>());
        }

        if data_lines == 0 {
            return Err(FilingError::MalformedTable(format!(
                "no data line has at least {} columns",
                self.min_columns
            )));
        }

        debug!(
            lines = lines.len(),
            columns = header.len(),
            rows = rows.len(),
            dropped = data_lines - rows.len(),
            "Parsed tabular export"
        );

        Ok(rows)
    }
}

/// Parses comma-separated export text with the default parser.
///
/// # Errors
/// See [`TabularParser::parse`].
pub fn parse(raw: &str) -> Result<Vec<RawRow>> {
    TabularParser::default().parse(raw)
}

/// Splits one line into fields.
///
/// A double quote toggles quoted state and is not kept; the delimiter only ends
/// a field outside quotes.
#[must_use]
pub fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in line.chars() {
        if c == '"' {
            quoted = !quoted;
        } else if c == delimiter && !quoted {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    fields.push(current);

    fields
}
