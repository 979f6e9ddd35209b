#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Tabular export parsing and indicator extraction.
//!
//! - [`normalize`] - Locale-formatted numeric cells to `f64`
//! - [`normalize_json`] - Registry JSON numbers or strings to `f64`
//! - [`TabularParser`] - Quoted delimiter-separated text to [`RawRow`]s
//! - [`IndicatorExtractor`] - Rows to [`ExtractedIndicators`]
//! - [`decode_text`] - Downloaded bytes to text
//!
//! # Example
//!
//! ```
//! use filings_core::ResearchConfig;
//! use filings_xbrl::extract_from_text;
//!
//! let export = "\"要素ID\",\"項目名\",\"コンテキストID\",\"相対年度\",\"連結・個別\",\"値\"\n\
//!               \"jppfs_cor:NetSales\",\"売上高\",\"CurrentYearDuration\",\"当期\",\"連結\",\"¥1,234,567円\"\n";
//!
//! let indicators = extract_from_text(export, &ResearchConfig::default()).unwrap();
//! assert_eq!(indicators.revenue, Some(1_234_567.0));
//! ```

use filings_core::{ExtractedIndicators, RawRow, ResearchConfig, Result};

/// Byte decoding of downloaded exports.
pub mod encoding;
/// Keyword-based indicator extraction.
pub mod indicators;
/// Numeric cell normalization.
pub mod numeric;
/// Quote-aware tabular parsing.
pub mod tabular;

pub use encoding::decode_text;
pub use indicators::{IndicatorExtractor, extract};
pub use numeric::{normalize, normalize_json};
pub use tabular::{DEFAULT_MIN_COLUMNS, TabularParser, parse, split_line};

/// Parses export text and extracts indicators with the given configuration.
///
/// # Errors
/// Returns [`FilingError::MalformedTable`](filings_core::FilingError::MalformedTable)
/// if the text does not contain a usable table.
pub fn extract_from_text(raw: &str, config: &ResearchConfig) -> Result<ExtractedIndicators> {
    let rows: Vec<RawRow> = TabularParser::from_config(config).parse(raw)?;
    Ok(IndicatorExtractor::from_config(config).extract(&rows))
}
