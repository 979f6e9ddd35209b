#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Filer-name matching and filing selection.
//!
//! - [`NameMatcher`] - Ratcliff–Obershelp similarity of two names
//! - [`ReportSelector`] - Chooses one filing from a filing index
//!
//! # Example
//!
//! ```
//! use filings_core::CandidateFiler;
//! use filings_match::ReportSelector;
//!
//! let candidates = vec![
//!     CandidateFiler::new("E01777", "富士通株式会社", "2024-06-24 09:00", "120", "S100A", ""),
//!     CandidateFiler::new("E00988", "富士フイルム", "2024-06-27 09:00", "120", "S100B", ""),
//! ];
//!
//! let result = ReportSelector::default().select(&"富士通".into(), &candidates);
//! assert_eq!(result.selected_filer().unwrap().filer_name, "富士通株式会社");
//! ```

/// Filing selection.
pub mod selector;
/// Name similarity scoring.
pub mod similarity;

pub use selector::ReportSelector;
pub use similarity::{NameMatcher, score};
