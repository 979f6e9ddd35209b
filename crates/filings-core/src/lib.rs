#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for filing resolution and indicator extraction.
//!
//! This crate provides the foundational abstractions shared by the workspace:
//!
//! - [`FilingIndexProvider`](provider::FilingIndexProvider) - Daily filing indexes
//! - [`DocumentProvider`](provider::DocumentProvider) - Tabular filing exports
//! - [`CorporateInfoProvider`](provider::CorporateInfoProvider) - Corporate registry data
//! - [`FilingCache`](cache::FilingCache) - Caching abstraction
//! - [`IndicatorVocabulary`](vocabulary::IndicatorVocabulary) - Extraction keywords

/// Cache trait for storing registry responses.
pub mod cache;
/// Research configuration.
pub mod config;
/// Error types for filing operations.
pub mod error;
/// Provider traits for the surrounding registries.
pub mod provider;
/// Core data types (CandidateFiler, MatchResult, RawRow, etc.).
pub mod types;
/// Keyword vocabulary for indicator extraction.
pub mod vocabulary;

// Re-export commonly used items at crate root
pub use cache::FilingCache;
pub use config::{
    ColumnLabels, DEFAULT_MIN_SIMILARITY, EDINET_MIN_COLUMNS, ResearchConfig,
    SECURITIES_REPORT_DOC_TYPE,
};
pub use error::{FilingError, Result};
pub use provider::{CorporateInfoProvider, DocumentProvider, FilingIndexProvider, FilingSource};
pub use types::{
    CandidateFiler, CompanyProfile, CompanyRecord, ExtractedIndicators, FilerQuery, Indicator,
    MAX_RELATED_ENTITIES, MatchResult, RawRow,
};
pub use vocabulary::IndicatorVocabulary;
