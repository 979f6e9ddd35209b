#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Company name to regulatory filing to financial indicators.
//!
//! This crate re-exports the core types, the matching and extraction
//! algorithms, cache implementations and registry providers, and provides a
//! [`CompanyResearcher`] that runs the whole pipeline with provider fallback.
//!
//! # Features
//!
//! - `edinet` - EDINET provider for filing indexes and documents
//! - `gbiz` - gBizINFO corporate registry provider
//! - `cache-sqlite` - SQLite-based caching
//!
//! # Example
//!
//! ```rust,ignore
//! use filings::{CompanyResearcher, SqliteCache};
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> filings::Result<()> {
//!     let researcher = CompanyResearcher::with_cache(Arc::new(SqliteCache::new("filings.db")?))
//!         .with_edinet("edinet_subscription_key")?
//!         .with_gbiz("gbiz_api_token")?;
//!
//!     let start = NaiveDate::from_ymd_opt(2024, 6, 17).unwrap();
//!     let end = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
//!
//!     let records = researcher.research_batch(&["富士通", "トヨタ自動車"], start, end).await;
//!     println!("{}", filings::records_to_dataframe(&records)?);
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use filings_core::*;

// Algorithms
pub use filings_match::{NameMatcher, ReportSelector};
pub use filings_xbrl::{
    IndicatorExtractor, TabularParser, extract_from_text, normalize, normalize_json,
};

// Cache implementations
#[cfg(feature = "cache-sqlite")]
pub use filings_cache::SqliteCache;
pub use filings_cache::{InMemoryCache, NoopCache};

// Providers
#[cfg(feature = "edinet")]
pub use filings_edinet::EdinetProvider;
#[cfg(feature = "gbiz")]
pub use filings_gbiz::GBizInfoProvider;

mod report;
mod researcher;
pub use report::records_to_dataframe;
pub use researcher::CompanyResearcher;
