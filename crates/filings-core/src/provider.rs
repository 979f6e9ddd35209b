//! Provider traits for the registries around the extraction core.
//!
//! This module defines the core provider traits:
//!
//! - [`FilingSource`] - Base trait for all registry providers
//! - [`FilingIndexProvider`] - Daily filing indexes
//! - [`DocumentProvider`] - Tabular exports of individual filings
//! - [`CorporateInfoProvider`] - Corporate registry profiles

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{CandidateFiler, CompanyProfile},
};

/// Base trait for all registry providers.
pub trait FilingSource: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "EDINET").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider for the list of filings submitted on a given day.
#[async_trait]
pub trait FilingIndexProvider: FilingSource {
    /// Fetches the filings submitted on one day.
    async fn fetch_filing_index(&self, date: NaiveDate) -> Result<Vec<CandidateFiler>>;
}

/// Provider for the tabular export of a filing.
#[async_trait]
pub trait DocumentProvider: FilingSource {
    /// Fetches the decoded tabular export of a document.
    async fn fetch_tabular_document(&self, document_id: &str) -> Result<String>;
}

/// Provider for corporate registry information.
#[async_trait]
pub trait CorporateInfoProvider: FilingSource {
    /// Fetches the profile of the entity with the given corporate number.
    async fn company_profile(&self, corporate_number: &str) -> Result<CompanyProfile>;
}
