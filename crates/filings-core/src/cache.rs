//! Cache trait for storing registry responses.
//!
//! This module defines the [`FilingCache`] trait that provides a unified interface
//! for caching daily filing indexes and decoded tabular documents.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

use crate::{error::Result, types::CandidateFiler};

/// Trait for caching registry responses.
///
/// Implementations can store data in various backends (SQLite, in-memory, etc.)
/// to avoid repeated downloads of the same index day or document.
#[async_trait]
pub trait FilingCache: Send + Sync {
    /// Retrieves the cached filing index of one day.
    ///
    /// Returns `Ok(Some(filings))` if cached, `Ok(None)` if not cached.
    async fn get_index(
        &self,
        provider: &str,
        date: NaiveDate,
    ) -> Result<Option<Vec<CandidateFiler>>>;

    /// Stores the filing index of one day.
    async fn put_index(
        &self,
        provider: &str,
        date: NaiveDate,
        filings: &[CandidateFiler],
    ) -> Result<()>;

    /// Retrieves a cached tabular document.
    ///
    /// Returns `Ok(Some(text))` if cached, `Ok(None)` if not cached.
    async fn get_document(&self, provider: &str, document_id: &str) -> Result<Option<String>>;

    /// Stores a tabular document.
    async fn put_document(&self, provider: &str, document_id: &str, text: &str) -> Result<()>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
