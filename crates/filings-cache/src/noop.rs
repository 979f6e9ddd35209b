//! No-op cache implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use filings_core::{CandidateFiler, FilingCache, Result};
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// All `get_*` methods return `Ok(None)` and all `put_*` methods return `Ok(())`.
/// Useful for disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FilingCache for NoopCache {
    async fn get_index(
        &self,
        _provider: &str,
        _date: NaiveDate,
    ) -> Result<Option<Vec<CandidateFiler>>> {
        trace!("NoopCache: get_index called, returning None");
        Ok(None)
    }

    async fn put_index(
        &self,
        _provider: &str,
        _date: NaiveDate,
        _filings: &[CandidateFiler],
    ) -> Result<()> {
        trace!("NoopCache: put_index called, doing nothing");
        Ok(())
    }

    async fn get_document(&self, _provider: &str, _document_id: &str) -> Result<Option<String>> {
        trace!("NoopCache: get_document called, returning None");
        Ok(None)
    }

    async fn put_document(&self, _provider: &str, _document_id: &str, _text: &str) -> Result<()> {
        trace!("NoopCache: put_document called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        trace!("NoopCache: invalidate_stale called, returning 0");
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_cache_never_returns_data() {
        let cache = NoopCache::new();
        let date = NaiveDate::from_ymd_opt(2024, 6, 24).unwrap();

        cache.put_document("test", "S100TXYZ", "text").await.unwrap();
        assert!(cache.get_document("test", "S100TXYZ").await.unwrap().is_none());

        cache.put_index("test", date, &[]).await.unwrap();
        assert!(cache.get_index("test", date).await.unwrap().is_none());

        assert_eq!(cache.invalidate_stale(Duration::ZERO).await.unwrap(), 0);
        assert!(cache.clear().await.is_ok());
    }
}
