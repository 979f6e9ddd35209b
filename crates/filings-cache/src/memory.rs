//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use filings_core::{CandidateFiler, FilingCache, Result};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Key for filing index entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct IndexKey {
    provider: String,
    date: NaiveDate,
}

/// Key for document entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DocumentKey {
    provider: String,
    document_id: String,
}

/// Simple in-memory cache for testing and development.
///
/// Data is stored in `RwLock`-protected `HashMap`s and is lost when the cache
/// is dropped. Entries are cloned on get/put operations.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    indexes: RwLock<HashMap<IndexKey, CacheEntry<Vec<CandidateFiler>>>>,
    documents: RwLock<HashMap<DocumentKey, CacheEntry<String>>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FilingCache for InMemoryCache {
    #[instrument(skip(self), fields(provider = %provider, date = %date))]
    async fn get_index(
        &self,
        provider: &str,
        date: NaiveDate,
    ) -> Result<Option<Vec<CandidateFiler>>> {
        let key = IndexKey {
            provider: provider.to_string(),
            date,
        };

        let cache = self.indexes.read().await;
        match cache.get(&key) {
            Some(entry) => {
                debug!("Cache hit for filing index");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for filing index");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, filings), fields(provider = %provider, date = %date, count = filings.len()))]
    async fn put_index(
        &self,
        provider: &str,
        date: NaiveDate,
        filings: &[CandidateFiler],
    ) -> Result<()> {
        let key = IndexKey {
            provider: provider.to_string(),
            date,
        };

        let mut cache = self.indexes.write().await;
        cache.insert(key, CacheEntry::new(filings.to_vec()));
        debug!("Cached {} filings", filings.len());
        Ok(())
    }

    #[instrument(skip(self), fields(provider = %provider, document_id = %document_id))]
    async fn get_document(&self, provider: &str, document_id: &str) -> Result<Option<String>> {
        let key = DocumentKey {
            provider: provider.to_string(),
            document_id: document_id.to_string(),
        };

        let cache = self.documents.read().await;
        match cache.get(&key) {
            Some(entry) => {
                debug!("Cache hit for document");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for document");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, text), fields(provider = %provider, document_id = %document_id, bytes = text.len()))]
    async fn put_document(&self, provider: &str, document_id: &str, text: &str) -> Result<()> {
        let key = DocumentKey {
            provider: provider.to_string(),
            document_id: document_id.to_string(),
        };

        let mut cache = self.documents.write().await;
        cache.insert(key, CacheEntry::new(text.to_string()));
        debug!("Cached document");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut total_removed = 0usize;

        {
            let mut cache = self.indexes.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        {
            let mut cache = self.documents.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        if total_removed > 0 {
            debug!("Invalidated {} stale cache entries", total_removed);
        }

        Ok(total_removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.indexes.write().await.clear();
        self.documents.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_filing() -> CandidateFiler {
        CandidateFiler::new(
            "E01777",
            "富士通株式会社",
            "2024-06-24 09:00",
            "120",
            "S100TXYZ",
            "有価証券報告書－第124期",
        )
    }

    #[tokio::test]
    async fn test_memory_cache_index() {
        let cache = InMemoryCache::new();
        let date = NaiveDate::from_ymd_opt(2024, 6, 24).unwrap();

        // Initially no data
        assert!(cache.get_index("test", date).await.unwrap().is_none());

        cache
            .put_index("test", date, &[sample_filing()])
            .await
            .unwrap();

        let cached = cache.get_index("test", date).await.unwrap().unwrap();
        assert_eq!(cached, vec![sample_filing()]);

        // Other providers don't see it
        assert!(cache.get_index("other", date).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_empty_index_is_a_hit() {
        let cache = InMemoryCache::new();
        let date = NaiveDate::from_ymd_opt(2024, 6, 23).unwrap();

        cache.put_index("test", date, &[]).await.unwrap();
        assert_eq!(cache.get_index("test", date).await.unwrap(), Some(vec![]));
    }

    #[tokio::test]
    async fn test_memory_cache_document() {
        let cache = InMemoryCache::new();

        assert!(cache.get_document("test", "S100TXYZ").await.unwrap().is_none());
        cache
            .put_document("test", "S100TXYZ", "\"要素ID\",\"値\"")
            .await
            .unwrap();
        assert_eq!(
            cache.get_document("test", "S100TXYZ").await.unwrap().as_deref(),
            Some("\"要素ID\",\"値\"")
        );
    }

    #[tokio::test]
    async fn test_memory_cache_invalidate_and_clear() {
        let cache = InMemoryCache::new();
        let date = NaiveDate::from_ymd_opt(2024, 6, 24).unwrap();
        cache.put_index("test", date, &[sample_filing()]).await.unwrap();
        cache.put_document("test", "S100TXYZ", "x").await.unwrap();

        // Nothing is older than an hour yet
        let removed = cache
            .invalidate_stale(Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        tokio::time::sleep(Duration::from_millis(5)).await;
        let removed = cache.invalidate_stale(Duration::ZERO).await.unwrap();
        assert_eq!(removed, 2);

        cache.put_document("test", "S100TXYZ", "x").await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.get_document("test", "S100TXYZ").await.unwrap().is_none());
    }
}
