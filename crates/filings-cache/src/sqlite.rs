//! SQLite-based cache implementation.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use filings_core::{CandidateFiler, FilingCache, FilingError, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument};

/// SQLite-based cache for registry responses.
///
/// This cache stores data in a SQLite database file, providing persistence across
/// application restarts. A day's filing index is stored as one JSON array so
/// that empty days are remembered too.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Create a new SQLite cache at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| FilingError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory SQLite cache.
    ///
    /// Useful for testing; data is lost when the cache is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| FilingError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FilingError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS index_cache (
                provider TEXT NOT NULL,
                date TEXT NOT NULL,
                filings_json TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (provider, date)
            )",
            [],
        )
        .map_err(|e| FilingError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS document_cache (
                provider TEXT NOT NULL,
                document_id TEXT NOT NULL,
                body TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (provider, document_id)
            )",
            [],
        )
        .map_err(|e| FilingError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_document_cached_at
             ON document_cache(cached_at)",
            [],
        )
        .map_err(|e| FilingError::Cache(e.to_string()))?;

        debug!("SQLite cache schema initialized");
        Ok(())
    }
}

#[async_trait]
impl FilingCache for SqliteCache {
    #[instrument(skip(self), fields(provider = %provider, date = %date))]
    async fn get_index(
        &self,
        provider: &str,
        date: NaiveDate,
    ) -> Result<Option<Vec<CandidateFiler>>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FilingError::Cache(e.to_string()))?;

        let result = conn
            .query_row(
                "SELECT filings_json FROM index_cache
                 WHERE provider = ?1 AND date = ?2",
                params![provider, date.to_string()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| FilingError::Cache(e.to_string()))?;

        match result {
            Some(json) => {
                let filings: Vec<CandidateFiler> =
                    serde_json::from_str(&json).map_err(|e| FilingError::Parse(e.to_string()))?;
                debug!("Found {} cached filings", filings.len());
                Ok(Some(filings))
            }
            None => {
                debug!("No cached filing index found");
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
        let cached_at = Utc::now().to_rfc3339();
        let filings_json =
            serde_json::to_string(filings).map_err(|e| FilingError::Parse(e.to_string()))?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| FilingError::Cache(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO index_cache
             (provider, date, filings_json, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![provider, date.to_string(), filings_json, cached_at],
        )
        .map_err(|e| FilingError::Cache(e.to_string()))?;

        debug!("Cached {} filings", filings.len());
        Ok(())
    }

    #[instrument(skip(self), fields(provider = %provider, document_id = %document_id))]
    async fn get_document(&self, provider: &str, document_id: &str) -> Result<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FilingError::Cache(e.to_string()))?;

        let result = conn
            .query_row(
                "SELECT body FROM document_cache
                 WHERE provider = ?1 AND document_id = ?2",
                params![provider, document_id],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| FilingError::Cache(e.to_string()))?;

        if result.is_some() {
            debug!("Found cached document");
        } else {
            debug!("No cached document found");
        }
        Ok(result)
    }

    #[instrument(skip(self, text), fields(provider = %provider, document_id = %document_id, bytes = text.len()))]
    async fn put_document(&self, provider: &str, document_id: &str, text: &str) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339();

        let conn = self
            .conn
            .lock()
            .map_err(|e| FilingError::Cache(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO document_cache
             (provider, document_id, body, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![provider, document_id, text, cached_at],
        )
        .map_err(|e| FilingError::Cache(e.to_string()))?;

        debug!("Cached document");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(ttl)
                .map_err(|e| FilingError::Cache(format!("Invalid TTL duration: {}", e)))?;
        let cutoff_str = cutoff.to_rfc3339();

        let conn = self
            .conn
            .lock()
            .map_err(|e| FilingError::Cache(e.to_string()))?;

        let mut total_deleted = 0usize;

        total_deleted += conn
            .execute(
                "DELETE FROM index_cache WHERE cached_at < ?1",
                params![cutoff_str],
            )
            .map_err(|e| FilingError::Cache(e.to_string()))?;

        total_deleted += conn
            .execute(
                "DELETE FROM document_cache WHERE cached_at < ?1",
                params![cutoff_str],
            )
            .map_err(|e| FilingError::Cache(e.to_string()))?;

        if total_deleted > 0 {
            debug!("Invalidated {} stale cache entries", total_deleted);
        }

        Ok(total_deleted)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FilingError::Cache(e.to_string()))?;

        conn.execute("DELETE FROM index_cache", [])
            .map_err(|e| FilingError::Cache(e.to_string()))?;
        conn.execute("DELETE FROM document_cache", [])
            .map_err(|e| FilingError::Cache(e.to_string()))?;

        debug!("Cleared all cache entries");
        Ok(())
    }
}
