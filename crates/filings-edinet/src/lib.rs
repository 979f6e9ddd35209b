#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! EDINET provider for filing indexes and securities report exports.
//!
//! This crate provides access to the EDINET v2 API:
//!
//! - Daily filing indexes (`documents.json`)
//! - Tabular (`XBRL_TO_CSV`) exports of individual filings
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use filings_core::{DocumentProvider, FilingIndexProvider};
//! use filings_edinet::EdinetProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = EdinetProvider::new("your_subscription_key")?;
//!
//!     let date = NaiveDate::from_ymd_opt(2024, 6, 24).unwrap();
//!     let filings = provider.fetch_filing_index(date).await?;
//!     println!("{} filings submitted on {}", filings.len(), date);
//!
//!     if let Some(filing) = filings.first() {
//!         let export = provider.fetch_tabular_document(&filing.document_id).await?;
//!         println!("{} bytes of tabular export", export.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use filings_core::{
    CandidateFiler, DocumentProvider, FilingError, FilingIndexProvider, FilingSource, Result,
};
use filings_xbrl::decode_text;
use serde::Deserialize;
use std::fmt;
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument, trace, warn};

/// EDINET API v2 base URL
const EDINET_BASE_URL: &str = "https://api.edinet-fsa.go.jp/api/v2";

/// Default spacing between requests
const DEFAULT_RATE_LIMIT: Duration = Duration::from_secs(3);

/// Default HTTP timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Archive directory holding the tabular export
const TABULAR_DIR: &str = "XBRL_TO_CSV/";

/// Prefix of the securities report body member
const REPORT_BODY_PREFIX: &str = "jpcrp";

const PROVIDER_NAME: &str = "EDINET";

/// Rate limiter to space out requests to EDINET
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            last_request: now.checked_sub(min_interval).unwrap_or(now),
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// EDINET filing provider.
///
/// Resolves daily filing indexes and downloads tabular exports of securities
/// reports. Requests are spaced by a rate limiter (3 seconds by default).
#[derive(Clone)]
pub struct EdinetProvider {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for EdinetProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdinetProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl EdinetProvider {
    /// Create a new EDINET provider with the given subscription key.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| FilingError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, api_key))
    }

    /// Create a new EDINET provider with a custom HTTP client.
    ///
    /// # Example
    /// ```
    /// use filings_edinet::EdinetProvider;
    /// use std::time::Duration;
    ///
    /// let client = reqwest::Client::builder()
    ///     .timeout(Duration::from_secs(60))
    ///     .build()
    ///     .unwrap();
    ///
    /// let provider = EdinetProvider::with_client(client, "your_subscription_key");
    /// ```
    #[must_use]
    pub fn with_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(DEFAULT_RATE_LIMIT))),
            api_key: api_key.into(),
            base_url: EDINET_BASE_URL.to_string(),
        }
    }

    /// Set the minimum interval between requests.
    #[must_use]
    pub fn with_rate_limit(mut self, min_interval: Duration) -> Self {
        self.rate_limiter = Arc::new(Mutex::new(RateLimiter::new(min_interval)));
        self
    }

    /// Point the provider at a different API root, e.g. a mirror.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send a GET request, mapping transport-level failures.
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        // Rate limit
        self.rate_limiter.lock().await.wait().await;

        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("Subscription-Key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| FilingError::Network(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(FilingError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                retry_after: None,
            }),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Err(FilingError::AuthenticationFailed(PROVIDER_NAME.to_string()))
            }
            status if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                Err(FilingError::Network(format!("HTTP {status}: {text}")))
            }
            _ => Ok(response),
        }
    }

    /// Fetch the raw ZIP archive of a document's tabular export.
    async fn fetch_archive(&self, document_id: &str) -> Result<Vec<u8>> {
        let url = format!("{}/documents/{}", self.base_url, document_id);
        debug!("Fetching tabular export from {}", url);

        let response = self.get(&url, &[("type", "5")]).await?;

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("json"));

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FilingError::Network(e.to_string()))?;

        // Failures on this endpoint come back as a JSON body with HTTP 200
        if is_json {
            let body: ApiResponse = serde_json::from_slice(&bytes)
                .map_err(|e| FilingError::Parse(format!("Failed to parse error body: {e}")))?;
            check_status(&body, document_id)?;
            return Err(FilingError::Parse(format!(
                "Expected an archive for {document_id}, got a JSON response"
            )));
        }

        Ok(bytes.to_vec())
    }
}

impl FilingSource for EdinetProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Japan FSA electronic disclosure system for securities reports"
    }
}

#[async_trait]
impl FilingIndexProvider for EdinetProvider {
    #[instrument(skip(self), fields(date = %date))]
    async fn fetch_filing_index(&self, date: NaiveDate) -> Result<Vec<CandidateFiler>> {
        let url = format!("{}/documents.json", self.base_url);
        let date_param = date.format("%Y-%m-%d").to_string();

        debug!("Fetching filing index");
        let response = self
            .get(&url, &[("date", date_param.as_str()), ("type", "2")])
            .await?;

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| FilingError::Parse(format!("Failed to parse filing index: {e}")))?;

        check_status(&body, &date_param)?;

        let filings = index_to_filers(body.results);
        debug!("Found {} filings", filings.len());
        Ok(filings)
    }
}

#[async_trait]
impl DocumentProvider for EdinetProvider {
    #[instrument(skip(self))]
    async fn fetch_tabular_document(&self, document_id: &str) -> Result<String> {
        if document_id.trim().is_empty() {
            return Err(FilingError::InvalidParameter(
                "Empty document id".to_string(),
            ));
        }

        let archive = self.fetch_archive(document_id).await?;
        let bytes = extract_tabular_member(&archive)?;
        decode_text(&bytes)
    }
}

// =============================================================================
// Archive handling
// =============================================================================

/// Pick the tabular export member of an archive.
///
/// Prefers the securities report body (`jpcrp*`), otherwise the first CSV
/// under `XBRL_TO_CSV/` in name order.
fn select_tabular_member<'a>(names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut candidates: Vec<&str> = names
        .filter(|name| {
            name.starts_with(TABULAR_DIR) && name.to_ascii_lowercase().ends_with(".csv")
        })
        .collect();
    candidates.sort_unstable();

    candidates
        .iter()
        .find(|name| {
            name.trim_start_matches(TABULAR_DIR)
                .starts_with(REPORT_BODY_PREFIX)
        })
        .or_else(|| candidates.first())
        .copied()
}

/// Read the tabular export bytes out of a document archive.
fn extract_tabular_member(archive: &[u8]) -> Result<Vec<u8>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|e| FilingError::Parse(format!("Invalid document archive: {e}")))?;

    let name = select_tabular_member(zip.file_names())
        .map(ToString::to_string)
        .ok_or_else(|| {
            FilingError::Parse(format!("No {TABULAR_DIR} export in document archive"))
        })?;
    trace!("Reading archive member {}", name);

    let mut member = zip
        .by_name(&name)
        .map_err(|e| FilingError::Parse(format!("Failed to open {name}: {e}")))?;

    let mut bytes = Vec::new();
    member
        .read_to_end(&mut bytes)
        .map_err(|e| FilingError::Parse(format!("Failed to read {name}: {e}")))?;

    Ok(bytes)
}

// =============================================================================
// Response handling
// =============================================================================

/// Map EDINET's in-body status to an error.
fn check_status(body: &ApiResponse, context: &str) -> Result<()> {
    let (status, message) = match (&body.metadata, body.status_code) {
        (Some(metadata), _) => (
            metadata.status.trim().parse::<u16>().unwrap_or(0),
            metadata.message.clone().unwrap_or_default(),
        ),
        (None, Some(code)) => (code, body.message.clone().unwrap_or_default()),
        (None, None) => return Ok(()),
    };

    match status {
        200 => Ok(()),
        401 | 403 => Err(FilingError::AuthenticationFailed(PROVIDER_NAME.to_string())),
        404 => Err(FilingError::DocumentNotFound(context.to_string())),
        429 => Err(FilingError::RateLimited {
            provider: PROVIDER_NAME.to_string(),
            retry_after: None,
        }),
        400 => Err(FilingError::InvalidParameter(format!("{context}: {message}"))),
        _ => Err(FilingError::Network(format!(
            "EDINET status {status} for {context}: {message}"
        ))),
    }
}

/// Convert index entries, skipping those without the fields a filer needs.
fn index_to_filers(entries: Vec<IndexEntry>) -> Vec<CandidateFiler> {
    let total = entries.len();
    let filers: Vec<CandidateFiler> = entries
        .into_iter()
        .filter_map(IndexEntry::into_filer)
        .collect();

    if filers.len() < total {
        warn!(
            skipped = total - filers.len(),
            "Skipped index entries with missing fields"
        );
    }
    filers
}

// =============================================================================
// EDINET API Response Types
// =============================================================================

/// Envelope shared by the index endpoint and document error bodies.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    metadata: Option<Metadata>,
    /// Present on gateway-level errors instead of `metadata`
    #[serde(rename = "StatusCode", default)]
    status_code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    results: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// One filing in the daily index.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexEntry {
    #[serde(rename = "docID")]
    doc_id: Option<String>,
    edinet_code: Option<String>,
    #[serde(rename = "JCN")]
    jcn: Option<String>,
    filer_name: Option<String>,
    doc_type_code: Option<String>,
    submit_date_time: Option<String>,
    doc_description: Option<String>,
}

impl IndexEntry {
    fn into_filer(self) -> Option<CandidateFiler> {
        let filer = CandidateFiler::new(
            self.edinet_code?,
            self.filer_name?,
            self.submit_date_time?,
            self.doc_type_code?,
            self.doc_id?,
            self.doc_description.unwrap_or_default(),
        );

        Some(match self.jcn.filter(|jcn| !jcn.trim().is_empty()) {
            Some(jcn) => filer.with_corporate_number(jcn),
            None => filer,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
