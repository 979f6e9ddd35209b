#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! gBizINFO corporate registry provider.
//!
//! This crate implements [`CorporateInfoProvider`] for the
//! [gBizINFO](https://info.gbiz.go.jp/) REST API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use filings_core::CorporateInfoProvider;
//! use filings_gbiz::GBizInfoProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GBizInfoProvider::new("your_api_token")?;
//!
//!     let profile = provider.company_profile("5030001007261").await?;
//!     println!("{profile}");
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use filings_core::{CompanyProfile, CorporateInfoProvider, FilingError, FilingSource, Result};
use filings_xbrl::normalize_json;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Base URL for the gBizINFO API.
const GBIZ_BASE_URL: &str = "https://info.gbiz.go.jp/hojin";

/// Header carrying the API token.
const TOKEN_HEADER: &str = "X-hojinInfo-api-token";

/// Length of a national corporate number.
const CORPORATE_NUMBER_LEN: usize = 13;

/// Default HTTP timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER_NAME: &str = "gBizINFO";

/// gBizINFO corporate registry provider.
#[derive(Clone)]
pub struct GBizInfoProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for GBizInfoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GBizInfoProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GBizInfoProvider {
    /// Create a new gBizINFO provider with the given API token.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| FilingError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, api_key))
    }

    /// Create a new gBizINFO provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: GBIZ_BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        corporate_number: &str,
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!("gBizINFO request: {}", endpoint);

        let response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FilingError::Network(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                return Err(FilingError::RateLimited {
                    provider: PROVIDER_NAME.to_string(),
                    retry_after: None,
                });
            }
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                return Err(FilingError::AuthenticationFailed(PROVIDER_NAME.to_string()));
            }
            reqwest::StatusCode::NOT_FOUND => {
                return Err(FilingError::FilerNotFound(corporate_number.to_string()));
            }
            status if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                return Err(FilingError::Network(format!("HTTP {status}: {text}")));
            }
            _ => {}
        }

        let text = response
            .text()
            .await
            .map_err(|e| FilingError::Network(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| FilingError::Parse(format!("{e}: {text}")))
    }

    /// Latest reported revenue, or `None` if the finance endpoint fails.
    async fn latest_revenue(&self, corporate_number: &str) -> Option<f64> {
        let endpoint = format!("v1/hojin/{corporate_number}/finance");
        match self.get::<FinanceResponse>(&endpoint, corporate_number).await {
            Ok(finance) => finance.latest_revenue(),
            Err(e) => {
                warn!(error = %e, "Finance lookup failed, continuing without revenue");
                None
            }
        }
    }
}

impl FilingSource for GBizInfoProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Japanese government corporate information registry"
    }
}

#[async_trait]
impl CorporateInfoProvider for GBizInfoProvider {
    #[instrument(skip(self))]
    async fn company_profile(&self, corporate_number: &str) -> Result<CompanyProfile> {
        validate_corporate_number(corporate_number)?;

        let endpoint = format!("v1/hojin/{corporate_number}");
        let basic: BasicResponse = self.get(&endpoint, corporate_number).await?;
        let mut profile = basic.into_profile(corporate_number)?;

        profile.revenue = self.latest_revenue(corporate_number).await;

        debug!(
            company = profile.company_name.as_deref().unwrap_or_default(),
            "Fetched company profile"
        );
        Ok(profile)
    }
}

/// Check that a corporate number is 13 ASCII digits.
fn validate_corporate_number(corporate_number: &str) -> Result<()> {
    if corporate_number.len() == CORPORATE_NUMBER_LEN
        && corporate_number.bytes().all(|b| b.is_ascii_digit())
    {
        Ok(())
    } else {
        Err(FilingError::InvalidParameter(format!(
            "corporate number must be {CORPORATE_NUMBER_LEN} digits, got {corporate_number:?}"
        )))
    }
}

fn json_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(normalize_json)
}

fn json_text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// =============================================================================
// API Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct BasicResponse {
    #[serde(rename = "hojin-infos", default)]
    hojin_infos: Vec<HojinInfo>,
}

impl BasicResponse {
    fn into_profile(self, corporate_number: &str) -> Result<CompanyProfile> {
        let info = self
            .hojin_infos
            .into_iter()
            .next()
            .ok_or_else(|| FilingError::FilerNotFound(corporate_number.to_string()))?;

        Ok(CompanyProfile {
            corporate_number: corporate_number.to_string(),
            company_name: json_text(info.name),
            capital: json_number(info.capital.as_ref()),
            employees: json_number(info.employee_number.as_ref()),
            revenue: None,
            website_url: json_text(info.homepage_url),
        })
    }
}

#[derive(Debug, Deserialize)]
struct HojinInfo {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "capital_stock")]
    capital: Option<Value>,
    #[serde(default, rename = "employee-number", alias = "employee_number")]
    employee_number: Option<Value>,
    #[serde(default, rename = "homepage-url", alias = "company_url")]
    homepage_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FinanceResponse {
    #[serde(rename = "finance-infos", default)]
    finance_infos: Vec<Map<String, Value>>,
}

impl FinanceResponse {
    /// Revenue from the first (latest) entry.
    ///
    /// Sales is only consulted when the entry has no `revenue` key at all; an
    /// explicit `"revenue": null` means the registry has no revenue figure.
    fn latest_revenue(&self) -> Option<f64> {
        let latest = self.finance_infos.first()?;
        match latest.get("revenue") {
            Some(revenue) => normalize_json(revenue),
            None => json_number(latest.get("sales")),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
