//! Company research orchestration over registered registry providers.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use filings_core::{
    CandidateFiler, CompanyProfile, CompanyRecord, CorporateInfoProvider, DocumentProvider,
    ExtractedIndicators, FilerQuery, FilingCache, FilingError, FilingIndexProvider, MatchResult,
    ResearchConfig, Result,
};
use filings_match::ReportSelector;

/// Resolves company names to filings and extracts their indicators.
///
/// Providers are registered per role (filing index, document, corporate
/// registry) and tried in order until one succeeds. An optional cache sits in
/// front of index and document fetches.
///
/// # Example
///
/// ```rust,ignore
/// use filings::CompanyResearcher;
/// use chrono::NaiveDate;
///
/// let researcher = CompanyResearcher::new()
///     .with_edinet("edinet_subscription_key")?
///     .with_gbiz("gbiz_api_token")?;
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 24).unwrap();
/// let records = researcher.research_batch(&["富士通", "トヨタ自動車"], day, day).await;
/// let report = filings::records_to_dataframe(&records)?;
/// ```
#[derive(Default)]
pub struct CompanyResearcher {
    index_providers: Vec<Arc<dyn FilingIndexProvider>>,
    document_providers: Vec<Arc<dyn DocumentProvider>>,
    corporate_providers: Vec<Arc<dyn CorporateInfoProvider>>,
    cache: Option<Arc<dyn FilingCache>>,
    config: ResearchConfig,
}

impl std::fmt::Debug for CompanyResearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompanyResearcher")
            .field(
                "index_providers",
                &self
                    .index_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "document_providers",
                &self
                    .document_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "corporate_providers",
                &self
                    .corporate_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .field("config", &self.config)
            .finish()
    }
}

impl CompanyResearcher {
    /// Create a researcher with no providers and the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new researcher with a cache.
    #[must_use]
    pub fn with_cache(cache: Arc<dyn FilingCache>) -> Self {
        Self {
            cache: Some(cache),
            ..Default::default()
        }
    }

    /// Set the cache for this researcher.
    #[must_use]
    pub fn set_cache(mut self, cache: Arc<dyn FilingCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the research configuration.
    #[must_use]
    pub fn with_config(mut self, config: ResearchConfig) -> Self {
        self.config = config;
        self
    }

    /// The active research configuration.
    #[must_use]
    pub const fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Register a filing index provider.
    pub fn register_index(&mut self, provider: Arc<dyn FilingIndexProvider>) {
        debug!(provider = provider.name(), "Registering index provider");
        self.index_providers.push(provider);
    }

    /// Register a document provider.
    pub fn register_document(&mut self, provider: Arc<dyn DocumentProvider>) {
        debug!(provider = provider.name(), "Registering document provider");
        self.document_providers.push(provider);
    }

    /// Register a corporate registry provider.
    pub fn register_corporate(&mut self, provider: Arc<dyn CorporateInfoProvider>) {
        debug!(provider = provider.name(), "Registering corporate provider");
        self.corporate_providers.push(provider);
    }

    /// Fetch every filing submitted between `start` and `end`, inclusive.
    ///
    /// Each index provider is tried in turn. Within a provider, cached days are
    /// served from the cache and isolated failed days are skipped with a
    /// warning. A provider that is rate limited, rejects the credentials or
    /// fails on every day is abandoned for the next one.
    ///
    /// # Errors
    /// Returns an error if no index provider is registered, the range is
    /// inverted, or every provider fails.
    #[instrument(skip(self), fields(start = %start, end = %end))]
    pub async fn fetch_candidates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CandidateFiler>> {
        if self.index_providers.is_empty() {
            return Err(FilingError::ProviderNotConfigured(
                "No index providers registered".to_string(),
            ));
        }
        if start > end {
            return Err(FilingError::InvalidParameter(format!(
                "start date {start} is after end date {end}"
            )));
        }

        let mut last_error = None;
        for provider in &self.index_providers {
            match self.crawl_index(provider.as_ref(), start, end).await {
                Ok(candidates) => {
                    debug!(
                        provider = provider.name(),
                        count = candidates.len(),
                        "Fetched candidates"
                    );
                    return Ok(candidates);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| FilingError::Other("All providers failed with no error".to_string())))
    }

    /// Crawl one provider's index day by day through the cache.
    ///
    /// A day that fails with a transport or parse error is skipped, but the
    /// crawl fails with the last such error when no day succeeded. Rate limiting
    /// and authentication failures abandon the provider at once. Days from today
    /// on are not cached while their index is still filling up.
    async fn crawl_index(
        &self,
        provider: &dyn FilingIndexProvider,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CandidateFiler>> {
        let today = Local::now().date_naive();
        let mut candidates = Vec::new();
        let mut days_ok = 0usize;
        let mut last_error = None;

        for date in start.iter_days().take_while(|d| *d <= end) {
            if let Some(cache) = &self.cache
                && let Ok(Some(cached)) = cache.get_index(provider.name(), date).await
            {
                debug!(provider = provider.name(), %date, "Cache hit for filing index");
                candidates.extend(cached);
                days_ok += 1;
                continue;
            }

            match provider.fetch_filing_index(date).await {
                Ok(day) => {
                    if date < today
                        && let Some(cache) = &self.cache
                        && let Err(e) = cache.put_index(provider.name(), date, &day).await
                    {
                        warn!(
                            provider = provider.name(),
                            error = %e,
                            "Failed to cache filing index"
                        );
                    }
                    candidates.extend(day);
                    days_ok += 1;
                }
                Err(
                    e @ (FilingError::AuthenticationFailed(_) | FilingError::RateLimited { .. }),
                ) => return Err(e),
                Err(e) => {
                    warn!(provider = provider.name(), %date, error = %e, "Skipping day");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if days_ok == 0 => Err(e),
            _ => Ok(candidates),
        }
    }

    /// Pick the filing that best answers `query` among `candidates`.
    #[must_use]
    pub fn find_filing(&self, query: &FilerQuery, candidates: &[CandidateFiler]) -> MatchResult {
        ReportSelector::from_config(&self.config).select(query, candidates)
    }

    /// Fetch the tabular export of a document, trying providers in order.
    ///
    /// If a cache is configured, it will be checked first and the decoded text
    /// will be cached on success.
    ///
    /// # Errors
    /// Returns an error if no document provider is registered or every
    /// provider fails.
    pub async fn fetch_document(&self, document_id: &str) -> Result<String> {
        if self.document_providers.is_empty() {
            return Err(FilingError::ProviderNotConfigured(
                "No document providers registered".to_string(),
            ));
        }

        // Check cache first
        if let Some(cache) = &self.cache {
            for provider in &self.document_providers {
                if let Ok(Some(cached)) = cache.get_document(provider.name(), document_id).await {
                    debug!(
                        provider = provider.name(),
                        document_id,
                        "Cache hit for document"
                    );
                    return Ok(cached);
                }
            }
        }

        // Try each provider in order
        let mut last_error = None;
        for provider in &self.document_providers {
            debug!(provider = provider.name(), document_id, "Fetching document");

            match provider.fetch_tabular_document(document_id).await {
                Ok(text) => {
                    // Cache the result
                    if let Some(cache) = &self.cache
                        && let Err(e) = cache.put_document(provider.name(), document_id, &text).await
                    {
                        warn!(
                            provider = provider.name(),
                            error = %e,
                            "Failed to cache document"
                        );
                    }
                    return Ok(text);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| FilingError::Other("All providers failed with no error".to_string())))
    }

    /// Fetch a document and extract its indicators.
    ///
    /// # Errors
    /// Returns an error if the document cannot be fetched or its table is
    /// malformed.
    #[instrument(skip(self))]
    pub async fn extract_document(&self, document_id: &str) -> Result<ExtractedIndicators> {
        let text = self.fetch_document(document_id).await?;
        let indicators = filings_xbrl::extract_from_text(&text, &self.config)?;
        debug!(
            revenue = ?indicators.revenue,
            capital = ?indicators.capital,
            employees = ?indicators.employee_count,
            related = indicators.related_entities().len(),
            "Extracted indicators"
        );
        Ok(indicators)
    }

    /// Fetch a corporate registry profile, trying providers in order.
    ///
    /// # Errors
    /// Returns an error if no corporate provider is registered or every
    /// provider fails.
    pub async fn company_profile(&self, corporate_number: &str) -> Result<CompanyProfile> {
        if self.corporate_providers.is_empty() {
            return Err(FilingError::ProviderNotConfigured(
                "No corporate providers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.corporate_providers {
            match provider.company_profile(corporate_number).await {
                Ok(profile) => return Ok(profile),
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| FilingError::Other("All providers failed with no error".to_string())))
    }

    /// Research one company over the filings submitted between `start` and `end`.
    ///
    /// Never fails: problems are reported in the record's `error` column.
    pub async fn research(&self, query: &str, start: NaiveDate, end: NaiveDate) -> CompanyRecord {
        match self.fetch_candidates(start, end).await {
            Ok(candidates) => self.research_among(query, &candidates).await,
            Err(e) => CompanyRecord::failed(query, e.to_string()),
        }
    }

    /// Research several companies against one crawl of the filing index.
    ///
    /// Records come back in query order. Up to `config.concurrency` companies
    /// are processed at a time and a failure only affects its own record.
    pub async fn research_batch<S: AsRef<str>>(
        &self,
        queries: &[S],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<CompanyRecord> {
        let candidates = match self.fetch_candidates(start, end).await {
            Ok(candidates) => candidates,
            Err(e) => {
                let error = e.to_string();
                return queries
                    .iter()
                    .map(|q| CompanyRecord::failed(q.as_ref(), error.clone()))
                    .collect();
            }
        };

        let records: Vec<CompanyRecord> = stream::iter(queries)
            .map(|q| self.research_among(q.as_ref(), &candidates))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let succeeded = records.iter().filter(|r| r.is_success()).count();
        info!(
            total = records.len(),
            succeeded,
            "Batch research finished"
        );
        records
    }

    /// Research one company against an already fetched candidate list.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub async fn research_among(&self, query: &str, candidates: &[CandidateFiler]) -> CompanyRecord {
        let result = self.find_filing(&FilerQuery::parse(query), candidates);
        let similarity = result.similarity();

        let reason = result.failure_reason().map(str::to_string);

        let Some(filer) = result.into_selected() else {
            let reason = reason.unwrap_or_else(|| format!("no filing matched {query:?}"));
            let mut record = CompanyRecord::failed(query, reason);
            record.similarity = Some(similarity);
            return record;
        };

        let record = CompanyRecord::new(query).with_filer(&filer, similarity);
        let record = match self.extract_document(&filer.document_id).await {
            Ok(indicators) => record.with_indicators(&indicators),
            Err(e) => {
                warn!(document_id = %filer.document_id, error = %e, "Extraction failed");
                return record.with_error(e.to_string());
            }
        };

        self.backfill(record).await
    }

    /// Fill indicators the filing lacked from the corporate registry.
    async fn backfill(&self, record: CompanyRecord) -> CompanyRecord {
        let complete = record.revenue.is_some()
            && record.capital.is_some()
            && record.employee_count.is_some()
            && record.website_url.is_some();
        if complete || self.corporate_providers.is_empty() {
            return record;
        }

        let Some(corporate_number) = record.corporate_number.clone() else {
            return record;
        };

        match self.company_profile(&corporate_number).await {
            Ok(profile) => record.backfill_from_profile(&profile),
            Err(e) => {
                warn!(corporate_number = %corporate_number, error = %e, "Corporate registry lookup failed");
                record
            }
        }
    }

    // Builder methods for easy setup with specific providers

    /// Add the EDINET provider for filing indexes and documents.
    ///
    /// # Errors
    /// Returns an error if the provider's HTTP client cannot be built.
    #[cfg(feature = "edinet")]
    pub fn with_edinet(mut self, api_key: &str) -> Result<Self> {
        let provider = Arc::new(filings_edinet::EdinetProvider::new(api_key)?);
        self.register_index(provider.clone());
        self.register_document(provider);
        Ok(self)
    }

    /// Add the gBizINFO corporate registry provider.
    ///
    /// # Errors
    /// Returns an error if the provider's HTTP client cannot be built.
    #[cfg(feature = "gbiz")]
    pub fn with_gbiz(mut self, api_key: &str) -> Result<Self> {
        let provider = Arc::new(filings_gbiz::GBizInfoProvider::new(api_key)?);
        self.register_corporate(provider);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use filings_cache::InMemoryCache;
    use filings_core::FilingSource;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FUJITSU_EXPORT: &str = "\u{feff}\"要素ID\",\"項目名\",\"コンテキストID\",\"相対年度\",\"連結・個別\",\"値\"\r\n\
        \"jpcrp_cor:NetSalesSummaryOfBusinessResults\",\"売上収益\",\"CurrentYearDuration\",\"当期\",\"連結\",\"3,756,000\"\r\n\
        \"jpcrp_cor:NetSalesSummaryOfBusinessResults\",\"売上収益\",\"Prior1YearDuration\",\"前期\",\"連結\",\"3,713,000\"\r\n\
        \"jpcrp_cor:NumberOfEmployees\",\"従業員数\",\"CurrentYearInstant\",\"当期末\",\"連結\",\"124,055\"\r\n";

    #[derive(Debug, Default)]
    struct StubIndex {
        filings: Vec<CandidateFiler>,
        calls: AtomicUsize,
        unauthorized: bool,
        rate_limited: bool,
        unreachable: bool,
        failing_day: Option<NaiveDate>,
    }

    impl FilingSource for StubIndex {
        fn name(&self) -> &str {
            "stub-index"
        }

        fn description(&self) -> &str {
            "fixed filing list"
        }
    }

    #[async_trait]
    impl FilingIndexProvider for StubIndex {
        async fn fetch_filing_index(&self, date: NaiveDate) -> Result<Vec<CandidateFiler>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.unauthorized {
                return Err(FilingError::AuthenticationFailed("stub-index".to_string()));
            }
            if self.rate_limited {
                return Err(FilingError::RateLimited {
                    provider: "stub-index".to_string(),
                    retry_after: None,
                });
            }
            if self.unreachable || self.failing_day == Some(date) {
                return Err(FilingError::Network("connection refused".to_string()));
            }
            Ok(self.filings.clone())
        }
    }

    #[derive(Debug, Default)]
    struct StubDocuments {
        documents: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl FilingSource for StubDocuments {
        fn name(&self) -> &str {
            "stub-documents"
        }

        fn description(&self) -> &str {
            "in-memory exports"
        }
    }

    #[async_trait]
    impl DocumentProvider for StubDocuments {
        async fn fetch_tabular_document(&self, document_id: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.documents
                .get(document_id)
                .cloned()
                .ok_or_else(|| FilingError::DocumentNotFound(document_id.to_string()))
        }
    }

    #[derive(Debug)]
    struct StubRegistry;

    impl FilingSource for StubRegistry {
        fn name(&self) -> &str {
            "stub-registry"
        }

        fn description(&self) -> &str {
            "fixed profile"
        }
    }

    #[async_trait]
    impl CorporateInfoProvider for StubRegistry {
        async fn company_profile(&self, corporate_number: &str) -> Result<CompanyProfile> {
            Ok(CompanyProfile {
                corporate_number: corporate_number.to_string(),
                company_name: Some("富士通株式会社".to_string()),
                capital: Some(325_638_000_000.0),
                employees: Some(1.0),
                revenue: Some(2.0),
                website_url: Some("https://www.fujitsu.com/jp/".to_string()),
            })
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 24).unwrap()
    }

    fn filings() -> Vec<CandidateFiler> {
        vec![
            CandidateFiler::new(
                "E01801",
                "株式会社富士通ゼネラル",
                "2024-06-20 15:00",
                "120",
                "S100GENL",
                "有価証券報告書",
            ),
            CandidateFiler::new(
                "E01777",
                "富士通株式会社",
                "2024-06-24 09:00",
                "120",
                "S100TXYZ",
                "有価証券報告書－第124期",
            )
            .with_corporate_number("1020001071491"),
            CandidateFiler::new(
                "E01777",
                "富士通株式会社",
                "2024-06-24 09:05",
                "140",
                "S100QUAR",
                "四半期報告書",
            ),
        ]
    }

    fn stubs() -> (Arc<StubIndex>, Arc<StubDocuments>) {
        let index = Arc::new(StubIndex {
            filings: filings(),
            ..Default::default()
        });
        let documents = Arc::new(StubDocuments {
            documents: HashMap::from([("S100TXYZ".to_string(), FUJITSU_EXPORT.to_string())]),
            ..Default::default()
        });
        (index, documents)
    }

    fn researcher(index: Arc<StubIndex>, documents: Arc<StubDocuments>) -> CompanyResearcher {
        let mut researcher = CompanyResearcher::new();
        researcher.register_index(index);
        researcher.register_document(documents);
        researcher
    }

    #[tokio::test]
    async fn test_research_end_to_end() {
        let (index, documents) = stubs();
        let researcher = researcher(index, documents);

        let record = researcher.research("富士通", day(), day()).await;

        assert!(record.is_success(), "{:?}", record.error);
        assert_eq!(record.filer_id.as_deref(), Some("E01777"));
        assert_eq!(record.document_id.as_deref(), Some("S100TXYZ"));
        assert_eq!(record.corporate_number.as_deref(), Some("1020001071491"));
        assert!((record.similarity.unwrap() - 0.6).abs() < 1e-9);
        assert_eq!(record.revenue, Some(3_756_000.0));
        assert_eq!(record.employee_count, Some(124_055.0));
        assert_eq!(record.capital, None);
        assert_eq!(record.website_url, None);
    }

    #[tokio::test]
    async fn test_research_by_identifier() {
        let (index, documents) = stubs();
        let researcher = researcher(index, documents);

        let record = researcher.research("E01777", day(), day()).await;
        assert!(record.is_success());
        assert_eq!(record.similarity, Some(1.0));
        assert_eq!(record.document_id.as_deref(), Some("S100TXYZ"));
    }

    #[tokio::test]
    async fn test_unmatched_query_reports_best_score() {
        let (index, documents) = stubs();
        let researcher = researcher(index, documents);

        let record = researcher.research("ソニーグループ", day(), day()).await;

        assert!(!record.is_success());
        assert!(record.error.as_deref().unwrap().contains("best score"));
        assert!(record.filer_id.is_none());
        assert!(record.revenue.is_none());
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_isolates_failures() {
        let (index, documents) = stubs();
        let researcher = researcher(index.clone(), documents)
            .with_config(ResearchConfig::default().with_concurrency(2));

        let records = researcher
            .research_batch(&["富士通", "ゼネラル", "ソニーグループ"], day(), day())
            .await;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].query, "富士通");
        assert!(records[0].is_success());

        // Matches the other filer, whose document is missing
        assert_eq!(records[1].query, "ゼネラル");
        assert_eq!(records[1].filer_id.as_deref(), Some("E01801"));
        assert!(records[1].error.as_deref().unwrap().contains("S100GENL"));
        assert!(records[1].revenue.is_none());

        assert_eq!(records[2].query, "ソニーグループ");
        assert!(!records[2].is_success());

        // One index crawl for the whole batch
        assert_eq!(index.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backfill_from_corporate_registry() {
        let (index, documents) = stubs();
        let mut researcher = researcher(index, documents);
        researcher.register_corporate(Arc::new(StubRegistry));

        let record = researcher.research("富士通", day(), day()).await;

        // Filing values win, gaps come from the registry
        assert_eq!(record.revenue, Some(3_756_000.0));
        assert_eq!(record.employee_count, Some(124_055.0));
        assert_eq!(record.capital, Some(325_638_000_000.0));
        assert_eq!(
            record.website_url.as_deref(),
            Some("https://www.fujitsu.com/jp/")
        );
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_lookups() {
        let (index, documents) = stubs();
        let mut researcher = CompanyResearcher::with_cache(Arc::new(InMemoryCache::new()));
        researcher.register_index(index.clone());
        researcher.register_document(documents.clone());

        let first = researcher.research("富士通", day(), day()).await;
        let second = researcher.research("富士通", day(), day()).await;

        assert_eq!(first, second);
        assert_eq!(index.calls.load(Ordering::SeqCst), 1);
        assert_eq!(documents.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_candidates_over_range() {
        let (index, documents) = stubs();
        let researcher = researcher(index.clone(), documents);
        let end = NaiveDate::from_ymd_opt(2024, 6, 26).unwrap();

        let candidates = researcher.fetch_candidates(day(), end).await.unwrap();
        assert_eq!(candidates.len(), 9);
        assert_eq!(index.calls.load(Ordering::SeqCst), 3);

        assert!(matches!(
            researcher.fetch_candidates(end, day()).await,
            Err(FilingError::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_authentication_failure_falls_back_to_next_provider() {
        let (index, documents) = stubs();
        let mut researcher = CompanyResearcher::new();
        researcher.register_index(Arc::new(StubIndex {
            unauthorized: true,
            ..Default::default()
        }));
        researcher.register_index(index);
        researcher.register_document(documents);

        let candidates = researcher.fetch_candidates(day(), day()).await.unwrap();
        assert_eq!(candidates.len(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_index_reports_transport_error() {
        let (_, documents) = stubs();
        let index = Arc::new(StubIndex {
            unreachable: true,
            ..Default::default()
        });
        let researcher = researcher(index, documents);

        assert!(matches!(
            researcher.fetch_candidates(day(), day()).await,
            Err(FilingError::Network(_))
        ));

        let record = researcher.research("富士通", day(), day()).await;
        let error = record.error.as_deref().unwrap();
        assert!(error.contains("connection refused"), "{error}");
        assert!(!error.contains("best score"), "{error}");
        assert!(record.similarity.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_provider_falls_back_to_next() {
        let (index, documents) = stubs();
        let unreachable = Arc::new(StubIndex {
            unreachable: true,
            ..Default::default()
        });
        let mut researcher = CompanyResearcher::new();
        researcher.register_index(unreachable.clone());
        researcher.register_index(index);
        researcher.register_document(documents);

        let end = NaiveDate::from_ymd_opt(2024, 6, 25).unwrap();
        let candidates = researcher.fetch_candidates(day(), end).await.unwrap();
        assert_eq!(candidates.len(), 6);
        assert_eq!(unreachable.calls.load(Ordering::SeqCst), 2);

        let record = researcher.research("富士通", day(), day()).await;
        assert!(record.is_success(), "{:?}", record.error);
    }

    #[tokio::test]
    async fn test_rate_limited_provider_is_abandoned() {
        let (index, documents) = stubs();
        let limited = Arc::new(StubIndex {
            rate_limited: true,
            ..Default::default()
        });
        let mut researcher = CompanyResearcher::new();
        researcher.register_index(limited.clone());
        researcher.register_index(index);
        researcher.register_document(documents);

        let end = NaiveDate::from_ymd_opt(2024, 6, 26).unwrap();
        let candidates = researcher.fetch_candidates(day(), end).await.unwrap();
        assert_eq!(candidates.len(), 9);
        // Gives up on the first refusal instead of thinning the window
        assert_eq!(limited.calls.load(Ordering::SeqCst), 1);

        let mut only_limited = CompanyResearcher::new();
        only_limited.register_index(Arc::new(StubIndex {
            rate_limited: true,
            ..Default::default()
        }));
        assert!(matches!(
            only_limited.fetch_candidates(day(), end).await,
            Err(FilingError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn test_isolated_failed_day_is_skipped() {
        let (_, documents) = stubs();
        let index = Arc::new(StubIndex {
            filings: filings(),
            failing_day: NaiveDate::from_ymd_opt(2024, 6, 25),
            ..Default::default()
        });
        let researcher = researcher(index.clone(), documents);

        let end = NaiveDate::from_ymd_opt(2024, 6, 26).unwrap();
        let candidates = researcher.fetch_candidates(day(), end).await.unwrap();
        assert_eq!(candidates.len(), 6);
        assert_eq!(index.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unmatched_record_keeps_selector_reason() {
        let (_, documents) = stubs();
        let index = Arc::new(StubIndex {
            filings: filings()
                .into_iter()
                .filter(|f| f.document_type_code != "120")
                .collect(),
            ..Default::default()
        });
        let researcher = researcher(index, documents);

        let record = researcher.research("富士通", day(), day()).await;
        let error = record.error.as_deref().unwrap();
        assert!(error.contains("document type 120"), "{error}");
        assert_eq!(record.similarity, Some(0.0));
    }

    #[tokio::test]
    async fn test_todays_index_is_not_cached() {
        let (index, documents) = stubs();
        let cache = Arc::new(InMemoryCache::new());
        let mut researcher = CompanyResearcher::with_cache(cache.clone());
        researcher.register_index(index.clone());
        researcher.register_document(documents);

        let today = Local::now().date_naive();
        researcher.fetch_candidates(today, today).await.unwrap();
        researcher.fetch_candidates(today, today).await.unwrap();
        assert_eq!(index.calls.load(Ordering::SeqCst), 2);
        assert!(cache.get_index("stub-index", today).await.unwrap().is_none());

        researcher.fetch_candidates(day(), day()).await.unwrap();
        researcher.fetch_candidates(day(), day()).await.unwrap();
        assert_eq!(index.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_providers_configured() {
        let researcher = CompanyResearcher::new();

        assert!(matches!(
            researcher.fetch_candidates(day(), day()).await,
            Err(FilingError::ProviderNotConfigured(_))
        ));
        assert!(matches!(
            researcher.extract_document("S100TXYZ").await,
            Err(FilingError::ProviderNotConfigured(_))
        ));

        let records = researcher.research_batch(&["富士通", "トヨタ"], day(), day()).await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.is_success()));
        assert_eq!(records[1].query, "トヨタ");
    }

    #[tokio::test]
    async fn test_malformed_document_is_reported() {
        let (index, _) = stubs();
        let documents = Arc::new(StubDocuments {
            documents: HashMap::from([("S100TXYZ".to_string(), "\"要素ID\"".to_string())]),
            ..Default::default()
        });
        let researcher = researcher(index, documents);

        let record = researcher.research("富士通", day(), day()).await;
        assert_eq!(record.filer_id.as_deref(), Some("E01777"));
        assert!(record.error.as_deref().unwrap().contains("Malformed table"));
    }

    #[test]
    fn test_debug_lists_providers() {
        let (index, documents) = stubs();
        let researcher = researcher(index, documents);
        let debug = format!("{researcher:?}");

        assert!(debug.contains("stub-index"));
        assert!(debug.contains("stub-documents"));
    }
}
