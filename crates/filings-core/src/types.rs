//! Core data types for filing resolution and indicator extraction.
//!
//! This module defines the fundamental data structures:
//!
//! - [`CandidateFiler`] - One entry of a registry's filing index
//! - [`FilerQuery`] - A company name or filer identifier to resolve
//! - [`MatchResult`] - Outcome of resolving a query against the index
//! - [`RawRow`] - One header-keyed line of a tabular export
//! - [`Indicator`] / [`ExtractedIndicators`] - Indicators pulled from a filing
//! - [`CompanyProfile`] - Corporate registry information
//! - [`CompanyRecord`] - Flat per-company result row

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of related-entity strings kept per document.
pub const MAX_RELATED_ENTITIES: usize = 5;

/// A filing record taken from a registry's filing index.
///
/// Supplied by an index provider per query window and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateFiler {
    /// Registry identifier of the filer (e.g., an EDINET code).
    pub filer_id: String,
    /// Legal name of the filer.
    pub filer_name: String,
    /// Submission time as an ISO-8601 date or date-time string.
    pub submission_timestamp: String,
    /// Registry code of the document category.
    pub document_type_code: String,
    /// Opaque identifier used to request the document content.
    pub document_id: String,
    /// Free-text document description.
    pub document_description: String,
    /// National corporate number, when the registry publishes it.
    pub corporate_number: Option<String>,
}

impl CandidateFiler {
    /// Creates a new candidate filer.
    #[must_use]
    pub fn new(
        filer_id: impl Into<String>,
        filer_name: impl Into<String>,
        submission_timestamp: impl Into<String>,
        document_type_code: impl Into<String>,
        document_id: impl Into<String>,
        document_description: impl Into<String>,
    ) -> Self {
        Self {
            filer_id: filer_id.into(),
            filer_name: filer_name.into(),
            submission_timestamp: submission_timestamp.into(),
            document_type_code: document_type_code.into(),
            document_id: document_id.into(),
            document_description: document_description.into(),
            corporate_number: None,
        }
    }

    /// Sets the national corporate number.
    #[must_use]
    pub fn with_corporate_number(mut self, corporate_number: impl Into<String>) -> Self {
        self.corporate_number = Some(corporate_number.into());
        self
    }
}

/// What the caller asked to resolve.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilerQuery {
    /// Free-text company name, resolved by fuzzy matching.
    Name(String),
    /// Registry filer identifier, resolved by exact match.
    Identifier(String),
}

impl FilerQuery {
    /// Classifies a raw query string.
    ///
    /// Strings shaped like an EDINET code (`E` followed by five digits) are
    /// treated as identifiers; everything else is a name.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_edinet_code(trimmed) {
            Self::Identifier(trimmed.to_string())
        } else {
            Self::Name(trimmed.to_string())
        }
    }

    /// Returns the query text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Name(s) | Self::Identifier(s) => s,
        }
    }
}

fn is_edinet_code(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('E') && s.len() == 6 && chars.all(|c| c.is_ascii_digit())
}

impl fmt::Display for FilerQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for FilerQuery {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for FilerQuery {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

/// Outcome of resolving one query against a filing index.
///
/// A selected filer is present exactly when the similarity reached the
/// selector's threshold; otherwise `failure_reason` explains why.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchResult {
    selected: Option<CandidateFiler>,
    similarity: f64,
    alternatives_considered: usize,
    failure_reason: Option<String>,
}

impl MatchResult {
    /// Creates a successful match.
    #[must_use]
    pub const fn matched(
        filer: CandidateFiler,
        similarity: f64,
        alternatives_considered: usize,
    ) -> Self {
        Self {
            selected: Some(filer),
            similarity,
            alternatives_considered,
            failure_reason: None,
        }
    }

    /// Creates a failed match carrying the best score that was achieved.
    #[must_use]
    pub fn unmatched(best_score: f64, reason: impl Into<String>) -> Self {
        Self {
            selected: None,
            similarity: best_score,
            alternatives_considered: 0,
            failure_reason: Some(reason.into()),
        }
    }

    /// Returns the selected filer, if any.
    #[must_use]
    pub const fn selected_filer(&self) -> Option<&CandidateFiler> {
        self.selected.as_ref()
    }

    /// Consumes the result and returns the selected filer, if any.
    #[must_use]
    pub fn into_selected(self) -> Option<CandidateFiler> {
        self.selected
    }

    /// Similarity of the winner, or the best score achieved on failure.
    #[must_use]
    pub const fn similarity(&self) -> f64 {
        self.similarity
    }

    /// Number of other candidates that also cleared the threshold.
    #[must_use]
    pub const fn alternatives_considered(&self) -> usize {
        self.alternatives_considered
    }

    /// Why no filer was selected.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns true if a filer was selected.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        self.selected.is_some()
    }
}

/// One data line of a tabular export, keyed by header label.
///
/// Column order follows the header. Inserting an existing label replaces the
/// value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Sets the value for a column label.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((label, value)),
        }
    }

    /// Returns the cell for a column label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates `(label, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }
}

impl<L: Into<String>, V: Into<String>> FromIterator<(L, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (label, value) in iter {
            row.insert(label, value);
        }
        row
    }
}

/// Indicators extracted from a filing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// Net sales or operating revenue.
    Revenue,
    /// Capital stock.
    Capital,
    /// Number of employees.
    EmployeeCount,
}

impl Indicator {
    /// All indicators in report order.
    pub const ALL: [Self; 3] = [Self::Revenue, Self::Capital, Self::EmployeeCount];

    /// Returns the snake-case name of this indicator.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Capital => "capital",
            Self::EmployeeCount => "employee_count",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Indicator values extracted from one document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedIndicators {
    /// Revenue for the current period.
    pub revenue: Option<f64>,
    /// Capital stock.
    pub capital: Option<f64>,
    /// Number of employees.
    pub employee_count: Option<f64>,
    related_entities: Vec<String>,
}

impl ExtractedIndicators {
    /// Creates an empty indicator set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            revenue: None,
            capital: None,
            employee_count: None,
            related_entities: Vec::new(),
        }
    }

    /// Returns the value of an indicator.
    #[must_use]
    pub const fn get(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::Revenue => self.revenue,
            Indicator::Capital => self.capital,
            Indicator::EmployeeCount => self.employee_count,
        }
    }

    /// Sets the value of an indicator.
    pub fn set(&mut self, indicator: Indicator, value: f64) {
        match indicator {
            Indicator::Revenue => self.revenue = Some(value),
            Indicator::Capital => self.capital = Some(value),
            Indicator::EmployeeCount => self.employee_count = Some(value),
        }
    }

    /// Records a related entity.
    ///
    /// Duplicates and entries beyond [`MAX_RELATED_ENTITIES`] are ignored.
    /// Returns true if the entity was added.
    pub fn push_related_entity(&mut self, entity: impl Into<String>) -> bool {
        let entity = entity.into();
        if self.related_entities.len() >= MAX_RELATED_ENTITIES
            || self.related_entities.contains(&entity)
        {
            return false;
        }
        self.related_entities.push(entity);
        true
    }

    /// Related entities in first-seen order.
    #[must_use]
    pub fn related_entities(&self) -> &[String] {
        &self.related_entities
    }

    /// Returns true if no indicator value and no related entity was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Indicator::ALL.iter().all(|i| self.get(*i).is_none()) && self.related_entities.is_empty()
    }
}

/// Corporate registry information for one legal entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// 13-digit national corporate number.
    pub corporate_number: String,
    /// Registered company name.
    pub company_name: Option<String>,
    /// Capital stock.
    pub capital: Option<f64>,
    /// Number of employees.
    pub employees: Option<f64>,
    /// Latest reported revenue.
    pub revenue: Option<f64>,
    /// Company website.
    pub website_url: Option<String>,
}

impl CompanyProfile {
    /// Creates an empty profile for a corporate number.
    #[must_use]
    pub fn new(corporate_number: impl Into<String>) -> Self {
        Self {
            corporate_number: corporate_number.into(),
            ..Default::default()
        }
    }
}

fn or_missing<T: fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "データなし".to_string(), ToString::to_string)
}

impl fmt::Display for CompanyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "企業情報調査結果")?;
        writeln!(f, "================")?;
        writeln!(f, "法人番号: {}", self.corporate_number)?;
        writeln!(f, "会社名: {}", or_missing(self.company_name.as_ref()))?;
        writeln!(f, "資本金: {}", or_missing(self.capital.as_ref()))?;
        writeln!(f, "従業員数: {}", or_missing(self.employees.as_ref()))?;
        writeln!(f, "売上高: {}", or_missing(self.revenue.as_ref()))?;
        write!(f, "WebサイトURL: {}", or_missing(self.website_url.as_ref()))
    }
}

/// Flat per-company result, one row of a research report.
///
/// A failed company keeps every indicator absent and carries `error`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// The query as given by the caller.
    pub query: String,
    /// Registry identifier of the selected filer.
    pub filer_id: Option<String>,
    /// Name of the selected filer.
    pub filer_name: Option<String>,
    /// National corporate number of the selected filer.
    pub corporate_number: Option<String>,
    /// Identifier of the document the indicators came from.
    pub document_id: Option<String>,
    /// Submission time of that document.
    pub submission_timestamp: Option<String>,
    /// Name similarity of the selected filer.
    pub similarity: Option<f64>,
    /// Revenue for the current period.
    pub revenue: Option<f64>,
    /// Capital stock.
    pub capital: Option<f64>,
    /// Number of employees.
    pub employee_count: Option<f64>,
    /// Related entities in first-seen order.
    pub related_entities: Vec<String>,
    /// Company website, from the corporate registry.
    pub website_url: Option<String>,
    /// Failure description for companies that could not be processed.
    pub error: Option<String>,
}

impl CompanyRecord {
    /// Creates an empty record for a query.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Creates a failed record.
    #[must_use]
    pub fn failed(query: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Fills the filer columns from a selected filing.
    #[must_use]
    pub fn with_filer(mut self, filer: &CandidateFiler, similarity: f64) -> Self {
        self.filer_id = Some(filer.filer_id.clone());
        self.filer_name = Some(filer.filer_name.clone());
        self.corporate_number.clone_from(&filer.corporate_number);
        self.document_id = Some(filer.document_id.clone());
        self.submission_timestamp = Some(filer.submission_timestamp.clone());
        self.similarity = Some(similarity);
        self
    }

    /// Fills the indicator columns.
    #[must_use]
    pub fn with_indicators(mut self, indicators: &ExtractedIndicators) -> Self {
        self.revenue = indicators.revenue;
        self.capital = indicators.capital;
        self.employee_count = indicators.employee_count;
        self.related_entities = indicators.related_entities().to_vec();
        self
    }

    /// Fills indicators still missing from a corporate registry profile.
    #[must_use]
    pub fn backfill_from_profile(mut self, profile: &CompanyProfile) -> Self {
        self.revenue = self.revenue.or(profile.revenue);
        self.capital = self.capital.or(profile.capital);
        self.employee_count = self.employee_count.or(profile.employees);
        if self.website_url.is_none() {
            self.website_url.clone_from(&profile.website_url);
        }
        if self.corporate_number.is_none() {
            self.corporate_number = Some(profile.corporate_number.clone());
        }
        self
    }

    /// Records a failure, clearing every indicator column.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.revenue = None;
        self.capital = None;
        self.employee_count = None;
        self.related_entities.clear();
        self.error = Some(error.into());
        self
    }

    /// Returns true if the company was processed without error.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Related entities joined into one cell.
    #[must_use]
    pub fn related_entities_joined(&self) -> String {
        self.related_entities.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filer_query_parse() {
        assert_eq!(
            FilerQuery::parse("E01777"),
            FilerQuery::Identifier("E01777".to_string())
        );
        assert_eq!(
            FilerQuery::parse(" 富士通 "),
            FilerQuery::Name("富士通".to_string())
        );
        assert_eq!(
            FilerQuery::parse("E0177"),
            FilerQuery::Name("E0177".to_string())
        );
        assert_eq!(
            FilerQuery::parse("Ex1777"),
            FilerQuery::Name("Ex1777".to_string())
        );
    }

    #[test]
    fn test_match_result_invariants() {
        let filer = CandidateFiler::new("E01777", "富士通株式会社", "2024-06-24 09:00", "120", "S100TEST", "");
        let result = MatchResult::matched(filer.clone(), 0.6, 0);
        assert!(result.is_match());
        assert_eq!(result.selected_filer(), Some(&filer));
        assert!(result.failure_reason().is_none());

        let failed = MatchResult::unmatched(0.3, "best score 0.300");
        assert!(!failed.is_match());
        assert_eq!(failed.similarity(), 0.3);
        assert_eq!(failed.failure_reason(), Some("best score 0.300"));
    }

    #[test]
    fn test_raw_row_insert_replaces_in_place() {
        let mut row = RawRow::new();
        row.insert("a", "1");
        row.insert("b", "2");
        row.insert("a", "3");

        assert_eq!(row.len(), 2);
        assert_eq!(row.get("a"), Some("3"));
        let labels: Vec<&str> = row.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_related_entities_capped_and_unique() {
        let mut indicators = ExtractedIndicators::new();
        assert!(indicators.push_related_entity("子会社A"));
        assert!(!indicators.push_related_entity("子会社A"));
        for i in 0..10 {
            indicators.push_related_entity(format!("子会社{i}"));
        }
        assert_eq!(indicators.related_entities().len(), MAX_RELATED_ENTITIES);
        assert_eq!(indicators.related_entities()[0], "子会社A");
    }

    #[test]
    fn test_record_backfill_keeps_filing_values() {
        let mut indicators = ExtractedIndicators::new();
        indicators.set(Indicator::Revenue, 100.0);
        let profile = CompanyProfile {
            revenue: Some(999.0),
            capital: Some(50.0),
            website_url: Some("https://example.co.jp".to_string()),
            ..CompanyProfile::new("1234567890123")
        };

        let record = CompanyRecord::new("テスト")
            .with_indicators(&indicators)
            .backfill_from_profile(&profile);

        assert_eq!(record.revenue, Some(100.0));
        assert_eq!(record.capital, Some(50.0));
        assert_eq!(record.corporate_number.as_deref(), Some("1234567890123"));
        assert!(record.is_success());
    }

    #[test]
    fn test_failed_record_has_no_indicators() {
        let record = CompanyRecord::new("x")
            .with_indicators(&ExtractedIndicators {
                revenue: Some(1.0),
                ..Default::default()
            })
            .with_error("download failed");
        assert!(record.revenue.is_none());
        assert!(!record.is_success());
    }

    #[test]
    fn test_profile_display() {
        let profile = CompanyProfile {
            company_name: Some("トヨタ自動車株式会社".to_string()),
            capital: Some(635_401_000_000.0),
            ..CompanyProfile::new("5180301018771")
        };
        let text = profile.to_string();
        assert!(text.starts_with("企業情報調査結果"));
        assert!(text.contains("会社名: トヨタ自動車株式会社"));
        assert!(text.contains("資本金: 635401000000"));
        assert!(text.contains("従業員数: データなし"));
    }
}
