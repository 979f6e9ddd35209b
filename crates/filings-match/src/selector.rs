//! Selection of the single best filing for a query.

use filings_core::{
    CandidateFiler, DEFAULT_MIN_SIMILARITY, FilerQuery, MatchResult, ResearchConfig,
    SECURITIES_REPORT_DOC_TYPE,
};
use tracing::debug;

use crate::similarity::NameMatcher;

/// Picks one filing out of a filing index.
///
/// Candidates are restricted to one document type and ranked by name
/// similarity; exact ties go to the latest submission.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportSelector {
    target_doc_type: String,
    min_similarity: f64,
}

impl Default for ReportSelector {
    fn default() -> Self {
        Self::new(SECURITIES_REPORT_DOC_TYPE)
    }
}

impl ReportSelector {
    /// Creates a selector for a document-type code with the default threshold.
    #[must_use]
    pub fn new(target_doc_type: impl Into<String>) -> Self {
        Self {
            target_doc_type: target_doc_type.into(),
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }

    /// Creates a selector from a research configuration.
    #[must_use]
    pub fn from_config(config: &ResearchConfig) -> Self {
        Self::new(config.target_doc_type.clone()).with_min_similarity(config.min_similarity)
    }

    /// Sets the minimum similarity a filer name must reach.
    #[must_use]
    pub const fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// Returns the document-type code candidates must carry.
    #[must_use]
    pub fn target_doc_type(&self) -> &str {
        &self.target_doc_type
    }

    /// Returns the minimum similarity.
    #[must_use]
    pub const fn min_similarity(&self) -> f64 {
        self.min_similarity
    }

    /// Selects the best filing for `query` among `candidates`.
    ///
    /// Identifier queries match `filer_id` exactly and score 1.0; name queries
    /// are scored with [`NameMatcher`]. The result carries no filer when the
    /// best score is below the threshold.
    #[must_use]
    pub fn select(&self, query: &FilerQuery, candidates: &[CandidateFiler]) -> MatchResult {
        let eligible: Vec<&CandidateFiler> = candidates
            .iter()
            .filter(|c| c.document_type_code == self.target_doc_type)
            .collect();

        if eligible.is_empty() {
            return MatchResult::unmatched(
                0.0,
                format!(
                    "no filings with document type {} among {} candidates (best score 0.000)",
                    self.target_doc_type,
                    candidates.len()
                ),
            );
        }

        let scored: Vec<(&CandidateFiler, f64)> = match query {
            FilerQuery::Identifier(id) => eligible
                .into_iter()
                .map(|c| (c, if c.filer_id == *id { 1.0 } else { 0.0 }))
                .collect(),
            FilerQuery::Name(name) => {
                let matcher = NameMatcher::new(name);
                eligible
                    .into_iter()
                    .map(|c| (c, matcher.score(&c.filer_name)))
                    .collect()
            }
        };

        let best = scored.iter().map(|(_, s)| *s).fold(0.0, f64::max);
        if best < self.min_similarity {
            debug!(query = %query, best, candidates = scored.len(), "No filer above threshold");
            return MatchResult::unmatched(
                best,
                format!(
                    "no filer matched '{}' with similarity >= {:.2} (best score {:.3})",
                    query, self.min_similarity, best
                ),
            );
        }

        // exact ties only; later submission wins, first seen on equal timestamps
        #[allow(clippy::float_cmp)]
        let winner = scored
            .iter()
            .filter(|(_, s)| *s == best)
            .map(|(c, _)| *c)
            .reduce(|kept, next| {
                if next.submission_timestamp > kept.submission_timestamp {
                    next
                } else {
                    kept
                }
            });

        let Some(winner) = winner else {
            return MatchResult::unmatched(best, format!("no filer matched '{query}'"));
        };

        let alternatives = scored
            .iter()
            .filter(|(_, s)| *s >= self.min_similarity)
            .count()
            .saturating_sub(1);

        debug!(
            query = %query,
            filer = %winner.filer_name,
            document_id = %winner.document_id,
            similarity = best,
            alternatives,
            "Selected filing"
        );

        MatchResult::matched(winner.clone(), best, alternatives)
    }
}
