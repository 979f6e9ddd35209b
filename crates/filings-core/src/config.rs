//! Configuration for filing resolution and indicator extraction.

use serde::{Deserialize, Serialize};

use crate::vocabulary::IndicatorVocabulary;

/// EDINET document-type code of the annual securities report (有価証券報告書).
pub const SECURITIES_REPORT_DOC_TYPE: &str = "120";

/// Minimum similarity for a filer name to be accepted.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.5;

/// Column count of the narrowest well-formed EDINET export line.
pub const EDINET_MIN_COLUMNS: usize = 6;

/// Header labels of the columns the extractor reads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLabels {
    /// Column holding the XBRL element name.
    pub element: String,
    /// Column holding the context reference.
    pub context: String,
    /// Column holding the reported value.
    pub value: String,
}

impl ColumnLabels {
    /// Creates column labels.
    #[must_use]
    pub fn new(
        element: impl Into<String>,
        context: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            element: element.into(),
            context: context.into(),
            value: value.into(),
        }
    }

    /// Labels of the EDINET XBRL-to-CSV export.
    #[must_use]
    pub fn edinet() -> Self {
        Self::new("要素ID", "コンテキストID", "値")
    }
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self::edinet()
    }
}

/// Settings for a research run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Document-type code a filing must carry to be considered.
    pub target_doc_type: String,
    /// Minimum name similarity for a filer to be selected.
    pub min_similarity: f64,
    /// Lines with fewer fields are dropped from tabular exports.
    pub min_columns: usize,
    /// Field delimiter of tabular exports.
    pub delimiter: char,
    /// Labels of the columns the extractor reads.
    pub columns: ColumnLabels,
    /// Companies researched concurrently in a batch.
    pub concurrency: usize,
    /// Keyword vocabulary for indicator extraction.
    pub vocabulary: IndicatorVocabulary,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            target_doc_type: SECURITIES_REPORT_DOC_TYPE.to_string(),
            min_similarity: DEFAULT_MIN_SIMILARITY,
            min_columns: EDINET_MIN_COLUMNS,
            delimiter: ',',
            columns: ColumnLabels::edinet(),
            concurrency: 4,
            vocabulary: IndicatorVocabulary::default(),
        }
    }
}

impl ResearchConfig {
    /// Sets the target document-type code.
    #[must_use]
    pub fn with_target_doc_type(mut self, code: impl Into<String>) -> Self {
        self.target_doc_type = code.into();
        self
    }

    /// Sets the minimum similarity.
    #[must_use]
    pub const fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// Sets the minimum column count.
    #[must_use]
    pub const fn with_min_columns(mut self, min_columns: usize) -> Self {
        self.min_columns = min_columns;
        self
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the column labels.
    #[must_use]
    pub fn with_columns(mut self, columns: ColumnLabels) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the batch concurrency. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sets the keyword vocabulary.
    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: IndicatorVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }
}
