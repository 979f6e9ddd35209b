//! Keyword vocabulary mapping XBRL element names to indicators.
//!
//! Element names vary by taxonomy version and company extension, so indicators
//! are recognised by lowercase substring keywords rather than exact tags. Within
//! one indicator, keywords are tried in the order they are listed here.

use serde::{Deserialize, Serialize};

use crate::types::Indicator;

/// Immutable keyword configuration for indicator extraction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorVocabulary {
    entries: Vec<(Indicator, Vec<String>)>,
    related_entity_markers: Vec<String>,
}

impl IndicatorVocabulary {
    /// Creates a vocabulary with no keywords and no markers.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
            related_entity_markers: Vec::new(),
        }
    }

    /// Sets the keywords for an indicator, replacing any previous list.
    ///
    /// Keywords are lower-cased.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, indicator: Indicator, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .collect();
        match self.entries.iter_mut().find(|(i, _)| *i == indicator) {
            Some((_, existing)) => *existing = keywords,
            None => self.entries.push((indicator, keywords)),
        }
        self
    }

    /// Sets the element-name markers that flag related-entity facts.
    #[must_use]
    pub fn with_related_entity_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.related_entity_markers = markers
            .into_iter()
            .map(|m| m.as_ref().to_lowercase())
            .collect();
        self
    }

    /// Returns the keywords for an indicator in match order.
    #[must_use]
    pub fn keywords(&self, indicator: Indicator) -> &[String] {
        self.entries
            .iter()
            .find(|(i, _)| *i == indicator)
            .map_or(&[], |(_, k)| k.as_slice())
    }

    /// Iterates configured indicators and their keywords.
    pub fn iter(&self) -> impl Iterator<Item = (Indicator, &[String])> {
        self.entries.iter().map(|(i, k)| (*i, k.as_slice()))
    }

    /// Returns the related-entity markers.
    #[must_use]
    pub fn related_entity_markers(&self) -> &[String] {
        &self.related_entity_markers
    }
}

impl Default for IndicatorVocabulary {
    /// Keywords for the Japanese GAAP (`jppfs_cor`), IFRS and annual report
    /// (`jpcrp_cor`) taxonomies used in EDINET exports.
    fn default() -> Self {
        Self::empty()
            .with_keywords(
                Indicator::Revenue,
                [
                    "netsalessummaryofbusinessresults",
                    "revenueifrssummaryofbusinessresults",
                    "operatingrevenues",
                    "operatingrevenue",
                    "netsales",
                    "revenue",
                ],
            )
            .with_keywords(
                Indicator::Capital,
                [
                    "capitalstocksummaryofbusinessresults",
                    "sharecapitalifrs",
                    "capitalstock",
                    "sharecapital",
                ],
            )
            .with_keywords(
                Indicator::EmployeeCount,
                ["numberofemployees", "employees"],
            )
            .with_related_entity_markers([
                "subsidiar",
                "affiliat",
                "associatedcompan",
                "relatedparty",
            ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary_covers_all_indicators() {
        let vocabulary = IndicatorVocabulary::default();
        for indicator in Indicator::ALL {
            assert!(!vocabulary.keywords(indicator).is_empty(), "{indicator}");
        }
        assert!(!vocabulary.related_entity_markers().is_empty());
    }

    #[test]
    fn test_keywords_are_lowercased_and_replaced() {
        let vocabulary = IndicatorVocabulary::empty()
            .with_keywords(Indicator::Revenue, ["NetSales"])
            .with_keywords(Indicator::Revenue, ["OperatingRevenues", "NetSales"]);

        assert_eq!(
            vocabulary.keywords(Indicator::Revenue),
            ["operatingrevenues", "netsales"]
        );
        assert!(vocabulary.keywords(Indicator::Capital).is_empty());
        assert_eq!(vocabulary.iter().count(), 1);
    }

    #[test]
    fn test_vocabulary_deserializes() {
        let vocabulary = IndicatorVocabulary::empty()
            .with_keywords(Indicator::Capital, ["capitalstock"])
            .with_related_entity_markers(["subsidiar"]);
        let json = serde_json::to_string(&vocabulary).unwrap();
        let parsed: IndicatorVocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vocabulary);
    }
}
