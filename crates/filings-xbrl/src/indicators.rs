//! Keyword-based extraction of indicators from parsed export rows.
//!
//! Each current-period row is tested against every indicator's keywords by
//! substring containment on the lower-cased element name. A later row only
//! replaces an indicator's value when its keyword is strictly longer than the
//! keyword that produced the current value.

use std::collections::BTreeMap;

use filings_core::{
    ColumnLabels, ExtractedIndicators, Indicator, IndicatorVocabulary, RawRow, ResearchConfig,
};
use tracing::{debug, trace};

use crate::numeric;

/// Best value seen so far for one indicator.
#[derive(Debug, Clone, Copy)]
struct IndicatorMatch {
    keyword_len: usize,
    value: f64,
}

/// Assigns export rows to indicators.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndicatorExtractor {
    columns: ColumnLabels,
    vocabulary: IndicatorVocabulary,
}

impl IndicatorExtractor {
    /// Creates an extractor with EDINET column labels.
    #[must_use]
    pub fn new(vocabulary: IndicatorVocabulary) -> Self {
        Self {
            columns: ColumnLabels::edinet(),
            vocabulary,
        }
    }

    /// Creates an extractor from a research configuration.
    #[must_use]
    pub fn from_config(config: &ResearchConfig) -> Self {
        Self::new(config.vocabulary.clone()).with_columns(config.columns.clone())
    }

    /// Sets the labels of the element, context and value columns.
    #[must_use]
    pub fn with_columns(mut self, columns: ColumnLabels) -> Self {
        self.columns = columns;
        self
    }

    /// Returns the keyword vocabulary.
    #[must_use]
    pub const fn vocabulary(&self) -> &IndicatorVocabulary {
        &self.vocabulary
    }

    /// Extracts indicators from parsed rows.
    ///
    /// Rows with an empty or `-` value, or whose context reference mentions a
    /// prior period, are skipped. Related entities keep first-seen order.
    #[must_use]
    pub fn extract(&self, rows: &[RawRow]) -> ExtractedIndicators {
        let mut best: BTreeMap<Indicator, IndicatorMatch> = BTreeMap::new();
        let mut indicators = ExtractedIndicators::new();
        let mut skipped = 0usize;

        for row in rows {
            let element = row.get(&self.columns.element).unwrap_or_default().to_lowercase();
            let context = row.get(&self.columns.context).unwrap_or_default();
            let value = row.get(&self.columns.value).unwrap_or_default();

            if value.is_empty() || value == "-" || context.to_lowercase().contains("prior") {
                skipped += 1;
                continue;
            }

            for (indicator, keywords) in self.vocabulary.iter() {
                let Some(keyword) = keywords.iter().find(|k| element.contains(k.as_str())) else {
                    continue;
                };
                let keyword_len = keyword.chars().count();
                if best
                    .get(&indicator)
                    .is_some_and(|current| keyword_len <= current.keyword_len)
                {
                    continue;
                }
                if let Some(parsed) = numeric::normalize(value) {
                    trace!(%indicator, keyword = %keyword, value = parsed, "Indicator candidate");
                    best.insert(
                        indicator,
                        IndicatorMatch {
                            keyword_len,
                            value: parsed,
                        },
                    );
                }
            }

            if value.chars().count() > 3
                && self
                    .vocabulary
                    .related_entity_markers()
                    .iter()
                    .any(|m| element.contains(m.as_str()))
            {
                indicators.push_related_entity(value);
            }
        }

        for (indicator, found) in best {
            indicators.set(indicator, found.value);
        }

        debug!(
            rows = rows.len(),
            skipped,
            revenue = ?indicators.revenue,
            capital = ?indicators.capital,
            employee_count = ?indicators.employee_count,
            related_entities = indicators.related_entities().len(),
            "Extracted indicators"
        );

        indicators
    }
}

/// Extracts indicators from rows with EDINET column labels.
#[must_use]
pub fn extract(rows: &[RawRow], vocabulary: &IndicatorVocabulary) -> ExtractedIndicators {
    IndicatorExtractor::new(vocabulary.clone()).extract(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filings_core::MAX_RELATED_ENTITIES;

    fn row(element: &str, context: &str, value: &str) -> RawRow {
        [
            ("要素ID", element),
            ("項目名", ""),
            ("コンテキストID", context),
            ("値", value),
        ]
        .into_iter()
        .collect()
    }

    fn revenue_vocabulary() -> IndicatorVocabulary {
        IndicatorVocabulary::empty()
            .with_keywords(Indicator::Revenue, ["netsales", "operatingrevenues"])
    }

    #[test]
    fn test_longer_keyword_wins() {
        let rows = vec![
            row("jppfs_cor:NetSales", "CurrentYearDuration", "1,000"),
            row("jppfs_cor:OperatingRevenues", "CurrentYearDuration", "2,000"),
        ];

        let indicators = extract(&rows, &revenue_vocabulary());
        assert_eq!(indicators.revenue, Some(2000.0));

        // order of rows does not matter
        let reversed: Vec<RawRow> = rows.into_iter().rev().collect();
        let indicators = extract(&reversed, &revenue_vocabulary());
        assert_eq!(indicators.revenue, Some(2000.0));
    }

    #[test]
    fn test_equal_keyword_keeps_first_value() {
        let rows = vec![
            row("jppfs_cor:NetSales", "CurrentYearDuration", "1,000"),
            row("jppfs_cor:NetSales", "CurrentYearDuration_NonConsolidatedMember", "500"),
        ];

        let indicators = extract(&rows, &revenue_vocabulary());
        assert_eq!(indicators.revenue, Some(1000.0));
    }

    #[test]
    fn test_prior_period_rows_excluded() {
        let rows = vec![
            row("jppfs_cor:OperatingRevenues", "Prior1YTDDuration", "9,999"),
            row("jppfs_cor:NetSales", "CurrentYTDDuration", "1,000"),
        ];

        let indicators = extract(&rows, &revenue_vocabulary());
        assert_eq!(indicators.revenue, Some(1000.0));

        let only_prior = vec![row("jppfs_cor:NetSales", "prior1YearDuration", "1,000")];
        assert_eq!(extract(&only_prior, &revenue_vocabulary()).revenue, None);
    }

    #[test]
    fn test_empty_and_dash_values_skipped() {
        let rows = vec![
            row("jppfs_cor:OperatingRevenues", "CurrentYearDuration", "-"),
            row("jppfs_cor:OperatingRevenues", "CurrentYearDuration", ""),
            row("jppfs_cor:NetSales", "CurrentYearDuration", "700"),
        ];

        let indicators = extract(&rows, &revenue_vocabulary());
        assert_eq!(indicators.revenue, Some(700.0));
    }

    #[test]
    fn test_unparseable_value_does_not_claim_indicator() {
        let rows = vec![
            row("jppfs_cor:OperatingRevenues", "CurrentYearDuration", "n/a"),
            row("jppfs_cor:NetSales", "CurrentYearDuration", "700"),
        ];

        let indicators = extract(&rows, &revenue_vocabulary());
        assert_eq!(indicators.revenue, Some(700.0));
    }

    #[test]
    fn test_first_matching_keyword_decides_specificity() {
        // "revenue" is listed first, so OperatingRevenues only counts as 7 chars
        let vocabulary = IndicatorVocabulary::empty()
            .with_keywords(Indicator::Revenue, ["revenue", "operatingrevenues", "netsales"]);
        let rows = vec![
            row("jppfs_cor:NetSales", "CurrentYearDuration", "100"),
            row("jppfs_cor:OperatingRevenues", "CurrentYearDuration", "200"),
        ];

        assert_eq!(extract(&rows, &vocabulary).revenue, Some(100.0));
    }

    #[test]
    fn test_default_vocabulary_extracts_all_indicators() {
        let rows = vec![
            row(
                "jpcrp_cor:NetSalesSummaryOfBusinessResults",
                "CurrentYearDuration",
                "3,776,140,000,000",
            ),
            row("jppfs_cor:NetSales", "CurrentYearDuration", "1,000"),
            row("jppfs_cor:CapitalStock", "CurrentYearInstant", "325,638,000,000"),
            row("jpcrp_cor:NumberOfEmployees", "CurrentYearInstant", "124,055"),
            row("jpcrp_cor:NumberOfEmployees", "Prior1YearInstant", "1"),
        ];

        let indicators = IndicatorExtractor::default().extract(&rows);
        assert_eq!(indicators.revenue, Some(3_776_140_000_000.0));
        assert_eq!(indicators.capital, Some(325_638_000_000.0));
        assert_eq!(indicators.employee_count, Some(124_055.0));
    }

    #[test]
    fn test_related_entities_unique_and_capped() {
        let mut rows = Vec::new();
        for _ in 0..8 {
            rows.push(row("jpcrp_cor:NameOfSubsidiary", "CurrentYearInstant", "富士通ゼネラル"));
        }
        for i in 0..8 {
            rows.push(row(
                "jpcrp_cor:NameOfAffiliatedCompany",
                "CurrentYearInstant",
                &format!("関連会社{i}"),
            ));
        }
        rows.push(row("jpcrp_cor:NameOfSubsidiary", "CurrentYearInstant", "短い"));

        let indicators = IndicatorExtractor::default().extract(&rows);
        let related = indicators.related_entities();
        assert_eq!(related.len(), MAX_RELATED_ENTITIES);
        assert_eq!(related[0], "富士通ゼネラル");
        assert_eq!(related[1], "関連会社0");
        assert!(!related.iter().any(|r| r == "短い"));
    }

    #[test]
    fn test_custom_columns() {
        let rows: Vec<RawRow> = vec![
            [("element", "NetSales"), ("context", "Current"), ("value", "5")]
                .into_iter()
                .collect(),
        ];
        let extractor = IndicatorExtractor::new(revenue_vocabulary())
            .with_columns(ColumnLabels::new("element", "context", "value"));

        assert_eq!(extractor.extract(&rows).revenue, Some(5.0));
        assert!(IndicatorExtractor::new(revenue_vocabulary()).extract(&rows).is_empty());
    }
}
