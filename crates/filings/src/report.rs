//! Flattening research records into a polars `DataFrame`.

use filings_core::{CompanyRecord, FilingError, Result};
use polars::prelude::*;

/// Build a report table with one row per company record.
///
/// Columns: `query`, `filer_id`, `filer_name`, `corporate_number`,
/// `document_id`, `submission_timestamp`, `similarity`, `revenue`, `capital`,
/// `employee_count`, `related_entities` (comma-joined), `website_url`, `error`.
///
/// # Errors
/// Returns an error if polars rejects the columns.
pub fn records_to_dataframe(records: &[CompanyRecord]) -> Result<DataFrame> {
    let queries: Vec<String> = records.iter().map(|r| r.query.clone()).collect();
    let related: Vec<Option<String>> = records
        .iter()
        .map(|r| (!r.related_entities.is_empty()).then(|| r.related_entities_joined()))
        .collect();

    DataFrame::new(vec![
        Column::new("query".into(), queries),
        text_column("filer_id", records, |r| r.filer_id.as_ref()),
        text_column("filer_name", records, |r| r.filer_name.as_ref()),
        text_column("corporate_number", records, |r| r.corporate_number.as_ref()),
        text_column("document_id", records, |r| r.document_id.as_ref()),
        text_column("submission_timestamp", records, |r| {
            r.submission_timestamp.as_ref()
        }),
        number_column("similarity", records, |r| r.similarity),
        number_column("revenue", records, |r| r.revenue),
        number_column("capital", records, |r| r.capital),
        number_column("employee_count", records, |r| r.employee_count),
        Column::new("related_entities".into(), related),
        text_column("website_url", records, |r| r.website_url.as_ref()),
        text_column("error", records, |r| r.error.as_ref()),
    ])
    .map_err(|e| FilingError::Other(e.to_string()))
}

fn text_column(
    name: &str,
    records: &[CompanyRecord],
    field: impl Fn(&CompanyRecord) -> Option<&String>,
) -> Column {
    let values: Vec<Option<String>> = records.iter().map(|r| field(r).cloned()).collect();
    Column::new(name.into(), values)
}

fn number_column(
    name: &str,
    records: &[CompanyRecord],
    field: impl Fn(&CompanyRecord) -> Option<f64>,
) -> Column {
    let values: Vec<Option<f64>> = records.iter().map(field).collect();
    Column::new(name.into(), values)
}
