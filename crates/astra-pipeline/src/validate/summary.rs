use astra_core::{Month, PostSummary};

use super::{Validation, ValidationReport, ValidationState};
use crate::artifacts::{missing_columns, read_csv_headers, read_csv_raw, ArtifactLayout};
use crate::error::StageError;
use crate::sanitize::is_missing;

const ENRICHMENT_COLUMNS: &[&str] = &["sentiment_score", "topic"];

const SUMMARY_COLUMNS: &[&str] = &[
    "post_id",
    "most_positive_comment",
    "original_positive_context",
    "most_negative_comment",
    "original_negative_context",
];

/// Schema check of the enriched artifact for `month`.
///
/// # Errors
///
/// [`StageError::SchemaViolation`] if `sentiment_score` or `topic` is
/// missing; `MissingInput`/`Csv` if the artifact cannot be read.
pub fn verify_enrichment(layout: &ArtifactLayout, month: Month) -> Result<ValidationReport, StageError> {
    let mut v = Validation::start("enrichment", month);
    let path = layout.enriched(month);
    let headers = match read_csv_headers(&path) {
        Ok(h) => h,
        Err(e) => return Err(v.fail(e)),
    };
    let missing = missing_columns(&headers, ENRICHMENT_COLUMNS);
    if !missing.is_empty() {
        return Err(v.fail(StageError::SchemaViolation { path, missing }));
    }
    v.advance(ValidationState::SchemaChecked);
    v.advance(ValidationState::QualityChecked);
    Ok(v.pass())
}

/// Verify the final summary for `month`: required columns, and no empty
/// cell in any text column.
///
/// # Errors
///
/// - [`StageError::SchemaViolation`] if required columns are missing.
/// - [`StageError::DataIntegrity`] naming the first empty text cell.
/// - `MissingInput`/`Csv` if the summary cannot be read.
pub fn verify_summary(layout: &ArtifactLayout, month: Month) -> Result<ValidationReport, StageError> {
    let mut v = Validation::start("summary", month);
    let path = layout.summary(month);
    let (headers, rows) = match read_csv_raw(&path) {
        Ok(read) => read,
        Err(e) => return Err(v.fail(e)),
    };
    let missing = missing_columns(&headers, SUMMARY_COLUMNS);
    if !missing.is_empty() {
        return Err(v.fail(StageError::SchemaViolation { path, missing }));
    }
    v.advance(ValidationState::SchemaChecked);

    let text_columns: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| PostSummary::TEXT_COLUMNS.contains(&h.as_str()))
        .map(|(i, h)| (i, h.as_str()))
        .collect();
    let id_idx = headers.iter().position(|h| h == "post_id");

    for (line, record) in rows.iter().enumerate() {
        for &(idx, name) in &text_columns {
            if record.get(idx).is_none_or(is_missing) {
                let post_id = id_idx.and_then(|i| record.get(i)).unwrap_or_default();
                return Err(v.fail(StageError::DataIntegrity(format!(
                    "column '{name}' is empty for post '{post_id}' (row {})",
                    line + 1
                ))));
            }
        }
    }
    v.advance(ValidationState::QualityChecked);

    v.note(format!("{} summary rows, no empty text cells", rows.len()));
    Ok(v.pass())
}

/// Enrichment schema followed by the final summary checks.
///
/// # Errors
///
/// The first failure of [`verify_enrichment`] or [`verify_summary`].
pub fn verify_final_outputs(
    layout: &ArtifactLayout,
    month: Month,
) -> Result<Vec<ValidationReport>, StageError> {
    Ok(vec![
        verify_enrichment(layout, month)?,
        verify_summary(layout, month)?,
    ])
}
