//! Placeholder policy for summary text cells, plus the in-place sanitize
//! and diagnose passes over an existing summary file.

use astra_core::{Month, PostSummary};

use crate::artifacts::{missing_columns, read_csv_raw, write_csv_raw, ArtifactLayout};
use crate::error::StageError;

/// Placeholder for absent text.
pub const NOT_AVAILABLE: &str = "N/A";

/// Whether a text cell counts as null: empty, whitespace-only, or a stray
/// `nan` / `None` rendering.
#[must_use]
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == "nan" || trimmed == "None"
}

/// The cell value with missing text replaced by [`NOT_AVAILABLE`].
#[must_use]
pub fn sanitize_text(value: Option<&str>) -> String {
    match value {
        Some(v) if !is_missing(v) => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Apply [`sanitize_text`] to every text column of a summary row.
pub fn sanitize_summary(row: &mut PostSummary) {
    for cell in [
        &mut row.post_caption,
        &mut row.content_type,
        &mut row.main_topic,
        &mut row.most_positive_comment,
        &mut row.original_positive_context,
        &mut row.most_negative_comment,
        &mut row.original_negative_context,
    ] {
        if is_missing(cell) {
            *cell = NOT_AVAILABLE.to_string();
        }
    }
}

/// Text columns of `row` that still hold a missing value.
#[must_use]
pub fn missing_text_columns(row: &PostSummary) -> Vec<&'static str> {
    row.text_cells()
        .into_iter()
        .filter(|(_, value)| is_missing(value))
        .map(|(name, _)| name)
        .collect()
}

/// Re-apply the placeholder policy to an existing summary file in place.
///
/// Only text columns present in the file are touched. Returns the number of
/// cells that were replaced.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the summary is absent; `Csv`/`Io` on read
/// or write failure.
pub fn sanitize_summary_file(layout: &ArtifactLayout, month: Month) -> Result<usize, StageError> {
    let path = layout.summary(month);
    let (headers, rows) = read_csv_raw(&path)?;
    let text_indices: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| PostSummary::TEXT_COLUMNS.contains(&h.as_str()))
        .map(|(i, _)| i)
        .collect();

    let mut replaced = 0usize;
    let rows: Vec<csv::StringRecord> = rows
        .iter()
        .map(|record| {
            record
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if text_indices.contains(&i) && is_missing(cell) {
                        replaced += 1;
                        NOT_AVAILABLE
                    } else {
                        cell
                    }
                })
                .collect()
        })
        .collect();

    write_csv_raw(&path, &headers, &rows)?;
    tracing::info!(month = %month, replaced, "summary sanitized");
    Ok(replaced)
}

/// A summary row with an empty comment context cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosedRow {
    pub post_id: String,
    pub most_positive_comment: String,
    pub original_positive_context: String,
    pub most_negative_comment: String,
    pub original_negative_context: String,
}

const DIAGNOSE_COLUMNS: &[&str] = &[
    "post_id",
    "most_positive_comment",
    "original_positive_context",
    "most_negative_comment",
    "original_negative_context",
];

/// Rows of a summary file whose positive or negative context is empty.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the summary is absent;
/// [`StageError::SchemaViolation`] if a diagnosed column is missing.
pub fn diagnose_summary(
    layout: &ArtifactLayout,
    month: Month,
) -> Result<Vec<DiagnosedRow>, StageError> {
    let path = layout.summary(month);
    let (headers, rows) = read_csv_raw(&path)?;
    let missing = missing_columns(&headers, DIAGNOSE_COLUMNS);
    if !missing.is_empty() {
        return Err(StageError::SchemaViolation { path, missing });
    }
    let col = |name: &str| headers.iter().position(|h| h == name).unwrap_or_default();
    let [id, pos, pos_ctx, neg, neg_ctx] = [
        col("post_id"),
        col("most_positive_comment"),
        col("original_positive_context"),
        col("most_negative_comment"),
        col("original_negative_context"),
    ];
    let cell = |record: &csv::StringRecord, i: usize| record.get(i).unwrap_or_default().to_string();

    Ok(rows
        .iter()
        .filter(|r| {
            r.get(pos_ctx).is_none_or(|v| v.trim().is_empty())
                || r.get(neg_ctx).is_none_or(|v| v.trim().is_empty())
        })
        .map(|r| DiagnosedRow {
            post_id: cell(r, id),
            most_positive_comment: cell(r, pos),
            original_positive_context: cell(r, pos_ctx),
            most_negative_comment: cell(r, neg),
            original_negative_context: cell(r, neg_ctx),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_values_become_placeholder() {
        assert_eq!(sanitize_text(None), NOT_AVAILABLE);
        assert_eq!(sanitize_text(Some("")), NOT_AVAILABLE);
        assert_eq!(sanitize_text(Some("  \t")), NOT_AVAILABLE);
        assert_eq!(sanitize_text(Some("nan")), NOT_AVAILABLE);
        assert_eq!(sanitize_text(Some("None")), NOT_AVAILABLE);
        assert_eq!(sanitize_text(Some("Nonetheless")), "Nonetheless");
        assert_eq!(sanitize_text(Some(" kept ")), " kept ");
    }

    fn write_summary(layout: &ArtifactLayout, month: Month, body: &str) {
        let path = layout.summary(month);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn sanitize_file_rewrites_only_text_columns() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        let month: Month = "2024-02".parse().unwrap();
        write_summary(
            &layout,
            month,
            "post_id,main_topic,original_positive_context,comment_count\n\
             ,nan,,\n\
             p2,Economy,hi,3\n",
        );

        let replaced = sanitize_summary_file(&layout, month).unwrap();
        assert_eq!(replaced, 2);
        let (_, rows) = read_csv_raw(&layout.summary(month)).unwrap();
        assert_eq!(&rows[0][0], "");
        assert_eq!(&rows[0][1], NOT_AVAILABLE);
        assert_eq!(&rows[0][2], NOT_AVAILABLE);
        assert_eq!(&rows[0][3], "");
        assert_eq!(&rows[1][1], "Economy");
    }

    #[test]
    fn diagnose_lists_rows_with_empty_context() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        let month: Month = "2024-02".parse().unwrap();
        write_summary(
            &layout,
            month,
            "post_id,most_positive_comment,original_positive_context,\
most_negative_comment,original_negative_context\n\
             p1,good,bueno,bad,\n\
             p2,fine,fine,N/A,N/A\n",
        );

        let rows = diagnose_summary(&layout, month).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].post_id, "p1");
        assert_eq!(rows[0].original_negative_context, "");
    }

    #[test]
    fn diagnose_reports_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        let month: Month = "2024-02".parse().unwrap();
        write_summary(&layout, month, "post_id\np1\n");
        assert!(matches!(
            diagnose_summary(&layout, month),
            Err(StageError::SchemaViolation { .. })
        ));
    }
}
