//! Posts whose comment sections turned clearly negative.

use std::cmp::Ordering;

use astra_core::{Month, PostSummary, RedFlagThresholds};

use crate::artifacts::{read_csv, ArtifactLayout};
use crate::error::StageError;

/// Posts with `negative_comment_ratio` above the threshold and more than
/// `min_comments` comments, most negative first.
#[must_use]
pub fn find_red_flags<'a>(
    summaries: &'a [PostSummary],
    thresholds: &RedFlagThresholds,
) -> Vec<&'a PostSummary> {
    let mut flagged: Vec<&PostSummary> = summaries
        .iter()
        .filter(|s| {
            s.negative_comment_ratio > thresholds.negative_ratio
                && s.comment_count > thresholds.min_comments
        })
        .collect();
    flagged.sort_by(|a, b| {
        b.negative_comment_ratio
            .partial_cmp(&a.negative_comment_ratio)
            .unwrap_or(Ordering::Equal)
    });
    flagged
}

/// Load the summary for `month` and return its red-flag posts.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the summary is absent; `Csv` if it does
/// not parse.
pub fn run_red_flags(
    layout: &ArtifactLayout,
    month: Month,
    thresholds: &RedFlagThresholds,
) -> Result<Vec<PostSummary>, StageError> {
    let summaries: Vec<PostSummary> = read_csv(&layout.summary(month))?;
    let flagged: Vec<PostSummary> = find_red_flags(&summaries, thresholds)
        .into_iter()
        .cloned()
        .collect();
    tracing::info!(month = %month, posts = summaries.len(), flagged = flagged.len(), "red flags evaluated");
    Ok(flagged)
}
