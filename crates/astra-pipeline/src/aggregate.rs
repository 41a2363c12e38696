//! Per-post aggregation of enriched comments into the monthly summary.
//!
//! The summary is computed with an explicit fold over rows in file order,
//! sanitized, verified in memory and only then written. A summary that
//! fails verification is never persisted.

use std::collections::BTreeMap;

use astra_core::{EnrichedComment, Month, PostSummary};

use crate::artifacts::{read_csv, write_csv, ArtifactLayout};
use crate::error::StageError;
use crate::sanitize::{missing_text_columns, sanitize_summary, NOT_AVAILABLE};

pub const NO_ANALYZABLE_TEXT: &str = "No analyzable text comments";
pub const NO_DISTINCT_NEGATIVE: &str = "No distinct negative comment";

/// Running state for one post.
struct PostAccumulator<'a> {
    first: &'a EnrichedComment,
    comment_count: usize,
    scores: Vec<f64>,
    /// Topic counts in first-seen order.
    topics: Vec<(&'a str, usize)>,
    /// Extremes as `(score, row position within the post, row)`.
    most_positive: Option<(f64, usize, &'a EnrichedComment)>,
    most_negative: Option<(f64, usize, &'a EnrichedComment)>,
    seen: usize,
}

impl<'a> PostAccumulator<'a> {
    fn new(first: &'a EnrichedComment) -> Self {
        Self {
            first,
            comment_count: 0,
            scores: Vec::new(),
            topics: Vec::new(),
            most_positive: None,
            most_negative: None,
            seen: 0,
        }
    }

    fn push(&mut self, row: &'a EnrichedComment) {
        let position = self.seen;
        self.seen += 1;

        if !row.original_comment_for_context.trim().is_empty() {
            self.comment_count += 1;
        }

        if let Some(topic) = row.topic.as_deref().filter(|t| !t.trim().is_empty()) {
            match self.topics.iter_mut().find(|(label, _)| *label == topic) {
                Some((_, count)) => *count += 1,
                None => self.topics.push((topic, 1)),
            }
        }

        let Some(score) = row.sentiment_score.filter(|s| s.is_finite()) else {
            return;
        };
        self.scores.push(score);
        // Strict comparisons keep the first occurrence on ties.
        if self.most_positive.is_none_or(|(best, _, _)| score > best) {
            self.most_positive = Some((score, position, row));
        }
        if self.most_negative.is_none_or(|(worst, _, _)| score < worst) {
            self.most_negative = Some((score, position, row));
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self, post_id: &str, follower_count: u64) -> PostSummary {
        let n = self.scores.len();
        let mean = if n == 0 {
            0.0
        } else {
            self.scores.iter().sum::<f64>() / n as f64
        };
        let variance = if n <= 1 {
            0.0
        } else {
            self.scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        };
        let negative_ratio = if n == 0 {
            0.0
        } else {
            self.scores.iter().filter(|s| **s < 0.0).count() as f64 / n as f64
        };

        let mut main_topic: Option<(&str, usize)> = None;
        for &(label, count) in &self.topics {
            if main_topic.is_none_or(|(_, top)| count > top) {
                main_topic = Some((label, count));
            }
        }

        let (most_positive_comment, original_positive_context) = match self.most_positive {
            Some((_, _, row)) => (
                row.text_for_analysis.clone(),
                row.original_comment_for_context.clone(),
            ),
            None => (NO_ANALYZABLE_TEXT.to_string(), NOT_AVAILABLE.to_string()),
        };
        let (most_negative_comment, original_negative_context) =
            match (self.most_negative, self.most_positive) {
                (Some((_, neg_pos, row)), Some((_, pos_pos, _))) if neg_pos != pos_pos => (
                    row.text_for_analysis.clone(),
                    row.original_comment_for_context.clone(),
                ),
                _ => (NO_DISTINCT_NEGATIVE.to_string(), NOT_AVAILABLE.to_string()),
            };

        let engagement = self.first.total_likes as f64
            + self.comment_count as f64
            + 2.0 * self.first.num_shares as f64;

        PostSummary {
            post_id: post_id.to_string(),
            post_caption: self.first.post_caption.clone(),
            content_type: self.first.content_type.clone(),
            total_likes: self.first.total_likes,
            num_shares: self.first.num_shares,
            comment_count: self.comment_count,
            avg_sentiment_score: mean,
            sentiment_variance: variance,
            negative_comment_ratio: negative_ratio,
            main_topic: main_topic.map_or_else(|| NOT_AVAILABLE.to_string(), |(t, _)| t.to_string()),
            most_positive_comment,
            original_positive_context,
            most_negative_comment,
            original_negative_context,
            weighted_engagement_rate: engagement / follower_count.max(1) as f64,
        }
    }
}

/// Group rows by `post_id` and build one unsanitized summary per post,
/// ordered by `post_id`.
#[must_use]
pub fn summarize_posts(rows: &[EnrichedComment], follower_count: u64) -> Vec<PostSummary> {
    let mut groups: BTreeMap<&str, PostAccumulator<'_>> = BTreeMap::new();
    for row in rows {
        groups
            .entry(row.post_id.as_str())
            .or_insert_with(|| PostAccumulator::new(row))
            .push(row);
    }
    groups
        .into_iter()
        .map(|(post_id, acc)| acc.finish(post_id, follower_count))
        .collect()
}

/// Sanitize every row, then confirm no text cell is still missing.
///
/// # Errors
///
/// [`StageError::DataIntegrity`] naming the first offending post and columns.
pub fn finalize_summaries(mut summaries: Vec<PostSummary>) -> Result<Vec<PostSummary>, StageError> {
    for row in &mut summaries {
        sanitize_summary(row);
    }
    for row in &summaries {
        let missing = missing_text_columns(row);
        if !missing.is_empty() {
            return Err(StageError::DataIntegrity(format!(
                "post {} still has empty text in [{}] after sanitization",
                row.post_id,
                missing.join(", ")
            )));
        }
    }
    Ok(summaries)
}

/// Aggregate `enriched_data_<month>.csv` into `post_summary_<month>.csv`.
///
/// Returns the number of summary rows written.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the enriched artifact is absent;
/// [`StageError::DataIntegrity`] if verification fails (nothing is written);
/// `Csv`/`Io` on read or write failure.
pub fn run_aggregation(
    layout: &ArtifactLayout,
    month: Month,
    follower_count: u64,
) -> Result<usize, StageError> {
    let rows: Vec<EnrichedComment> = read_csv(&layout.enriched(month))?;
    let summaries = finalize_summaries(summarize_posts(&rows, follower_count))?;
    write_csv(&layout.summary(month), &summaries)?;
    tracing::info!(
        month = %month,
        comments = rows.len(),
        posts = summaries.len(),
        "post summary written"
    );
    Ok(summaries.len())
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
