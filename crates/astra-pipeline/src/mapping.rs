//! Join each raw comment to its parent post from the static catalog.

use std::collections::HashMap;

use astra_core::{MappedComment, Month, PipelineConfig, Post, RawComment};

use crate::artifacts::{read_json, write_csv, ArtifactLayout};
use crate::error::StageError;

/// Drop key recorded for comments that carry no parent post id.
pub const MISSING_POST_ID: &str = "(missing)";

/// Post fields captured onto every mapped comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSnapshot {
    pub caption: String,
    pub content_type: String,
    pub likes: i64,
    pub shares: i64,
}

/// Lookup from normalized post id to its snapshot. Later duplicates win.
#[must_use]
pub fn build_post_catalog(posts: &[Post]) -> HashMap<String, PostSnapshot> {
    posts
        .iter()
        .filter_map(|post| {
            let key = post.key()?;
            let snapshot = PostSnapshot {
                caption: post.text.clone().unwrap_or_default(),
                content_type: post
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                likes: post.likes,
                shares: post.shares,
            };
            Some((key, snapshot))
        })
        .collect()
}

/// Mapped rows plus the post id of every dropped comment, in input order.
#[derive(Debug, Default)]
pub struct MappingOutcome {
    pub mapped: Vec<MappedComment>,
    pub dropped: Vec<String>,
}

#[must_use]
pub fn map_comments(
    catalog: &HashMap<String, PostSnapshot>,
    comments: &[RawComment],
) -> MappingOutcome {
    let mut outcome = MappingOutcome::default();
    for comment in comments {
        let Some(key) = comment.post_key() else {
            outcome.dropped.push(MISSING_POST_ID.to_string());
            continue;
        };
        match catalog.get(&key) {
            Some(post) => outcome.mapped.push(MappedComment {
                post_id: key,
                post_caption: post.caption.clone(),
                content_type: post.content_type.clone(),
                total_likes: post.likes,
                num_shares: post.shares,
                comment_text: comment.text.clone().unwrap_or_default(),
                comment_likes: comment.likes_count,
            }),
            None => outcome.dropped.push(key),
        }
    }
    outcome
}

/// The `limit` most frequent dropped ids with their counts. Ties keep the
/// order in which the ids were first dropped.
#[must_use]
pub fn drop_breakdown(dropped: &[String], limit: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for id in dropped {
        if let Some(&i) = index.get(id.as_str()) {
            counts[i].1 += 1;
        } else {
            index.insert(id.as_str(), counts.len());
            counts.push((id.clone(), 1));
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

/// Row counts from one mapping run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingReport {
    pub total: usize,
    pub mapped: usize,
    pub dropped: usize,
}

/// Map one month's partition against the post catalog and write
/// `processed_comments_<month>.csv`.
///
/// Dropped comments are logged here and judged by the mapping validator.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the catalog or partition is absent;
/// `Json`/`Io`/`Csv` on read or write failure.
pub fn run_mapping(
    config: &PipelineConfig,
    layout: &ArtifactLayout,
    month: Month,
) -> Result<MappingReport, StageError> {
    let posts: Vec<Post> = read_json(&config.posts_path())?;
    let comments: Vec<RawComment> = read_json(&layout.partition(month))?;
    let catalog = build_post_catalog(&posts);
    tracing::debug!(month = %month, posts = catalog.len(), "post catalog loaded");

    let outcome = map_comments(&catalog, &comments);
    let report = MappingReport {
        total: comments.len(),
        mapped: outcome.mapped.len(),
        dropped: outcome.dropped.len(),
    };
    if report.dropped > 0 {
        tracing::warn!(
            month = %month,
            dropped = report.dropped,
            total = report.total,
            "comments without a matching post were discarded"
        );
    }

    write_csv(&layout.mapped(month), &outcome.mapped)?;
    tracing::info!(month = %month, rows = report.mapped, "mapped comments written");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn posts() -> Vec<Post> {
        serde_json::from_value(json!([
            {"postId": " 100 ", "text": "Old caption", "likes": 1, "shares": 0, "type": "Photo"},
            {"postId": 200, "likes": 5},
            {"postId": "100", "text": "New caption", "likes": 10, "shares": 3, "type": "Video"}
        ]))
        .unwrap()
    }

    fn comments() -> Vec<RawComment> {
        serde_json::from_value(json!([
            {"facebookId": "100", "text": "hello", "likesCount": 2},
            {"facebookId": 200, "text": "hi"},
            {"facebookId": "999", "text": "orphan"},
            {"text": "no id"},
            {"facebookId": "999 ", "text": "orphan again"},
            {"facebookId": "555", "text": "other orphan"}
        ]))
        .unwrap()
    }

    #[test]
    fn catalog_defaults_and_last_duplicate_wins() {
        let catalog = build_post_catalog(&posts());
        assert_eq!(catalog["100"].caption, "New caption");
        assert_eq!(catalog["100"].likes, 10);
        assert_eq!(
            catalog["200"],
            PostSnapshot {
                caption: String::new(),
                content_type: "Unknown".to_string(),
                likes: 5,
                shares: 0,
            }
        );
    }

    #[test]
    fn mapped_plus_dropped_equals_input() {
        let catalog = build_post_catalog(&posts());
        let input = comments();
        let outcome = map_comments(&catalog, &input);
        assert_eq!(outcome.mapped.len() + outcome.dropped.len(), input.len());
        assert_eq!(outcome.mapped.len(), 2);
        assert_eq!(outcome.mapped[0].post_caption, "New caption");
        assert_eq!(outcome.mapped[0].comment_likes, 2);
        assert_eq!(outcome.mapped[1].post_id, "200");
        assert_eq!(outcome.mapped[1].comment_text, "hi");
    }

    #[test]
    fn drop_breakdown_ranks_by_count_then_first_seen() {
        let catalog = build_post_catalog(&posts());
        let outcome = map_comments(&catalog, &comments());
        assert_eq!(
            drop_breakdown(&outcome.dropped, 5),
            vec![
                ("999".to_string(), 2),
                (MISSING_POST_ID.to_string(), 1),
                ("555".to_string(), 1),
            ]
        );
        assert_eq!(drop_breakdown(&outcome.dropped, 1).len(), 1);
    }
}
