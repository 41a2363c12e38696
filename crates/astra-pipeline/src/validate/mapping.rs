use std::collections::HashSet;

use astra_core::{Month, PipelineConfig, Post, RawComment};

use super::{Validation, ValidationReport, ValidationState};
use crate::artifacts::{missing_columns, read_csv_raw, read_json, ArtifactLayout};
use crate::error::StageError;
use crate::mapping::{drop_breakdown, MISSING_POST_ID};

const REQUIRED_COLUMNS: &[&str] = &[
    "post_id",
    "post_caption",
    "content_type",
    "total_likes",
    "num_shares",
    "comment_text",
];

const TOP_OFFENDERS: usize = 5;

/// Verify the mapped artifact for `month` against the source files.
///
/// Drops are recomputed from the post catalog and the partition; any drop
/// fails the month.
///
/// # Errors
///
/// - [`StageError::SchemaViolation`] if required columns are missing.
/// - [`StageError::MappingLoss`] if any source comment has no catalog post.
/// - [`StageError::DataIntegrity`] if the artifact row count disagrees with
///   the source.
/// - `MissingInput`/`Json`/`Csv` if an input cannot be read.
pub fn verify_mapping(
    config: &PipelineConfig,
    layout: &ArtifactLayout,
    month: Month,
) -> Result<ValidationReport, StageError> {
    let mut v = Validation::start("mapping", month);
    let path = layout.mapped(month);

    let (headers, rows) = match read_csv_raw(&path) {
        Ok(read) => read,
        Err(e) => return Err(v.fail(e)),
    };
    let missing = missing_columns(&headers, REQUIRED_COLUMNS);
    if !missing.is_empty() {
        return Err(v.fail(StageError::SchemaViolation { path, missing }));
    }
    v.advance(ValidationState::SchemaChecked);

    let sources = read_json::<Vec<Post>>(&config.posts_path()).and_then(|posts| {
        read_json::<Vec<RawComment>>(&layout.partition(month)).map(|comments| (posts, comments))
    });
    let (posts, comments) = match sources {
        Ok(s) => s,
        Err(e) => return Err(v.fail(e)),
    };

    let known: HashSet<String> = posts.iter().filter_map(Post::key).collect();
    let dropped: Vec<String> = comments
        .iter()
        .filter_map(|c| match c.post_key() {
            None => Some(MISSING_POST_ID.to_string()),
            Some(key) if !known.contains(&key) => Some(key),
            Some(_) => None,
        })
        .collect();

    if !dropped.is_empty() {
        return Err(v.fail(StageError::MappingLoss {
            dropped: dropped.len(),
            total: comments.len(),
            top_offenders: drop_breakdown(&dropped, TOP_OFFENDERS),
        }));
    }
    if rows.len() != comments.len() {
        return Err(v.fail(StageError::DataIntegrity(format!(
            "{} holds {} rows but the partition has {} mappable comments",
            path.display(),
            rows.len(),
            comments.len()
        ))));
    }
    v.advance(ValidationState::QualityChecked);

    v.note(format!("all {} source comments mapped", comments.len()));
    Ok(v.pass())
}
