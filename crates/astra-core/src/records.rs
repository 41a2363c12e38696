//! Record types flowing between pipeline stages.
//!
//! JSON inputs (`Post`, `RawComment`) mirror the export format of the source
//! platform. CSV artifacts (`MappedComment` onward) use snake_case column
//! names; the column order of each struct is the on-disk header order and is
//! part of the contract between stages.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A post from the static post catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    #[serde(rename = "postId", default)]
    pub post_id: Option<Value>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub shares: i64,
    #[serde(rename = "type", default)]
    pub content_type: Option<String>,
}

impl Post {
    /// Catalog lookup key for this post, if it has a usable identifier.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        self.post_id.as_ref().and_then(normalize_post_id)
    }
}

/// A raw comment as exported, before it is joined to its post.
#[derive(Debug, Clone, Deserialize)]
pub struct RawComment {
    #[serde(rename = "facebookId", default)]
    pub facebook_id: Option<Value>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "likesCount", default, deserialize_with = "lenient_count")]
    pub likes_count: i64,
    #[serde(default)]
    pub date: Option<String>,
}

impl RawComment {
    /// Normalized identifier of the parent post, if present.
    #[must_use]
    pub fn post_key(&self) -> Option<String> {
        self.facebook_id.as_ref().and_then(normalize_post_id)
    }
}

/// Normalize a post identifier to its string lookup form.
///
/// Strings are whitespace-trimmed; integers render in decimal. Empty strings
/// and non-scalar values have no key.
#[must_use]
pub fn normalize_post_id(value: &Value) -> Option<String> {
    let key = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Accept integers, floats, numeric strings or null for a count field.
fn lenient_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    #[allow(clippy::cast_possible_truncation)]
    let count = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<f64>().map_or(0, |f| f as i64),
        _ => 0,
    };
    Ok(count)
}

/// A row type persisted as a CSV artifact.
pub trait CsvRecord {
    /// Header row, in serialization order.
    const COLUMNS: &'static [&'static str];
}

/// A comment joined to a snapshot of its parent post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedComment {
    pub post_id: String,
    pub post_caption: String,
    pub content_type: String,
    pub total_likes: i64,
    pub num_shares: i64,
    pub comment_text: String,
    pub comment_likes: i64,
}

impl CsvRecord for MappedComment {
    const COLUMNS: &'static [&'static str] = &[
        "post_id",
        "post_caption",
        "content_type",
        "total_likes",
        "num_shares",
        "comment_text",
        "comment_likes",
    ];
}

/// A comment with cleaned, language-normalized analysis text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedComment {
    pub post_id: String,
    pub post_caption: String,
    pub content_type: String,
    pub total_likes: i64,
    pub num_shares: i64,
    pub comment_likes: i64,
    pub original_comment_for_context: String,
    pub original_language: String,
    pub text_for_analysis: String,
}

impl CsvRecord for NormalizedComment {
    const COLUMNS: &'static [&'static str] = &[
        "post_id",
        "post_caption",
        "content_type",
        "total_likes",
        "num_shares",
        "comment_likes",
        "original_comment_for_context",
        "original_language",
        "text_for_analysis",
    ];
}

/// A normalized comment annotated with sentiment and topic.
///
/// Both annotations are absent for rows that carried no analyzable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedComment {
    pub post_id: String,
    pub post_caption: String,
    pub content_type: String,
    pub total_likes: i64,
    pub num_shares: i64,
    pub comment_likes: i64,
    pub original_comment_for_context: String,
    pub original_language: String,
    pub text_for_analysis: String,
    pub sentiment_score: Option<f64>,
    pub topic: Option<String>,
}

impl CsvRecord for EnrichedComment {
    const COLUMNS: &'static [&'static str] = &[
        "post_id",
        "post_caption",
        "content_type",
        "total_likes",
        "num_shares",
        "comment_likes",
        "original_comment_for_context",
        "original_language",
        "text_for_analysis",
        "sentiment_score",
        "topic",
    ];
}

impl EnrichedComment {
    #[must_use]
    pub fn from_normalized(
        row: NormalizedComment,
        sentiment_score: Option<f64>,
        topic: Option<String>,
    ) -> Self {
        Self {
            post_id: row.post_id,
            post_caption: row.post_caption,
            content_type: row.content_type,
            total_likes: row.total_likes,
            num_shares: row.num_shares,
            comment_likes: row.comment_likes,
            original_comment_for_context: row.original_comment_for_context,
            original_language: row.original_language,
            text_for_analysis: row.text_for_analysis,
            sentiment_score,
            topic,
        }
    }
}

/// One row of the monthly post summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub post_id: String,
    pub post_caption: String,
    pub content_type: String,
    pub total_likes: i64,
    pub num_shares: i64,
    pub comment_count: usize,
    pub avg_sentiment_score: f64,
    pub sentiment_variance: f64,
    pub negative_comment_ratio: f64,
    pub main_topic: String,
    pub most_positive_comment: String,
    pub original_positive_context: String,
    pub most_negative_comment: String,
    pub original_negative_context: String,
    pub weighted_engagement_rate: f64,
}

impl CsvRecord for PostSummary {
    const COLUMNS: &'static [&'static str] = &[
        "post_id",
        "post_caption",
        "content_type",
        "total_likes",
        "num_shares",
        "comment_count",
        "avg_sentiment_score",
        "sentiment_variance",
        "negative_comment_ratio",
        "main_topic",
        "most_positive_comment",
        "original_positive_context",
        "most_negative_comment",
        "original_negative_context",
        "weighted_engagement_rate",
    ];
}

impl PostSummary {
    /// Columns that must always hold text.
    pub const TEXT_COLUMNS: &'static [&'static str] = &[
        "post_caption",
        "content_type",
        "main_topic",
        "most_positive_comment",
        "original_positive_context",
        "most_negative_comment",
        "original_negative_context",
    ];

    /// Text cells in [`Self::TEXT_COLUMNS`] order.
    #[must_use]
    pub fn text_cells(&self) -> [(&'static str, &str); 7] {
        [
            ("post_caption", &self.post_caption),
            ("content_type", &self.content_type),
            ("main_topic", &self.main_topic),
            ("most_positive_comment", &self.most_positive_comment),
            ("original_positive_context", &self.original_positive_context),
            ("most_negative_comment", &self.most_negative_comment),
            ("original_negative_context", &self.original_negative_context),
        ]
    }
}
