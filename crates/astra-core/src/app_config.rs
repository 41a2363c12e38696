use std::path::PathBuf;

use crate::account::AccountProfile;

/// Immutable pipeline configuration, built once at startup and passed by
/// reference into every stage.
#[derive(Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub posts_file: PathBuf,
    pub comments_file: PathBuf,
    pub account_path: PathBuf,
    pub log_level: String,
    pub translate_batch_size: usize,
    pub enrich_batch_size: usize,
    /// Maximum tolerated share of suspect translations, in percent.
    pub translation_failure_threshold_pct: f64,
    /// Share of non-ASCII letters above which a text counts as untranslated.
    pub non_latin_ratio: f64,
    pub http_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub google_translate_api_key: Option<String>,
    pub classifier_url: Option<String>,
    pub classifier_token: Option<String>,
    pub sentiment_model: String,
    pub topic_model: String,
    pub google_api_key: Option<String>,
    pub report_model: String,
    pub account: AccountProfile,
}

impl PipelineConfig {
    /// Bulk post catalog, resolved against the data directory.
    #[must_use]
    pub fn posts_path(&self) -> PathBuf {
        self.data_dir.join(&self.posts_file)
    }

    /// Bulk comment export, resolved against the data directory.
    #[must_use]
    pub fn comments_path(&self) -> PathBuf {
        self.data_dir.join(&self.comments_file)
    }
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("data_dir", &self.data_dir)
            .field("posts_file", &self.posts_file)
            .field("comments_file", &self.comments_file)
            .field("account_path", &self.account_path)
            .field("log_level", &self.log_level)
            .field("translate_batch_size", &self.translate_batch_size)
            .field("enrich_batch_size", &self.enrich_batch_size)
            .field(
                "translation_failure_threshold_pct",
                &self.translation_failure_threshold_pct,
            )
            .field("non_latin_ratio", &self.non_latin_ratio)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field(
                "google_translate_api_key",
                &self.google_translate_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("classifier_url", &self.classifier_url)
            .field(
                "classifier_token",
                &self.classifier_token.as_ref().map(|_| "[redacted]"),
            )
            .field("sentiment_model", &self.sentiment_model)
            .field("topic_model", &self.topic_model)
            .field(
                "google_api_key",
                &self.google_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("report_model", &self.report_model)
            .field("account", &self.account.name)
            .finish()
    }
}
