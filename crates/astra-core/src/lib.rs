//! Shared domain types and configuration for the Astra comment pipeline.

pub mod account;
pub mod app_config;
pub mod config;
pub mod month;
pub mod records;

use thiserror::Error;

pub use account::{load_account_profile, AccountProfile, RedFlagThresholds, TopicConfig};
pub use app_config::PipelineConfig;
pub use config::{build_pipeline_config, load_pipeline_config, load_pipeline_config_from_env};
pub use month::Month;
pub use records::{
    normalize_post_id, CsvRecord, EnrichedComment, MappedComment, NormalizedComment, Post, PostSummary,
    RawComment,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read account profile at {path}: {source}")]
    AccountFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse account profile: {0}")]
    AccountFileParse(#[from] serde_yaml::Error),

    #[error("account profile validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid month '{0}': expected YYYY-MM")]
    InvalidMonth(String),
}
