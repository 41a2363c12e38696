use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Thresholds for flagging posts that attract a negative pile-on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlagThresholds {
    /// A post needs strictly more than this many comments to be flagged.
    #[serde(default = "default_min_comments")]
    pub min_comments: usize,
    /// A post needs strictly more than this share of negative comments.
    #[serde(default = "default_negative_ratio")]
    pub negative_ratio: f64,
}

impl Default for RedFlagThresholds {
    fn default() -> Self {
        Self {
            min_comments: default_min_comments(),
            negative_ratio: default_negative_ratio(),
        }
    }
}

fn default_min_comments() -> usize {
    3
}

fn default_negative_ratio() -> f64 {
    0.3
}

/// A candidate topic label and the keywords the offline matcher uses for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicConfig {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// The tracked account whose posts and comments are analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub name: String,
    /// Normalization constant for the weighted engagement rate.
    pub follower_count: u64,
    #[serde(default)]
    pub red_flags: RedFlagThresholds,
    #[serde(default = "default_topics")]
    pub topics: Vec<TopicConfig>,
}

impl Default for AccountProfile {
    fn default() -> Self {
        Self {
            name: "Tracked Account".to_string(),
            follower_count: 88_000,
            red_flags: RedFlagThresholds::default(),
            topics: default_topics(),
        }
    }
}

impl AccountProfile {
    /// Candidate topic labels, in configuration order.
    #[must_use]
    pub fn topic_names(&self) -> Vec<String> {
        self.topics.iter().map(|t| t.name.clone()).collect()
    }
}

fn default_topics() -> Vec<TopicConfig> {
    let topic = |name: &str, keywords: &[&str]| TopicConfig {
        name: name.to_string(),
        keywords: keywords.iter().map(ToString::to_string).collect(),
    };
    vec![
        topic("Economy", &["economy", "jobs", "price", "prices", "tax", "inflation", "business"]),
        topic("Healthcare", &["health", "hospital", "doctor", "doctors", "medicine", "clinic"]),
        topic("Public Safety", &["police", "crime", "safety", "accident", "security"]),
        topic("Environment", &["environment", "climate", "pollution", "water", "trees"]),
        topic("Foreign Policy", &["foreign", "border", "war", "treaty", "diplomacy"]),
        topic("Education", &["school", "schools", "education", "students", "teacher", "college"]),
        topic("Praise", &["thank", "thanks", "proud", "congratulations", "great", "best"]),
        topic("Criticism", &["shame", "corrupt", "failed", "useless", "lies", "worst"]),
        topic("Infrastructure", &["road", "roads", "bridge", "metro", "electricity", "construction"]),
    ]
}

/// Load and validate an account profile from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_account_profile(path: &Path) -> Result<AccountProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::AccountFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let profile: AccountProfile =
        serde_yaml::from_str(&content).map_err(ConfigError::AccountFileParse)?;

    validate_account_profile(&profile)?;

    Ok(profile)
}

fn validate_account_profile(profile: &AccountProfile) -> Result<(), ConfigError> {
    if profile.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "account name must be non-empty".to_string(),
        ));
    }

    if profile.follower_count == 0 {
        return Err(ConfigError::Validation(format!(
            "account '{}' has follower_count 0; must be positive",
            profile.name
        )));
    }

    if !(0.0..=1.0).contains(&profile.red_flags.negative_ratio) {
        return Err(ConfigError::Validation(format!(
            "red_flags.negative_ratio {} must be within [0, 1]",
            profile.red_flags.negative_ratio
        )));
    }

    if profile.topics.is_empty() {
        return Err(ConfigError::Validation(
            "at least one candidate topic is required".to_string(),
        ));
    }

    let mut seen_topics = HashSet::new();
    for topic in &profile.topics {
        if topic.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "topic name must be non-empty".to_string(),
            ));
        }
        if !seen_topics.insert(topic.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate topic name: '{}'",
                topic.name
            )));
        }
    }

    Ok(())
}
