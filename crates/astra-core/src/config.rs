use std::path::PathBuf;

use crate::account::{load_account_profile, AccountProfile};
use crate::app_config::PipelineConfig;
use crate::ConfigError;

/// Load pipeline configuration from environment variables and the account
/// profile file.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if env values are invalid or the account profile
/// exists but cannot be loaded.
pub fn load_pipeline_config() -> Result<PipelineConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_pipeline_config_from_env()
}

/// Load pipeline configuration from environment variables already in the process.
///
/// Unlike [`load_pipeline_config`], this does NOT load `.env` files.
///
/// A missing account profile file falls back to the built-in profile.
///
/// # Errors
///
/// Returns `ConfigError` if env values are invalid or the account profile
/// exists but cannot be loaded.
pub fn load_pipeline_config_from_env() -> Result<PipelineConfig, ConfigError> {
    let mut config = build_pipeline_config(|key| std::env::var(key))?;
    if config.account_path.exists() {
        config.account = load_account_profile(&config.account_path)?;
    }
    Ok(config)
}

/// Build pipeline configuration using the provided env-var lookup function.
///
/// Pure parsing/validation, decoupled from the process environment so it can
/// be tested with a `HashMap` lookup. The account profile is left at its
/// built-in default.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unparseable or out-of-range values.
pub fn build_pipeline_config<F>(lookup: F) -> Result<PipelineConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_batch = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "batch size must be positive".to_string()));
        }
        Ok(value)
    };

    let parse_range = |var: &str, default: &str, max: f64| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !(0.0..=max).contains(&value) {
            return Err(invalid(var, format!("must be within [0, {max}]")));
        }
        Ok(value)
    };

    let data_dir = PathBuf::from(or_default("ASTRA_DATA_DIR", "."));
    let posts_file = PathBuf::from(or_default("ASTRA_POSTS_FILE", "fb_posts_data.json"));
    let comments_file = PathBuf::from(or_default("ASTRA_COMMENTS_FILE", "fb_comments_data.json"));
    let account_path = PathBuf::from(or_default("ASTRA_ACCOUNT_PATH", "./config/account.yaml"));
    let log_level = or_default("ASTRA_LOG_LEVEL", "info");

    let translate_batch_size = parse_batch("ASTRA_TRANSLATE_BATCH_SIZE", "100")?;
    let enrich_batch_size = parse_batch("ASTRA_ENRICH_BATCH_SIZE", "64")?;
    let translation_failure_threshold_pct =
        parse_range("ASTRA_TRANSLATION_FAILURE_THRESHOLD_PCT", "2.0", 100.0)?;
    let non_latin_ratio = parse_range("ASTRA_NON_LATIN_RATIO", "0.5", 1.0)?;

    let http_timeout_secs = parse_u64("ASTRA_HTTP_TIMEOUT_SECS", "60")?;
    let max_retries = parse_u32("ASTRA_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("ASTRA_RETRY_BACKOFF_BASE_MS", "1000")?;

    let google_translate_api_key = optional("GOOGLE_TRANSLATE_API_KEY");
    let classifier_url = optional("ASTRA_CLASSIFIER_URL");
    let classifier_token = optional("ASTRA_CLASSIFIER_TOKEN");
    let sentiment_model = or_default(
        "ASTRA_SENTIMENT_MODEL",
        "cardiffnlp/twitter-roberta-base-sentiment-latest",
    );
    let topic_model = or_default("ASTRA_TOPIC_MODEL", "MoritzLaurer/mDeBERTa-v3-base-mnli-xnli");
    let google_api_key = optional("GOOGLE_API_KEY");
    let report_model = or_default("ASTRA_REPORT_MODEL", "gemini-1.5-pro-latest");

    Ok(PipelineConfig {
        data_dir,
        posts_file,
        comments_file,
        account_path,
        log_level,
        translate_batch_size,
        enrich_batch_size,
        translation_failure_threshold_pct,
        non_latin_ratio,
        http_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        google_translate_api_key,
        classifier_url,
        classifier_token,
        sentiment_model,
        topic_model,
        google_api_key,
        report_model,
        account: AccountProfile::default(),
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
