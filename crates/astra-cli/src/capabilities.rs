//! Capability wiring from configuration.
//!
//! Translation and report writing need API keys. Classification uses a
//! hosted inference endpoint when one is configured and falls back to the
//! offline lexicon and keyword matchers otherwise.

use anyhow::Context;
use astra_core::PipelineConfig;
use astra_pipeline::{
    Capabilities, GeminiClient, GoogleTranslateClient, HfInferenceClient, KeywordTopics,
    LexiconSentiment, ReportWriter, RetryPolicy, SentimentClassifier, TopicClassifier, Translator,
};

fn retry_policy(config: &PipelineConfig) -> RetryPolicy {
    RetryPolicy {
        max_retries: config.max_retries,
        backoff_base_ms: config.retry_backoff_base_ms,
    }
}

pub(crate) fn translator(config: &PipelineConfig) -> anyhow::Result<Box<dyn Translator>> {
    let key = config
        .google_translate_api_key
        .as_deref()
        .context("GOOGLE_TRANSLATE_API_KEY must be set to translate comments")?;
    let client = GoogleTranslateClient::new(key, config.http_timeout_secs, retry_policy(config))?;
    Ok(Box::new(client))
}

pub(crate) fn classifiers(
    config: &PipelineConfig,
) -> anyhow::Result<(Box<dyn SentimentClassifier>, Box<dyn TopicClassifier>)> {
    let Some(url) = config.classifier_url.as_deref() else {
        tracing::info!("ASTRA_CLASSIFIER_URL not set; using offline lexicon and keyword classifiers");
        return Ok((
            Box::new(LexiconSentiment),
            Box::new(KeywordTopics::new(&config.account.topics)),
        ));
    };

    let build = || {
        HfInferenceClient::new(
            url,
            config.classifier_token.as_deref(),
            &config.sentiment_model,
            &config.topic_model,
            config.http_timeout_secs,
            retry_policy(config),
        )
    };
    tracing::info!(
        url,
        sentiment_model = %config.sentiment_model,
        topic_model = %config.topic_model,
        "using hosted classifiers"
    );
    Ok((Box::new(build()?), Box::new(build()?)))
}

pub(crate) fn report_writer(config: &PipelineConfig) -> anyhow::Result<Box<dyn ReportWriter>> {
    let key = config
        .google_api_key
        .as_deref()
        .context("GOOGLE_API_KEY must be set to generate reports")?;
    let client = GeminiClient::new(
        key,
        &config.report_model,
        config.http_timeout_secs,
        retry_policy(config),
    )?;
    Ok(Box::new(client))
}

/// Everything a full run needs. The report writer is only built when
/// reports are requested.
pub(crate) fn for_run(
    config: &PipelineConfig,
    generate_reports: bool,
) -> anyhow::Result<Capabilities> {
    let (sentiment, topics) = classifiers(config)?;
    let reporter = if generate_reports {
        Some(report_writer(config)?)
    } else {
        None
    };
    Ok(Capabilities {
        translator: translator(config)?,
        sentiment,
        topics,
        reporter,
    })
}
