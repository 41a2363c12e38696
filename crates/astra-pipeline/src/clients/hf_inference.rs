//! Hugging Face inference-style classification client.
//!
//! Sentiment uses a text-classification model (`[[{label, score}]]` per
//! input); topics use a zero-shot model (`{labels, scores}` per input).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use super::retry::{retry_with_backoff, RetryPolicy};
use super::{build_http_client, check_status, expect_count, normalise_base_url};
use crate::capability::{SentimentClassifier, TopicClassifier};
use crate::error::CapabilityError;

const SERVICE: &str = "hf-inference";

/// Classification client for sentiment and zero-shot topic models.
pub struct HfInferenceClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    sentiment_model: String,
    topic_model: String,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct SentimentRequest<'a> {
    inputs: &'a [&'a str],
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a [&'a str],
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
}

#[derive(Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Deserialize)]
struct ZeroShotResult {
    labels: Vec<String>,
    scores: Vec<f64>,
}

impl HfInferenceClient {
    /// Creates a client for an inference server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        sentiment_model: &str,
        topic_model: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Result<Self, CapabilityError> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            base_url: normalise_base_url(base_url),
            token: token.map(str::to_owned),
            sentiment_model: sentiment_model.to_owned(),
            topic_model: topic_model.to_owned(),
            retry,
        })
    }

    fn post(&self, model: &str) -> RequestBuilder {
        let builder = self
            .client
            .post(format!("{}/models/{model}", self.base_url));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn request_sentiment(&self, texts: &[&str]) -> Result<Vec<String>, CapabilityError> {
        let response = self
            .post(&self.sentiment_model)
            .json(&SentimentRequest { inputs: texts })
            .send()
            .await?;
        let parsed: Vec<Vec<LabelScore>> = check_status(SERVICE, response)?
            .json()
            .await
            .map_err(|e| CapabilityError::InvalidResponse {
                service: SERVICE,
                reason: e.to_string(),
            })?;
        expect_count(SERVICE, parsed.len(), texts.len())?;

        parsed
            .into_iter()
            .map(|candidates| {
                candidates
                    .into_iter()
                    .max_by(|a, b| a.score.total_cmp(&b.score))
                    .map(|best| best.label)
                    .ok_or_else(|| CapabilityError::InvalidResponse {
                        service: SERVICE,
                        reason: "empty label list".to_owned(),
                    })
            })
            .collect()
    }

    async fn request_topics(
        &self,
        texts: &[&str],
        candidates: &[String],
    ) -> Result<Vec<String>, CapabilityError> {
        let body = ZeroShotRequest {
            inputs: texts,
            parameters: ZeroShotParameters {
                candidate_labels: candidates,
            },
        };
        let response = self.post(&self.topic_model).json(&body).send().await?;
        let parsed: Vec<ZeroShotResult> = check_status(SERVICE, response)?
            .json()
            .await
            .map_err(|e| CapabilityError::InvalidResponse {
                service: SERVICE,
                reason: e.to_string(),
            })?;
        expect_count(SERVICE, parsed.len(), texts.len())?;

        parsed.into_iter().map(top_label).collect()
    }
}

/// Highest-scoring label of a zero-shot result.
fn top_label(result: ZeroShotResult) -> Result<String, CapabilityError> {
    result
        .labels
        .into_iter()
        .zip(result.scores)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(label, _)| label)
        .ok_or_else(|| CapabilityError::InvalidResponse {
            service: SERVICE,
            reason: "empty zero-shot result".to_owned(),
        })
}

#[async_trait]
impl SentimentClassifier for HfInferenceClient {
    async fn classify_sentiment(&self, texts: &[&str]) -> Result<Vec<String>, CapabilityError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        retry_with_backoff(SERVICE, self.retry, || self.request_sentiment(texts)).await
    }
}

#[async_trait]
impl TopicClassifier for HfInferenceClient {
    async fn classify_topics(
        &self,
        texts: &[&str],
        candidates: &[String],
    ) -> Result<Vec<String>, CapabilityError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        retry_with_backoff(SERVICE, self.retry, || self.request_topics(texts, candidates)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_label_picks_highest_score() {
        let result = ZeroShotResult {
            labels: vec!["Economy".into(), "Praise".into()],
            scores: vec![0.2, 0.8],
        };
        assert_eq!(top_label(result).unwrap(), "Praise");
    }

    #[test]
    fn top_label_rejects_empty_result() {
        let result = ZeroShotResult {
            labels: Vec::new(),
            scores: Vec::new(),
        };
        assert!(matches!(
            top_label(result),
            Err(CapabilityError::InvalidResponse { .. })
        ));
    }
}
