//! Gemini `generateContent` client for narrative reports.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::retry::{retry_with_backoff, RetryPolicy};
use super::{build_http_client, check_status, normalise_base_url};
use crate::capability::ReportWriter;
use crate::error::CapabilityError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const SERVICE: &str = "gemini";

pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    /// Creates a client for `model` on the production API.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Result<Self, CapabilityError> {
        Self::with_base_url(api_key, model, timeout_secs, retry, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
        base_url: &str,
    ) -> Result<Self, CapabilityError> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            api_key: api_key.to_owned(),
            endpoint: format!(
                "{}/v1beta/models/{model}:generateContent",
                normalise_base_url(base_url)
            ),
            retry,
        })
    }

    async fn request(&self, prompt: &str) -> Result<String, CapabilityError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let parsed: GenerateResponse = check_status(SERVICE, response)?
            .json()
            .await
            .map_err(|e| CapabilityError::InvalidResponse {
                service: SERVICE,
                reason: e.to_string(),
            })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(CapabilityError::InvalidResponse {
                service: SERVICE,
                reason: "no text in response".to_owned(),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl ReportWriter for GeminiClient {
    async fn write_report(&self, prompt: &str) -> Result<String, CapabilityError> {
        retry_with_backoff(SERVICE, self.retry, || self.request(prompt)).await
    }
}
