//! Google Cloud Translation (v2 REST) client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::retry::{retry_with_backoff, RetryPolicy};
use super::{build_http_client, check_status, expect_count, normalise_base_url};
use crate::capability::{Translation, Translator};
use crate::error::CapabilityError;

const DEFAULT_BASE_URL: &str = "https://translation.googleapis.com";
const SERVICE: &str = "google-translate";

/// Translates batches of text into English.
pub struct GoogleTranslateClient {
    client: Client,
    api_key: String,
    endpoint: String,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a [&'a str],
    target: &'static str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    translations: Vec<TranslatedText>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedText {
    translated_text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

impl GoogleTranslateClient {
    /// Creates a client pointed at the production translation API.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64, retry: RetryPolicy) -> Result<Self, CapabilityError> {
        Self::with_base_url(api_key, timeout_secs, retry, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
        base_url: &str,
    ) -> Result<Self, CapabilityError> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            api_key: api_key.to_owned(),
            endpoint: format!("{}/language/translate/v2", normalise_base_url(base_url)),
            retry,
        })
    }

    async fn request(&self, texts: &[&str]) -> Result<Vec<Translation>, CapabilityError> {
        let body = TranslateRequest {
            q: texts,
            target: "en",
            format: "text",
        };
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let parsed: TranslateResponse = check_status(SERVICE, response)?
            .json()
            .await
            .map_err(|e| CapabilityError::InvalidResponse {
                service: SERVICE,
                reason: e.to_string(),
            })?;

        let translations = parsed.data.translations;
        expect_count(SERVICE, translations.len(), texts.len())?;
        Ok(translations
            .into_iter()
            .map(|t| Translation {
                text: t.translated_text,
                detected_language: t.detected_source_language,
            })
            .collect())
    }
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn translate_batch(&self, texts: &[&str]) -> Result<Vec<Translation>, CapabilityError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        retry_with_backoff(SERVICE, self.retry, || self.request(texts)).await
    }
}
