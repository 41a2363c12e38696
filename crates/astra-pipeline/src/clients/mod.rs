//! HTTP-backed capability implementations.

mod gemini;
mod google_translate;
mod hf_inference;
pub(crate) mod retry;

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::CapabilityError;

pub use gemini::GeminiClient;
pub use google_translate::GoogleTranslateClient;
pub use hf_inference::HfInferenceClient;
pub use retry::RetryPolicy;

fn build_http_client(timeout_secs: u64) -> Result<Client, CapabilityError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent("astra/0.1 (comment-analysis)")
        .build()?)
}

fn normalise_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_owned()
}

/// Map a non-2xx response to [`CapabilityError::Status`].
fn check_status(service: &'static str, response: Response) -> Result<Response, CapabilityError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(CapabilityError::Status {
            service,
            status: status.as_u16(),
        })
    }
}

fn expect_count(service: &'static str, got: usize, expected: usize) -> Result<(), CapabilityError> {
    if got == expected {
        Ok(())
    } else {
        Err(CapabilityError::InvalidResponse {
            service,
            reason: format!("{got} results for {expected} inputs"),
        })
    }
}
