//! Injected capabilities: translation, classification and report writing.
//!
//! Every call is a batch call that either returns one answer per input, in
//! input order, or fails as a whole. Stages own the fallback policy.

use async_trait::async_trait;

use crate::error::CapabilityError;

/// One translated text with the language the service detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub detected_language: Option<String>,
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate each text into English.
    async fn translate_batch(&self, texts: &[&str]) -> Result<Vec<Translation>, CapabilityError>;
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify each text, returning a raw label such as `positive`.
    async fn classify_sentiment(&self, texts: &[&str]) -> Result<Vec<String>, CapabilityError>;
}

#[async_trait]
pub trait TopicClassifier: Send + Sync {
    /// Pick one label from `candidates` for each text.
    async fn classify_topics(
        &self,
        texts: &[&str],
        candidates: &[String],
    ) -> Result<Vec<String>, CapabilityError>;
}

#[async_trait]
pub trait ReportWriter: Send + Sync {
    /// Produce narrative report text for a fully assembled prompt.
    async fn write_report(&self, prompt: &str) -> Result<String, CapabilityError>;
}

/// Map a sentiment label to its score: `positive` → 1, `negative` → -1,
/// anything else → 0.
#[must_use]
pub fn sentiment_score(label: &str) -> f64 {
    match label.trim().to_ascii_lowercase().as_str() {
        "positive" => 1.0,
        "negative" => -1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_score_maps_three_way_labels() {
        assert!((sentiment_score("positive") - 1.0).abs() < f64::EPSILON);
        assert!((sentiment_score("Negative") + 1.0).abs() < f64::EPSILON);
        assert!(sentiment_score("neutral").abs() < f64::EPSILON);
    }

    #[test]
    fn sentiment_score_unknown_label_is_neutral() {
        assert!(sentiment_score("LABEL_7").abs() < f64::EPSILON);
        assert!(sentiment_score("").abs() < f64::EPSILON);
    }
}
