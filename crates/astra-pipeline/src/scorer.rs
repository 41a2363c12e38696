//! Offline lexicon sentiment classifier.
//!
//! Used when no inference endpoint is configured. Produces the same
//! three-way labels as a hosted model so downstream scoring is unchanged.

use async_trait::async_trait;

use crate::capability::SentimentClassifier;
use crate::error::CapabilityError;

/// Word weights for public comments on an account's posts.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("great", 0.4),
    ("good", 0.3),
    ("excellent", 0.5),
    ("thank", 0.4),
    ("thanks", 0.4),
    ("proud", 0.5),
    ("support", 0.3),
    ("agree", 0.3),
    ("love", 0.5),
    ("best", 0.5),
    ("well", 0.2),
    ("congratulations", 0.5),
    ("bravo", 0.5),
    ("hope", 0.2),
    ("amazing", 0.5),
    ("fair", 0.3),
    ("honest", 0.4),
    ("helpful", 0.4),
    ("progress", 0.3),
    ("win", 0.4),
    // Negative signals
    ("bad", -0.4),
    ("terrible", -0.6),
    ("worst", -0.6),
    ("corrupt", -0.7),
    ("corruption", -0.7),
    ("liar", -0.7),
    ("lies", -0.6),
    ("shame", -0.6),
    ("disgrace", -0.7),
    ("failed", -0.4),
    ("failure", -0.4),
    ("useless", -0.5),
    ("incompetent", -0.6),
    ("resign", -0.5),
    ("angry", -0.5),
    ("problem", -0.3),
    ("wrong", -0.4),
    ("disappointed", -0.5),
    ("hate", -0.6),
    ("scandal", -0.6),
];

/// Scores within this distance of zero are labelled `neutral`.
const NEUTRAL_BAND: f32 = 0.05;

/// Score a text string using the lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if let Some(&(_, weight)) = LEXICON.iter().find(|(lex_word, _)| *lex_word == w) {
            score += weight;
        }
    }
    score.clamp(-1.0, 1.0)
}

/// Three-way label for a lexicon score.
#[must_use]
pub fn lexicon_label(text: &str) -> &'static str {
    let score = lexicon_score(text);
    if score > NEUTRAL_BAND {
        "positive"
    } else if score < -NEUTRAL_BAND {
        "negative"
    } else {
        "neutral"
    }
}

/// [`SentimentClassifier`] backed by [`lexicon_label`]. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconSentiment;

#[async_trait]
impl SentimentClassifier for LexiconSentiment {
    async fn classify_sentiment(&self, texts: &[&str]) -> Result<Vec<String>, CapabilityError> {
        Ok(texts.iter().map(|t| lexicon_label(t).to_owned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_unknown_text_score_zero() {
        assert_eq!(lexicon_score(""), 0.0);
        assert_eq!(lexicon_score("   "), 0.0);
        assert_eq!(lexicon_score("the quick brown fox"), 0.0);
    }

    #[test]
    fn mixed_text_sums_weights() {
        // great (+0.4) + corrupt (-0.7)
        let score = lexicon_score("great speech but corrupt party");
        assert!((score + 0.3).abs() < 1e-6, "got {score}");
    }

    #[test]
    fn score_clamps_to_unit_range() {
        assert_eq!(
            lexicon_score("great excellent best love amazing proud bravo"),
            1.0
        );
        assert_eq!(
            lexicon_score("corrupt liar disgrace shame scandal hate worst"),
            -1.0
        );
    }

    #[test]
    fn punctuation_stripped_from_words() {
        assert!(lexicon_score("Thanks!") > 0.0);
        assert!(lexicon_score("...shame.") < 0.0);
    }

    #[test]
    fn labels_use_neutral_band() {
        assert_eq!(lexicon_label("great work"), "positive");
        assert_eq!(lexicon_label("what a disgrace"), "negative");
        assert_eq!(lexicon_label("see you tomorrow"), "neutral");
    }

    #[tokio::test]
    async fn classifier_returns_one_label_per_input() {
        let labels = LexiconSentiment
            .classify_sentiment(&["thank you", "liar", "ok"])
            .await
            .unwrap();
        assert_eq!(labels, vec!["positive", "negative", "neutral"]);
    }
}
