//! Offline keyword topic classifier driven by the account profile.

use async_trait::async_trait;

use astra_core::TopicConfig;

use crate::capability::TopicClassifier;
use crate::error::CapabilityError;

/// Label for texts that match no topic.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Picks the candidate topic whose keywords occur most often in the text.
///
/// Ties go to the topic listed first in the profile. Texts with no keyword
/// hit are [`UNCATEGORIZED`].
#[derive(Debug, Clone)]
pub struct KeywordTopics {
    topics: Vec<(String, Vec<String>)>,
}

impl KeywordTopics {
    #[must_use]
    pub fn new(topics: &[TopicConfig]) -> Self {
        Self {
            topics: topics
                .iter()
                .map(|t| {
                    (
                        t.name.clone(),
                        t.keywords.iter().map(|k| k.to_lowercase()).collect(),
                    )
                })
                .collect(),
        }
    }

    fn classify_one(&self, text: &str, candidates: &[String]) -> String {
        let lowered = text.to_lowercase();
        let mut best: Option<(&str, usize)> = None;
        for (name, keywords) in &self.topics {
            if !candidates.iter().any(|c| c == name) {
                continue;
            }
            let hits = keywords
                .iter()
                .filter(|k| !k.is_empty())
                .map(|k| lowered.matches(k.as_str()).count())
                .sum::<usize>();
            if hits > 0 && best.is_none_or(|(_, top)| hits > top) {
                best = Some((name, hits));
            }
        }
        best.map_or_else(|| UNCATEGORIZED.to_owned(), |(name, _)| name.to_owned())
    }
}

#[async_trait]
impl TopicClassifier for KeywordTopics {
    async fn classify_topics(
        &self,
        texts: &[&str],
        candidates: &[String],
    ) -> Result<Vec<String>, CapabilityError> {
        Ok(texts
            .iter()
            .map(|t| self.classify_one(t, candidates))
            .collect())
    }
}
