//! Annotate analysis-ready comments with sentiment and topic.

use astra_core::{EnrichedComment, Month, NormalizedComment};

use crate::artifacts::{read_csv, write_csv, ArtifactLayout};
use crate::capability::{sentiment_score, SentimentClassifier, TopicClassifier};
use crate::error::{CapabilityError, StageError};
use crate::topics::UNCATEGORIZED;

/// Counters from one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    pub rows: usize,
    pub analyzed: usize,
    pub batches: usize,
    pub failed_sentiment_batches: usize,
    pub failed_topic_batches: usize,
}

fn checked<T>(result: Result<Vec<T>, CapabilityError>, expected: usize) -> Result<Vec<T>, String> {
    match result {
        Ok(v) if v.len() == expected => Ok(v),
        Ok(v) => Err(format!("{} results for {expected} inputs", v.len())),
        Err(e) => Err(e.to_string()),
    }
}

/// Classify every row with analyzable text, in batches of `batch_size`.
///
/// Sentiment and topic batches fail independently: a failed sentiment batch
/// scores its rows 0, a failed topic batch labels them `Uncategorized`.
pub async fn enrich_comments(
    rows: Vec<NormalizedComment>,
    sentiment: &dyn SentimentClassifier,
    topics: &dyn TopicClassifier,
    candidates: &[String],
    batch_size: usize,
) -> (Vec<EnrichedComment>, EnrichStats) {
    let mut stats = EnrichStats {
        rows: rows.len(),
        ..EnrichStats::default()
    };
    let mut scores: Vec<Option<f64>> = vec![None; rows.len()];
    let mut labels: Vec<Option<String>> = vec![None; rows.len()];

    let analyzable: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.text_for_analysis.trim().is_empty())
        .map(|(i, _)| i)
        .collect();
    stats.analyzed = analyzable.len();

    for (batch_no, chunk) in analyzable.chunks(batch_size.max(1)).enumerate() {
        stats.batches += 1;
        let texts: Vec<&str> = chunk
            .iter()
            .map(|&i| rows[i].text_for_analysis.as_str())
            .collect();

        match checked(sentiment.classify_sentiment(&texts).await, chunk.len()) {
            Ok(batch) => {
                for (&i, label) in chunk.iter().zip(batch) {
                    scores[i] = Some(sentiment_score(&label));
                }
            }
            Err(reason) => {
                tracing::error!(batch = batch_no + 1, error = %reason, "sentiment batch failed; scoring rows neutral");
                stats.failed_sentiment_batches += 1;
                for &i in chunk {
                    scores[i] = Some(0.0);
                }
            }
        }

        match checked(topics.classify_topics(&texts, candidates).await, chunk.len()) {
            Ok(batch) => {
                for (&i, label) in chunk.iter().zip(batch) {
                    let label = if label == UNCATEGORIZED || candidates.contains(&label) {
                        label
                    } else {
                        tracing::warn!(
                            batch = batch_no + 1,
                            label = %label,
                            "topic outside candidate set; labelling row uncategorized"
                        );
                        UNCATEGORIZED.to_string()
                    };
                    labels[i] = Some(label);
                }
            }
            Err(reason) => {
                tracing::error!(batch = batch_no + 1, error = %reason, "topic batch failed; labelling rows uncategorized");
                stats.failed_topic_batches += 1;
                for &i in chunk {
                    labels[i] = Some(UNCATEGORIZED.to_string());
                }
            }
        }
    }

    let enriched = rows
        .into_iter()
        .zip(scores.into_iter().zip(labels))
        .map(|(row, (score, topic))| EnrichedComment::from_normalized(row, score, topic))
        .collect();
    (enriched, stats)
}

/// Enrich `analysis_ready_<month>.csv` into `enriched_data_<month>.csv`.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the normalized artifact is absent;
/// `Csv`/`Io` on read or write failure. Classifier failures are absorbed.
pub async fn run_enrichment(
    layout: &ArtifactLayout,
    month: Month,
    sentiment: &dyn SentimentClassifier,
    topics: &dyn TopicClassifier,
    candidates: &[String],
    batch_size: usize,
) -> Result<EnrichStats, StageError> {
    let rows: Vec<NormalizedComment> = read_csv(&layout.normalized(month))?;
    let (enriched, stats) = enrich_comments(rows, sentiment, topics, candidates, batch_size).await;
    write_csv(&layout.enriched(month), &enriched)?;
    tracing::info!(
        month = %month,
        rows = stats.rows,
        analyzed = stats.analyzed,
        failed_sentiment_batches = stats.failed_sentiment_batches,
        failed_topic_batches = stats.failed_topic_batches,
        "enriched comments written"
    );
    Ok(stats)
}
