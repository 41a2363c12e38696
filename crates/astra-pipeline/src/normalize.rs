//! Clean and translate mapped comments into analysis-ready text.

use astra_core::{MappedComment, Month, NormalizedComment};

use crate::artifacts::{read_csv, write_csv, ArtifactLayout};
use crate::capability::Translator;
use crate::clean::clean_text;
use crate::error::StageError;

/// Language recorded for every row of a batch the translator failed on.
pub const ERROR_LANGUAGE: &str = "error";

/// Language assumed when the translator reports none.
const DEFAULT_LANGUAGE: &str = "en";

/// Counters from one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub input_rows: usize,
    /// Rows whose cleaned text was empty.
    pub excluded: usize,
    pub batches: usize,
    pub failed_batches: usize,
}

struct Pending {
    row: MappedComment,
    cleaned: String,
}

/// Clean every comment, translate the non-empty ones in batches of
/// `batch_size`, and build normalized rows.
///
/// A failed batch never aborts the pass: its rows keep their cleaned text
/// with language [`ERROR_LANGUAGE`]. A blank translation also falls back to
/// the cleaned text, so every row that survives cleaning yields exactly one
/// output row.
pub async fn normalize_comments(
    rows: Vec<MappedComment>,
    translator: &dyn Translator,
    batch_size: usize,
) -> (Vec<NormalizedComment>, NormalizeStats) {
    let mut stats = NormalizeStats {
        input_rows: rows.len(),
        ..NormalizeStats::default()
    };

    let pending: Vec<Pending> = rows
        .into_iter()
        .filter_map(|row| {
            let cleaned = clean_text(&row.comment_text);
            (!cleaned.is_empty()).then_some(Pending { row, cleaned })
        })
        .collect();
    stats.excluded = stats.input_rows - pending.len();

    let mut out = Vec::with_capacity(pending.len());
    let total_batches = pending.len().div_ceil(batch_size.max(1));
    for (batch_no, chunk) in pending.chunks(batch_size.max(1)).enumerate() {
        stats.batches += 1;
        let texts: Vec<&str> = chunk.iter().map(|p| p.cleaned.as_str()).collect();
        tracing::debug!(batch = batch_no + 1, total_batches, rows = texts.len(), "translating batch");

        let translated = match translator.translate_batch(&texts).await {
            Ok(results) if results.len() == chunk.len() => Some(results),
            Ok(results) => {
                tracing::error!(
                    batch = batch_no + 1,
                    expected = chunk.len(),
                    got = results.len(),
                    "translator returned wrong number of results; keeping cleaned text"
                );
                None
            }
            Err(e) => {
                tracing::error!(batch = batch_no + 1, error = %e, "translation batch failed; keeping cleaned text");
                None
            }
        };
        if translated.is_none() {
            stats.failed_batches += 1;
        }

        for (i, p) in chunk.iter().enumerate() {
            let (language, analysis) = match translated.as_ref().map(|t| &t[i]) {
                Some(t) => {
                    let language = t
                        .detected_language
                        .as_deref()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .unwrap_or(DEFAULT_LANGUAGE)
                        .to_string();
                    let analysis = if t.text.trim().is_empty() {
                        p.cleaned.clone()
                    } else {
                        t.text.clone()
                    };
                    (language, analysis)
                }
                None => (ERROR_LANGUAGE.to_string(), p.cleaned.clone()),
            };
            out.push(NormalizedComment {
                post_id: p.row.post_id.clone(),
                post_caption: p.row.post_caption.clone(),
                content_type: p.row.content_type.clone(),
                total_likes: p.row.total_likes,
                num_shares: p.row.num_shares,
                comment_likes: p.row.comment_likes,
                original_comment_for_context: p.row.comment_text.clone(),
                original_language: language,
                text_for_analysis: analysis,
            });
        }
    }

    (out, stats)
}

/// Normalize `processed_comments_<month>.csv` into
/// `analysis_ready_<month>.csv`.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the mapped artifact is absent; `Csv`/`Io`
/// on read or write failure. Translation failures are absorbed.
pub async fn run_translation(
    layout: &ArtifactLayout,
    month: Month,
    translator: &dyn Translator,
    batch_size: usize,
) -> Result<NormalizeStats, StageError> {
    let rows: Vec<MappedComment> = read_csv(&layout.mapped(month))?;
    let (normalized, stats) = normalize_comments(rows, translator, batch_size).await;

    write_csv(&layout.normalized(month), &normalized)?;
    if stats.failed_batches > 0 {
        tracing::warn!(
            month = %month,
            failed_batches = stats.failed_batches,
            batches = stats.batches,
            "some translation batches failed"
        );
    }
    tracing::info!(
        month = %month,
        rows = normalized.len(),
        excluded = stats.excluded,
        "analysis-ready comments written"
    );
    Ok(stats)
}
