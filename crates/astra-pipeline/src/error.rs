use std::path::PathBuf;

use thiserror::Error;

/// Failure of an injected translation, classification or report capability.
///
/// Always whole-batch: a capability either answers every input of a call or
/// fails the call.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned status {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} returned an invalid response: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// A fatal stage failure. Aborts the current month only.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("required input not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("schema violation in {}: missing columns [{}]", path.display(), missing.join(", "))]
    SchemaViolation { path: PathBuf, missing: Vec<String> },

    #[error("data loss: {dropped} of {total} comments could not be mapped to a post")]
    MappingLoss {
        dropped: usize,
        total: usize,
        /// Offending post ids with their drop counts, most frequent first.
        top_offenders: Vec<(String, usize)>,
    },

    #[error(
        "translation quality: {suspect} of {total} rows look untranslated \
         ({rate:.2}% > {threshold:.2}% threshold)"
    )]
    TranslationQuality {
        suspect: usize,
        total: usize,
        rate: f64,
        threshold: f64,
        /// A few suspect rows as `(language, original, analysis)`.
        examples: Vec<(String, String, String)>,
    },

    #[error("data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("capability failure: {0}")]
    Capability(#[from] CapabilityError),
}

impl StageError {
    /// Extra lines for the failure banner (offending ids, example rows).
    #[must_use]
    pub fn diagnostics(&self) -> Vec<String> {
        match self {
            StageError::MappingLoss {
                dropped,
                total,
                top_offenders,
            } => {
                #[allow(clippy::cast_precision_loss)]
                let pct = if *total == 0 {
                    0.0
                } else {
                    *dropped as f64 / *total as f64 * 100.0
                };
                let mut lines = vec![format!("{dropped} comments discarded ({pct:.2}%)")];
                lines.push("top missing post ids causing discards:".to_string());
                lines.extend(
                    top_offenders
                        .iter()
                        .map(|(id, count)| format!("  - post id {id} (caused {count} discards)")),
                );
                lines.push("action: add these posts to the post catalog".to_string());
                lines
            }
            StageError::TranslationQuality { examples, .. } => examples
                .iter()
                .map(|(lang, original, analysis)| {
                    format!(
                        "lang: {lang}, original: {}..., analysis: {}...",
                        truncate_chars(original, 70),
                        truncate_chars(analysis, 70)
                    )
                })
                .collect(),
            StageError::SchemaViolation { missing, .. } => {
                missing.iter().map(|c| format!("missing column: {c}")).collect()
            }
            _ => Vec::new(),
        }
    }
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
