//! Month-partitioned comment analysis pipeline.
//!
//! Splits a bulk comment export by month, joins comments to their posts,
//! normalizes and translates the text, classifies sentiment and topic,
//! and aggregates per-post summaries. Every stage reads the previous stage's
//! file artifact and is guarded by a validator, so a bad month halts alone.

pub mod aggregate;
pub mod artifacts;
pub mod capability;
pub mod clean;
pub mod clients;
pub mod enrich;
pub mod error;
pub mod mapping;
pub mod normalize;
pub mod orchestrator;
pub mod partition;
pub mod red_flags;
pub mod report;
pub mod sanitize;
pub mod scorer;
pub mod topics;
pub mod validate;

pub use artifacts::ArtifactLayout;
pub use capability::{ReportWriter, SentimentClassifier, TopicClassifier, Translation, Translator};
pub use clients::{GeminiClient, GoogleTranslateClient, HfInferenceClient, RetryPolicy};
pub use error::{CapabilityError, StageError};
pub use orchestrator::{run_month, run_pipeline, Capabilities, RunOutcome};
pub use scorer::{lexicon_score, LexiconSentiment};
pub use topics::{KeywordTopics, UNCATEGORIZED};
pub use validate::{ValidationReport, ValidationState};
