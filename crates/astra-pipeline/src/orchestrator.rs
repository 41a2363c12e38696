//! Month-by-month pipeline driver.
//!
//! Partitioning and month discovery are fatal for the whole run. After that
//! each month runs every stage in order; the first error aborts that month
//! only and the run moves on to the next one.

use astra_core::{Month, PipelineConfig};

use crate::aggregate::run_aggregation;
use crate::artifacts::ArtifactLayout;
use crate::capability::{ReportWriter, SentimentClassifier, TopicClassifier, Translator};
use crate::enrich::run_enrichment;
use crate::error::{CapabilityError, StageError};
use crate::mapping::run_mapping;
use crate::normalize::run_translation;
use crate::partition::{discover_months, run_partition, PartitionSummary};
use crate::report::run_report;
use crate::validate::{verify_final_outputs, verify_mapping, verify_translation};

/// Capability implementations injected into the stages.
pub struct Capabilities {
    pub translator: Box<dyn Translator>,
    pub sentiment: Box<dyn SentimentClassifier>,
    pub topics: Box<dyn TopicClassifier>,
    /// Required only when reports are generated.
    pub reporter: Option<Box<dyn ReportWriter>>,
}

/// Result of a full run.
#[derive(Debug)]
pub struct RunOutcome {
    pub partition: PartitionSummary,
    pub succeeded: Vec<Month>,
    pub failed: Vec<(Month, StageError)>,
}

/// Run every stage for one month, in order, stopping at the first failure.
///
/// # Errors
///
/// The first [`StageError`] raised by a stage or validator.
pub async fn run_month(
    config: &PipelineConfig,
    caps: &Capabilities,
    month: Month,
    generate_reports: bool,
) -> Result<(), StageError> {
    let layout = ArtifactLayout::from_config(config);
    let candidates = config.account.topic_names();

    run_mapping(config, &layout, month)?;
    verify_mapping(config, &layout, month)?;

    run_translation(
        &layout,
        month,
        caps.translator.as_ref(),
        config.translate_batch_size,
    )
    .await?;
    verify_translation(
        &layout,
        month,
        config.non_latin_ratio,
        config.translation_failure_threshold_pct,
    )?;

    run_enrichment(
        &layout,
        month,
        caps.sentiment.as_ref(),
        caps.topics.as_ref(),
        &candidates,
        config.enrich_batch_size,
    )
    .await?;
    run_aggregation(&layout, month, config.account.follower_count)?;
    verify_final_outputs(&layout, month)?;

    if generate_reports {
        let writer = caps
            .reporter
            .as_deref()
            .ok_or(StageError::Capability(CapabilityError::NotConfigured(
                "report writer",
            )))?;
        run_report(&layout, month, &config.account, writer).await?;
    }
    Ok(())
}

/// Partition the bulk export, then process every discovered month.
///
/// # Errors
///
/// Only partitioning or month discovery failures; per-month failures are
/// collected in [`RunOutcome::failed`].
pub async fn run_pipeline(
    config: &PipelineConfig,
    caps: &Capabilities,
    generate_reports: bool,
) -> Result<RunOutcome, StageError> {
    let layout = ArtifactLayout::from_config(config);
    let partition = run_partition(&config.comments_path(), &layout)?;
    let months = discover_months(&layout)?;
    if months.is_empty() {
        tracing::warn!("no monthly partitions found");
    } else {
        tracing::info!(months = months.len(), "processing monthly partitions");
    }

    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for month in months {
        tracing::info!(month = %month, "processing month");
        match run_month(config, caps, month, generate_reports).await {
            Ok(()) => {
                tracing::info!(month = %month, "month completed");
                succeeded.push(month);
            }
            Err(e) => {
                tracing::error!(month = %month, error = %e, "pipeline halted for month; continuing");
                failed.push((month, e));
            }
        }
    }

    Ok(RunOutcome {
        partition,
        succeeded,
        failed,
    })
}
