//! Command handlers for the individual pipeline stages and the full run.

use astra_core::{Month, PipelineConfig};
use astra_pipeline::aggregate::run_aggregation;
use astra_pipeline::enrich::run_enrichment;
use astra_pipeline::mapping::run_mapping;
use astra_pipeline::normalize::run_translation;
use astra_pipeline::partition::run_partition;
use astra_pipeline::red_flags::run_red_flags;
use astra_pipeline::report::{run_report, ReportOutcome};
use astra_pipeline::sanitize::{diagnose_summary, sanitize_summary_file};
use astra_pipeline::validate;
use astra_pipeline::{run_pipeline, ArtifactLayout};

use crate::capabilities;
use crate::output::{check, failed, passed};

pub(crate) fn partition(config: &PipelineConfig) -> anyhow::Result<()> {
    let layout = ArtifactLayout::from_config(config);
    let summary = run_partition(&config.comments_path(), &layout)?;
    for (month, rows) in &summary.months {
        println!("{month}: {rows} comments");
    }
    println!(
        "partitioned {} comments into {} months ({} without a usable date)",
        summary.total,
        summary.months.len(),
        summary.dropped
    );
    Ok(())
}

pub(crate) fn map(config: &PipelineConfig, month: Month) -> anyhow::Result<()> {
    let layout = ArtifactLayout::from_config(config);
    let report = check("mapping", month, run_mapping(config, &layout, month))?;
    println!(
        "mapped {} of {} comments for {month} ({} discarded)",
        report.mapped, report.total, report.dropped
    );
    Ok(())
}

pub(crate) fn verify_mapping(config: &PipelineConfig, month: Month) -> anyhow::Result<()> {
    let layout = ArtifactLayout::from_config(config);
    let report = check(
        "mapping check",
        month,
        validate::verify_mapping(config, &layout, month),
    )?;
    passed(&report);
    Ok(())
}

pub(crate) async fn translate(config: &PipelineConfig, month: Month) -> anyhow::Result<()> {
    let translator = capabilities::translator(config)?;
    let layout = ArtifactLayout::from_config(config);
    let stats = check(
        "translation",
        month,
        run_translation(&layout, month, translator.as_ref(), config.translate_batch_size).await,
    )?;
    println!(
        "normalized {} comments for {month} ({} excluded, {} of {} batches failed)",
        stats.input_rows - stats.excluded,
        stats.excluded,
        stats.failed_batches,
        stats.batches
    );
    Ok(())
}

pub(crate) fn verify_translation(config: &PipelineConfig, month: Month) -> anyhow::Result<()> {
    let layout = ArtifactLayout::from_config(config);
    let report = check(
        "translation check",
        month,
        validate::verify_translation(
            &layout,
            month,
            config.non_latin_ratio,
            config.translation_failure_threshold_pct,
        ),
    )?;
    passed(&report);
    Ok(())
}

pub(crate) async fn enrich(config: &PipelineConfig, month: Month) -> anyhow::Result<()> {
    let (sentiment, topics) = capabilities::classifiers(config)?;
    let layout = ArtifactLayout::from_config(config);
    let stats = check(
        "enrichment",
        month,
        run_enrichment(
            &layout,
            month,
            sentiment.as_ref(),
            topics.as_ref(),
            &config.account.topic_names(),
            config.enrich_batch_size,
        )
        .await,
    )?;
    println!(
        "enriched {} of {} comments for {month} ({} sentiment and {} topic batches failed)",
        stats.analyzed, stats.rows, stats.failed_sentiment_batches, stats.failed_topic_batches
    );
    Ok(())
}

pub(crate) fn aggregate(config: &PipelineConfig, month: Month) -> anyhow::Result<()> {
    let layout = ArtifactLayout::from_config(config);
    let posts = check(
        "aggregation",
        month,
        run_aggregation(&layout, month, config.account.follower_count),
    )?;
    println!("summarized {posts} posts for {month}");
    Ok(())
}

pub(crate) fn verify_final(config: &PipelineConfig, month: Month) -> anyhow::Result<()> {
    let layout = ArtifactLayout::from_config(config);
    let reports = check(
        "final check",
        month,
        validate::verify_final_outputs(&layout, month),
    )?;
    for report in &reports {
        passed(report);
    }
    Ok(())
}

pub(crate) async fn report(config: &PipelineConfig, month: Month) -> anyhow::Result<()> {
    let layout = ArtifactLayout::from_config(config);
    if layout.report(month).exists() {
        println!("report for {month} already exists; skipping");
        return Ok(());
    }
    let writer = capabilities::report_writer(config)?;
    let outcome = check(
        "report",
        month,
        run_report(&layout, month, &config.account, writer.as_ref()).await,
    )?;
    match outcome {
        ReportOutcome::Written(path) => println!("report written to {}", path.display()),
        ReportOutcome::Skipped(path) => println!("report already at {}", path.display()),
    }
    Ok(())
}

pub(crate) fn red_flags(config: &PipelineConfig, month: Month) -> anyhow::Result<()> {
    let layout = ArtifactLayout::from_config(config);
    let flagged = check(
        "red flags",
        month,
        run_red_flags(&layout, month, &config.account.red_flags),
    )?;
    if flagged.is_empty() {
        println!("no red-flag posts for {month}");
        return Ok(());
    }
    println!("{} red-flag posts for {month}:", flagged.len());
    for post in &flagged {
        println!(
            "  {}  comments={}  negative={:.0}%  topic={}",
            post.post_id,
            post.comment_count,
            post.negative_comment_ratio * 100.0,
            post.main_topic
        );
    }
    Ok(())
}

pub(crate) fn sanitize(config: &PipelineConfig, month: Month) -> anyhow::Result<()> {
    let layout = ArtifactLayout::from_config(config);
    let replaced = check("sanitize", month, sanitize_summary_file(&layout, month))?;
    println!("replaced {replaced} missing cells in the {month} summary");
    Ok(())
}

pub(crate) fn diagnose(config: &PipelineConfig, month: Month) -> anyhow::Result<()> {
    let layout = ArtifactLayout::from_config(config);
    let rows = check("diagnose", month, diagnose_summary(&layout, month))?;
    if rows.is_empty() {
        println!("no rows with an empty comment context in {month}");
        return Ok(());
    }
    println!("{} rows with an empty comment context in {month}:", rows.len());
    for row in &rows {
        println!("  post {}", row.post_id);
        println!(
            "    positive: {:?} (context {:?})",
            row.most_positive_comment, row.original_positive_context
        );
        println!(
            "    negative: {:?} (context {:?})",
            row.most_negative_comment, row.original_negative_context
        );
    }
    Ok(())
}

/// Run every month. Per-month failures are reported but do not fail the
/// process.
pub(crate) async fn run(config: &PipelineConfig, generate_reports: bool) -> anyhow::Result<()> {
    let caps = capabilities::for_run(config, generate_reports)?;
    let outcome = run_pipeline(config, &caps, generate_reports).await?;

    println!(
        "partitioned {} comments ({} without a usable date)",
        outcome.partition.total, outcome.partition.dropped
    );
    for month in &outcome.succeeded {
        println!("[PASSED] {month}");
    }
    for (month, err) in &outcome.failed {
        failed("pipeline", *month, err);
    }
    println!(
        "{} months succeeded, {} failed",
        outcome.succeeded.len(),
        outcome.failed.len()
    );
    Ok(())
}
