//! Narrative monthly report built from the post summaries.

use std::fs;
use std::path::PathBuf;

use astra_core::{AccountProfile, Month, PostSummary};
use chrono::NaiveDate;

use crate::artifacts::{read_csv, write_atomic, ArtifactLayout};
use crate::capability::ReportWriter;
use crate::error::StageError;
use crate::red_flags::find_red_flags;

const NO_PREVIOUS_DATA: &str = "No data available for the previous month.";

/// What [`run_report`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// A report for the month already existed.
    Skipped(PathBuf),
    Written(PathBuf),
}

/// Inputs to the report prompt.
#[derive(Debug)]
pub struct ReportContext<'a> {
    pub account_name: &'a str,
    pub month: Month,
    pub current_csv: &'a str,
    pub previous_csv: Option<&'a str>,
    pub red_flags: &'a [&'a PostSummary],
}

/// `"March 2024"` style label for a month.
#[must_use]
pub fn month_label(month: Month) -> String {
    NaiveDate::from_ymd_opt(month.year(), month.month(), 1)
        .map_or_else(|| month.to_string(), |d| d.format("%B %Y").to_string())
}

#[must_use]
pub fn build_report_prompt(ctx: &ReportContext<'_>) -> String {
    let period = month_label(ctx.month);
    let previous = month_label(ctx.month.previous());
    let red_flags = red_flag_section(ctx.red_flags);
    let current = ctx.current_csv.trim_end();
    let prior = ctx.previous_csv.map_or(NO_PREVIOUS_DATA, str::trim_end);

    format!(
        "You are a social media intelligence analyst preparing a monthly strategic \
         report for {name}. Be direct and evidence-driven. Every key finding must cite \
         post_id values and figures such as avg_sentiment_score or \
         negative_comment_ratio from the data below.\n\
         \n\
         Structure the report as follows:\n\
         # Intelligence Report: {period}\n\
         ## 1. Executive Summary and KPIs: compare average sentiment and engagement \
         rate against {previous} and state whether each is up, down or flat.\n\
         ## 2. Sentiment by Topic: positive strongholds and negative vulnerabilities.\n\
         ## 3. Threats and Emerging Narratives: say whether each is new this month.\n\
         ## 4. Recommendations: what to amplify, what to mitigate, and new opportunities.\n\
         \n\
         {red_flags}\
         \n\
         Current month data ({period}):\n\
         ```csv\n{current}\n```\n\
         \n\
         Previous month data ({previous}):\n\
         ```csv\n{prior}\n```\n",
        name = ctx.account_name
    )
}

fn red_flag_section(red_flags: &[&PostSummary]) -> String {
    if red_flags.is_empty() {
        return "No posts crossed the red-flag thresholds this month.\n".to_string();
    }
    let lines: String = red_flags
        .iter()
        .map(|post| {
            format!(
                "- post {} on {}: {:.1}% negative across {} comments\n",
                post.post_id,
                post.main_topic,
                post.negative_comment_ratio * 100.0,
                post.comment_count
            )
        })
        .collect();
    format!("Red-flag posts (address each in section 3):\n{lines}")
}

fn read_text(path: &std::path::Path) -> Result<String, StageError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            StageError::MissingInput {
                path: path.to_path_buf(),
            }
        } else {
            StageError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Generate `report-<month>.md` unless it already exists.
///
/// The previous month's summary is included for comparison when present.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the month's summary is absent;
/// [`StageError::Capability`] if the writer fails; `Csv`/`Io` otherwise.
pub async fn run_report(
    layout: &ArtifactLayout,
    month: Month,
    account: &AccountProfile,
    writer: &dyn ReportWriter,
) -> Result<ReportOutcome, StageError> {
    let output = layout.report(month);
    if output.exists() {
        tracing::info!(month = %month, path = %output.display(), "report already exists, skipping");
        return Ok(ReportOutcome::Skipped(output));
    }

    let current_path = layout.summary(month);
    let current_csv = read_text(&current_path)?;
    let summaries: Vec<PostSummary> = read_csv(&current_path)?;

    let previous_path = layout.summary(month.previous());
    let previous_csv = if previous_path.exists() {
        Some(read_text(&previous_path)?)
    } else {
        tracing::info!(month = %month, "no previous summary; report will not be comparative");
        None
    };

    let red_flags = find_red_flags(&summaries, &account.red_flags);
    let prompt = build_report_prompt(&ReportContext {
        account_name: &account.name,
        month,
        current_csv: &current_csv,
        previous_csv: previous_csv.as_deref(),
        red_flags: &red_flags,
    });

    let text = writer.write_report(&prompt).await?;
    write_atomic(&output, text.as_bytes())?;
    tracing::info!(month = %month, path = %output.display(), "report written");
    Ok(ReportOutcome::Written(output))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::artifacts::write_csv;
    use crate::error::CapabilityError;

    #[derive(Default)]
    struct RecordingWriter {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReportWriter for RecordingWriter {
        async fn write_report(&self, prompt: &str) -> Result<String, CapabilityError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("# Report\n".to_string())
        }
    }

    fn summary(post_id: &str, ratio: f64, comments: usize) -> PostSummary {
        PostSummary {
            post_id: post_id.to_string(),
            post_caption: "cap".to_string(),
            content_type: "Photo".to_string(),
            total_likes: 10,
            num_shares: 1,
            comment_count: comments,
            avg_sentiment_score: -0.2,
            sentiment_variance: 0.5,
            negative_comment_ratio: ratio,
            main_topic: "Healthcare".to_string(),
            most_positive_comment: "good".to_string(),
            original_positive_context: "good".to_string(),
            most_negative_comment: "bad".to_string(),
            original_negative_context: "bad".to_string(),
            weighted_engagement_rate: 0.0001,
        }
    }

    #[test]
    fn month_label_uses_full_month_name() {
        assert_eq!(month_label("2024-03".parse().unwrap()), "March 2024");
    }

    #[test]
    fn prompt_includes_both_periods_and_red_flags() {
        let flagged = summary("p9", 0.75, 8);
        let ctx = ReportContext {
            account_name: "Tracked Account",
            month: "2024-01".parse().unwrap(),
            current_csv: "post_id\np9\n",
            previous_csv: None,
            red_flags: &[&flagged],
        };
        let prompt = build_report_prompt(&ctx);
        assert!(prompt.contains("January 2024"));
        assert!(prompt.contains("December 2023"));
        assert!(prompt.contains("Tracked Account"));
        assert!(prompt.contains("post p9 on Healthcare: 75.0% negative across 8 comments"));
        assert!(prompt.contains(NO_PREVIOUS_DATA));
    }

    #[test]
    fn prompt_sections_are_line_separated() {
        let ctx = ReportContext {
            account_name: "Tracked Account",
            month: "2024-05".parse().unwrap(),
            current_csv: "post_id\np1\n",
            previous_csv: Some("post_id\np0\n"),
            red_flags: &[],
        };
        let prompt = build_report_prompt(&ctx);
        assert!(prompt.contains(
            "against April 2024 and state whether each is up, down or flat.\n## 2."
        ));
        assert!(prompt.contains(
            "new opportunities.\n\nNo posts crossed the red-flag thresholds this month.\n\n\
             Current month data (May 2024):\n```csv\npost_id\np1\n```\n"
        ));
        assert!(prompt.ends_with("Previous month data (April 2024):\n```csv\npost_id\np0\n```\n"));
        assert!(!prompt.contains(NO_PREVIOUS_DATA));
    }

    #[tokio::test]
    async fn report_is_written_once_then_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        let month: Month = "2024-02".parse().unwrap();
        write_csv(&layout.summary(month), &[summary("p1", 0.5, 5)]).unwrap();
        write_csv(&layout.summary(month.previous()), &[summary("p0", 0.1, 2)]).unwrap();
        let writer = RecordingWriter::default();
        let account = AccountProfile::default();

        let first = run_report(&layout, month, &account, &writer).await.unwrap();
        assert_eq!(first, ReportOutcome::Written(layout.report(month)));
        assert_eq!(fs::read_to_string(layout.report(month)).unwrap(), "# Report\n");

        let second = run_report(&layout, month, &account, &writer).await.unwrap();
        assert_eq!(second, ReportOutcome::Skipped(layout.report(month)));

        let prompts = writer.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("p0"), "previous month CSV embedded");
        assert!(prompts[0].contains("post p1"), "red flag listed");
    }

    #[tokio::test]
    async fn missing_current_summary_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        let err = run_report(
            &layout,
            "2024-02".parse().unwrap(),
            &AccountProfile::default(),
            &RecordingWriter::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StageError::MissingInput { .. }));
    }
}
