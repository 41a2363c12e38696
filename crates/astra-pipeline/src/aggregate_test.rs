use std::fs;

use super::*;

fn comment(post_id: &str, text: &str, score: Option<f64>, topic: Option<&str>) -> EnrichedComment {
    EnrichedComment {
        post_id: post_id.to_string(),
        post_caption: "Caption".to_string(),
        content_type: "Photo".to_string(),
        total_likes: 100,
        num_shares: 5,
        comment_likes: 0,
        original_comment_for_context: format!("orig {text}"),
        original_language: "en".to_string(),
        text_for_analysis: text.to_string(),
        sentiment_score: score,
        topic: topic.map(str::to_string),
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn most_negative_takes_first_of_tied_minimum() {
    let rows = vec![
        comment("p1", "c0", Some(0.5), None),
        comment("p1", "c1", Some(-0.8), None),
        comment("p1", "c2", Some(-0.8), None),
        comment("p1", "c3", Some(0.2), None),
    ];
    let summary = &summarize_posts(&rows, 88_000)[0];
    assert_eq!(summary.most_negative_comment, "c1");
    assert_eq!(summary.original_negative_context, "orig c1");
    assert_eq!(summary.most_positive_comment, "c0");
    assert_eq!(summary.original_positive_context, "orig c0");
}

#[test]
fn single_scored_row_has_no_distinct_negative() {
    let rows = vec![comment("p1", "only", Some(-1.0), None)];
    let summary = &summarize_posts(&rows, 88_000)[0];
    assert_eq!(summary.most_positive_comment, "only");
    assert_eq!(summary.most_negative_comment, NO_DISTINCT_NEGATIVE);
    assert_eq!(summary.original_negative_context, NOT_AVAILABLE);
}

#[test]
fn unscored_post_uses_placeholders() {
    let rows = vec![comment("p1", "", None, None)];
    let summary = &summarize_posts(&rows, 88_000)[0];
    assert_eq!(summary.most_positive_comment, NO_ANALYZABLE_TEXT);
    assert_eq!(summary.original_positive_context, NOT_AVAILABLE);
    assert_eq!(summary.most_negative_comment, NO_DISTINCT_NEGATIVE);
    assert_eq!(summary.main_topic, NOT_AVAILABLE);
    assert!(approx(summary.avg_sentiment_score, 0.0));
    assert!(approx(summary.sentiment_variance, 0.0));
    assert!(approx(summary.negative_comment_ratio, 0.0));
}

#[test]
fn weighted_engagement_rate_uses_follower_count() {
    let rows: Vec<EnrichedComment> = (0..20)
        .map(|i| comment("p1", &format!("c{i}"), Some(0.0), None))
        .collect();
    let summary = &summarize_posts(&rows, 88_000)[0];
    assert_eq!(summary.comment_count, 20);
    // (100 likes + 20 comments + 2 * 5 shares) / 88000
    assert!(approx(summary.weighted_engagement_rate, 130.0 / 88_000.0));
    assert!((summary.weighted_engagement_rate - 0.001_477_27).abs() < 1e-8);
}

#[test]
fn negative_ratio_and_stats_over_scored_rows() {
    let mut rows = Vec::new();
    for i in 0..4 {
        rows.push(comment("p1", &format!("n{i}"), Some(-1.0), None));
    }
    for i in 0..3 {
        rows.push(comment("p1", &format!("z{i}"), Some(0.0), None));
    }
    for i in 0..3 {
        rows.push(comment("p1", &format!("p{i}"), Some(1.0), None));
    }
    rows.push(comment("p1", "", None, None));

    let summary = &summarize_posts(&rows, 88_000)[0];
    assert!(approx(summary.negative_comment_ratio, 0.4));
    assert!(approx(summary.avg_sentiment_score, -0.1));
    // Sample variance: sum of squared deviations 6.9 over n - 1 = 9.
    assert!(approx(summary.sentiment_variance, 6.9 / 9.0));
    // The unscored row has original context text, so it still counts.
    assert_eq!(summary.comment_count, 11);
}

#[test]
fn comment_count_ignores_rows_without_context() {
    let mut blank = comment("p1", "x", Some(1.0), None);
    blank.original_comment_for_context = "   ".to_string();
    let rows = vec![blank, comment("p1", "y", Some(1.0), None)];
    assert_eq!(summarize_posts(&rows, 88_000)[0].comment_count, 1);
}

#[test]
fn main_topic_is_mode_with_first_seen_tie_break() {
    let rows = vec![
        comment("p1", "a", Some(0.0), Some("A")),
        comment("p1", "b", Some(0.0), Some("B")),
        comment("p1", "c", Some(0.0), Some("A")),
        comment("p1", "d", Some(0.0), Some("B")),
    ];
    assert_eq!(summarize_posts(&rows, 88_000)[0].main_topic, "A");

    let rows = vec![
        comment("p1", "a", Some(0.0), Some("Zeta")),
        comment("p1", "b", Some(0.0), Some("Alpha")),
        comment("p1", "c", Some(0.0), None),
        comment("p1", "d", Some(0.0), Some("Alpha")),
    ];
    assert_eq!(summarize_posts(&rows, 88_000)[0].main_topic, "Alpha");
}

#[test]
fn post_fields_come_from_first_row_and_output_is_sorted() {
    let mut later = comment("p1", "x", Some(0.0), None);
    later.post_caption = "Different".to_string();
    later.total_likes = 1;
    let rows = vec![
        comment("p2", "a", Some(0.0), None),
        comment("p1", "b", Some(0.0), None),
        later,
    ];
    let summaries = summarize_posts(&rows, 88_000);
    let ids: Vec<&str> = summaries.iter().map(|s| s.post_id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2"]);
    assert_eq!(summaries[0].post_caption, "Caption");
    assert_eq!(summaries[0].total_likes, 100);
}

#[test]
fn finalize_replaces_empty_text_with_placeholder() {
    let mut row = comment("p1", "", Some(1.0), None);
    row.post_caption = String::new();
    row.original_comment_for_context = "nan".to_string();
    let summaries = finalize_summaries(summarize_posts(&[row], 88_000)).unwrap();
    let summary = &summaries[0];
    assert_eq!(summary.post_caption, NOT_AVAILABLE);
    assert_eq!(summary.most_positive_comment, NOT_AVAILABLE);
    assert_eq!(summary.original_positive_context, NOT_AVAILABLE);
    assert!(missing_text_columns(summary).is_empty());
}

#[test]
fn rerun_on_unchanged_input_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::new(dir.path());
    let month: Month = "2024-03".parse().unwrap();
    let rows = vec![
        comment("p2", "great, \"quoted\"", Some(1.0), Some("Praise")),
        comment("p1", "bad\nnews", Some(-1.0), Some("Criticism")),
        comment("p1", "meh", Some(0.0), None),
        comment("p3", "", None, None),
    ];
    write_csv(&layout.enriched(month), &rows).unwrap();

    assert_eq!(run_aggregation(&layout, month, 88_000).unwrap(), 3);
    let first = fs::read(layout.summary(month)).unwrap();
    run_aggregation(&layout, month, 88_000).unwrap();
    let second = fs::read(layout.summary(month)).unwrap();
    assert_eq!(first, second);

    let written: Vec<PostSummary> = read_csv(&layout.summary(month)).unwrap();
    assert!(written.iter().all(|s| missing_text_columns(s).is_empty()));
}

#[test]
fn empty_enriched_input_writes_header_only_summary() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::new(dir.path());
    let month: Month = "2024-03".parse().unwrap();
    write_csv::<EnrichedComment>(&layout.enriched(month), &[]).unwrap();

    assert_eq!(run_aggregation(&layout, month, 88_000).unwrap(), 0);
    let headers = crate::artifacts::read_csv_headers(&layout.summary(month)).unwrap();
    assert_eq!(headers.len(), 15);
    assert_eq!(headers[0], "post_id");
}

#[test]
fn missing_enriched_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::new(dir.path());
    let month: Month = "2024-03".parse().unwrap();
    assert!(matches!(
        run_aggregation(&layout, month, 88_000),
        Err(StageError::MissingInput { .. })
    ));
    assert!(!layout.summary(month).exists());
}
