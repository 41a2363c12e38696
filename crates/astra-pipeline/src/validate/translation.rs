use astra_core::Month;

use super::{Validation, ValidationReport, ValidationState};
use crate::artifacts::{missing_columns, read_csv_raw, ArtifactLayout};
use crate::error::StageError;
use crate::normalize::ERROR_LANGUAGE;

const REQUIRED_COLUMNS: &[&str] = &[
    "post_id",
    "content_type",
    "text_for_analysis",
    "original_language",
];

const MAX_EXAMPLES: usize = 5;

/// Whether more than `ratio` of the letters in `text` are non-ASCII.
///
/// Whitespace, digits and ASCII punctuation are ignored. Text with nothing
/// left to measure is never suspect.
#[must_use]
pub fn is_mostly_non_latin(text: &str, ratio: f64) -> bool {
    let mut measured = 0usize;
    let mut non_ascii = 0usize;
    for c in text.chars() {
        if c.is_whitespace() || c.is_numeric() || c.is_ascii_punctuation() {
            continue;
        }
        measured += 1;
        if !c.is_ascii() {
            non_ascii += 1;
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let share = if measured == 0 {
        0.0
    } else {
        non_ascii as f64 / measured as f64
    };
    share > ratio
}

fn is_translated_language(language: &str) -> bool {
    !matches!(language.trim(), "" | "en" | ERROR_LANGUAGE)
}

/// Verify translation quality of the analysis-ready artifact for `month`.
///
/// A row is suspect when the translator reported a source language other
/// than English yet its analysis text is still mostly non-Latin. The month
/// fails when the suspect share exceeds `threshold_pct`; exactly the
/// threshold passes.
///
/// # Errors
///
/// - [`StageError::SchemaViolation`] if required columns are missing.
/// - [`StageError::TranslationQuality`] if the suspect share is too high.
/// - `MissingInput`/`Csv` if the artifact cannot be read.
pub fn verify_translation(
    layout: &ArtifactLayout,
    month: Month,
    non_latin_ratio: f64,
    threshold_pct: f64,
) -> Result<ValidationReport, StageError> {
    let mut v = Validation::start("translation", month);
    let path = layout.normalized(month);

    let (headers, rows) = match read_csv_raw(&path) {
        Ok(read) => read,
        Err(e) => return Err(v.fail(e)),
    };
    let missing = missing_columns(&headers, REQUIRED_COLUMNS);
    if !missing.is_empty() {
        return Err(v.fail(StageError::SchemaViolation { path, missing }));
    }
    v.advance(ValidationState::SchemaChecked);

    if rows.is_empty() {
        v.advance(ValidationState::QualityChecked);
        v.note("artifact is empty; quality check skipped");
        return Ok(v.pass());
    }

    let col = |name: &str| headers.iter().position(|h| h == name);
    let lang_idx = col("original_language");
    let text_idx = col("text_for_analysis");
    let orig_idx = col("original_comment_for_context");
    let cell = |record: &csv::StringRecord, idx: Option<usize>| {
        idx.and_then(|i| record.get(i)).unwrap_or_default().to_string()
    };

    let suspects: Vec<&csv::StringRecord> = rows
        .iter()
        .filter(|r| {
            is_translated_language(&cell(r, lang_idx))
                && is_mostly_non_latin(&cell(r, text_idx), non_latin_ratio)
        })
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let rate = suspects.len() as f64 * 100.0 / rows.len() as f64;
    if rate > threshold_pct {
        let examples = suspects
            .iter()
            .take(MAX_EXAMPLES)
            .map(|r| (cell(r, lang_idx), cell(r, orig_idx), cell(r, text_idx)))
            .collect();
        return Err(v.fail(StageError::TranslationQuality {
            suspect: suspects.len(),
            total: rows.len(),
            rate,
            threshold: threshold_pct,
            examples,
        }));
    }
    v.advance(ValidationState::QualityChecked);

    v.note(format!(
        "{} of {} rows suspect ({rate:.2}%, threshold {threshold_pct:.2}%)",
        suspects.len(),
        rows.len()
    ));
    Ok(v.pass())
}

#[cfg(test)]
mod tests {
    use astra_core::NormalizedComment;

    use super::*;
    use crate::artifacts::write_csv;

    fn row(language: &str, text: &str) -> NormalizedComment {
        NormalizedComment {
            post_id: "p1".to_string(),
            post_caption: "cap".to_string(),
            content_type: "Photo".to_string(),
            total_likes: 0,
            num_shares: 0,
            comment_likes: 0,
            original_comment_for_context: text.to_string(),
            original_language: language.to_string(),
            text_for_analysis: text.to_string(),
        }
    }

    /// `suspect` untranslated Kannada rows followed by English rows.
    fn rows(total: usize, suspect: usize) -> Vec<NormalizedComment> {
        (0..total)
            .map(|i| {
                if i < suspect {
                    row("kn", "ಧನ್ಯವಾದಗಳು ಸರ್")
                } else {
                    row("kn", "thank you sir")
                }
            })
            .collect()
    }

    fn verify(rows: &[NormalizedComment]) -> Result<ValidationReport, StageError> {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        let month: Month = "2024-06".parse().unwrap();
        write_csv(&layout.normalized(month), rows).unwrap();
        verify_translation(&layout, month, 0.5, 2.0)
    }

    #[test]
    fn non_latin_share_ignores_digits_space_and_punctuation() {
        assert!(is_mostly_non_latin("ಧನ್ಯವಾದ 123 !!!", 0.5));
        assert!(!is_mostly_non_latin("hello ಸರ್", 0.5));
        assert!(!is_mostly_non_latin("2024 ... !!", 0.5));
        assert!(!is_mostly_non_latin("", 0.5));
    }

    #[test]
    fn exactly_threshold_passes() {
        let report = verify(&rows(100, 2)).unwrap();
        assert_eq!(report.state, ValidationState::Passed);
    }

    #[test]
    fn just_over_threshold_fails() {
        let err = verify(&rows(10_000, 201)).unwrap_err();
        match err {
            StageError::TranslationQuality {
                suspect,
                total,
                examples,
                ..
            } => {
                assert_eq!(suspect, 201);
                assert_eq!(total, 10_000);
                assert_eq!(examples.len(), MAX_EXAMPLES);
                assert_eq!(examples[0].0, "kn");
            }
            other => panic!("expected TranslationQuality, got {other:?}"),
        }
    }

    #[test]
    fn english_empty_and_error_languages_are_never_suspect() {
        let rows = vec![
            row("en", "ಧನ್ಯವಾದಗಳು"),
            row("", "ಧನ್ಯವಾದಗಳು"),
            row(ERROR_LANGUAGE, "ಧನ್ಯವಾದಗಳು"),
        ];
        assert!(verify(&rows).is_ok());
    }

    #[test]
    fn empty_artifact_passes() {
        assert!(verify(&[]).is_ok());
    }

    #[test]
    fn missing_columns_fail_schema() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        let month: Month = "2024-06".parse().unwrap();
        let path = layout.normalized(month);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "post_id,text_for_analysis\np1,hi\n").unwrap();

        match verify_translation(&layout, month, 0.5, 2.0).unwrap_err() {
            StageError::SchemaViolation { missing, .. } => {
                assert_eq!(missing, vec!["content_type", "original_language"]);
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }
}
