//! On-disk artifact layout and CSV/JSON persistence.
//!
//! Every artifact is written to a sibling temporary file and renamed into
//! place, so a reader never observes a partially written file.

use std::fs;
use std::path::{Path, PathBuf};

use astra_core::{CsvRecord, Month, PipelineConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StageError;

/// Paths of every per-month artifact under the data directory.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.data_dir)
    }

    #[must_use]
    pub fn monthly_data_dir(&self) -> PathBuf {
        self.root.join("monthly_data")
    }

    #[must_use]
    pub fn partition(&self, month: Month) -> PathBuf {
        self.monthly_data_dir().join(format!("{month}.json"))
    }

    #[must_use]
    pub fn mapped(&self, month: Month) -> PathBuf {
        self.root
            .join("processed_data")
            .join(format!("processed_comments_{month}.csv"))
    }

    #[must_use]
    pub fn normalized(&self, month: Month) -> PathBuf {
        self.root
            .join("processed_data")
            .join(format!("analysis_ready_{month}.csv"))
    }

    #[must_use]
    pub fn enriched(&self, month: Month) -> PathBuf {
        self.root
            .join("enriched_data")
            .join(format!("enriched_data_{month}.csv"))
    }

    #[must_use]
    pub fn summary(&self, month: Month) -> PathBuf {
        self.root
            .join("monthly_reports")
            .join(format!("post_summary_{month}.csv"))
    }

    #[must_use]
    pub fn report(&self, month: Month) -> PathBuf {
        self.root
            .join("monthly_reports")
            .join(format!("report-{month}.md"))
    }
}

fn ensure_exists(path: &Path) -> Result<(), StageError> {
    if path.exists() {
        Ok(())
    } else {
        Err(StageError::MissingInput {
            path: path.to_path_buf(),
        })
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StageError + '_ {
    move |source| StageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_err(path: &Path) -> impl FnOnce(csv::Error) -> StageError + '_ {
    move |source| StageError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a JSON document.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the file is absent; `Io` or `Json` on
/// read or decode failure.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StageError> {
    ensure_exists(path)?;
    let content = fs::read_to_string(path).map_err(io_err(path))?;
    serde_json::from_str(&content).map_err(|source| StageError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a JSON document (pretty-printed) atomically.
///
/// # Errors
///
/// `Io` or `Json` on serialization or write failure.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StageError> {
    let body = serde_json::to_string_pretty(value).map_err(|source| StageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, body.as_bytes())
}

/// Read the header row of a CSV artifact. An empty file has no headers.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the file is absent; `Csv` on parse failure.
pub fn read_csv_headers(path: &Path) -> Result<Vec<String>, StageError> {
    ensure_exists(path)?;
    let mut reader = csv::Reader::from_path(path).map_err(csv_err(path))?;
    let headers = reader.headers().map_err(csv_err(path))?;
    Ok(headers.iter().map(ToString::to_string).collect())
}

/// Read every row of a CSV artifact as untyped records, with its headers.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the file is absent; `Csv` on parse failure.
pub fn read_csv_raw(path: &Path) -> Result<(Vec<String>, Vec<csv::StringRecord>), StageError> {
    ensure_exists(path)?;
    let mut reader = csv::Reader::from_path(path).map_err(csv_err(path))?;
    let headers = reader
        .headers()
        .map_err(csv_err(path))?
        .iter()
        .map(ToString::to_string)
        .collect();
    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err(path))?;
    Ok((headers, rows))
}

/// Read every row of a CSV artifact into typed records.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the file is absent; `Csv` if a row does
/// not match the record type.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StageError> {
    ensure_exists(path)?;
    let mut reader = csv::Reader::from_path(path).map_err(csv_err(path))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(csv_err(path))
}

/// Write typed rows as a CSV artifact, header first, atomically.
///
/// The header is written even when `rows` is empty.
///
/// # Errors
///
/// `Csv` or `Io` on serialization or write failure.
pub fn write_csv<T: CsvRecord + Serialize>(path: &Path, rows: &[T]) -> Result<(), StageError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(T::COLUMNS).map_err(csv_err(path))?;
    for row in rows {
        writer.serialize(row).map_err(csv_err(path))?;
    }
    let bytes = writer.into_inner().map_err(|e| StageError::Io {
        path: path.to_path_buf(),
        source: e.into_error(),
    })?;
    write_atomic(path, &bytes)
}

/// Write untyped rows under `headers`, atomically.
///
/// # Errors
///
/// `Csv` or `Io` on serialization or write failure.
pub fn write_csv_raw(
    path: &Path,
    headers: &[String],
    rows: &[csv::StringRecord],
) -> Result<(), StageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers).map_err(csv_err(path))?;
    for row in rows {
        writer.write_record(row).map_err(csv_err(path))?;
    }
    let bytes = writer.into_inner().map_err(|e| StageError::Io {
        path: path.to_path_buf(),
        source: e.into_error(),
    })?;
    write_atomic(path, &bytes)
}

/// Write bytes to `path` via a temporary sibling and rename.
///
/// # Errors
///
/// `Io` if the parent directory cannot be created or the write fails.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).map_err(io_err(&tmp))?;
    fs::rename(&tmp, path).map_err(io_err(path))
}

/// Columns from `required` that are absent in `headers`, in `required` order.
#[must_use]
pub fn missing_columns(headers: &[String], required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use astra_core::MappedComment;

    use super::*;

    fn sample_row() -> MappedComment {
        MappedComment {
            post_id: "p1".to_string(),
            post_caption: "Caption, with comma".to_string(),
            content_type: "Photo".to_string(),
            total_likes: 10,
            num_shares: 2,
            comment_text: "line one\nline two".to_string(),
            comment_likes: 1,
        }
    }

    #[test]
    fn layout_paths_follow_month_naming() {
        let layout = ArtifactLayout::new("/data");
        let month: Month = "2024-05".parse().unwrap();
        assert_eq!(layout.partition(month), Path::new("/data/monthly_data/2024-05.json"));
        assert_eq!(
            layout.mapped(month),
            Path::new("/data/processed_data/processed_comments_2024-05.csv")
        );
        assert_eq!(
            layout.normalized(month),
            Path::new("/data/processed_data/analysis_ready_2024-05.csv")
        );
        assert_eq!(
            layout.enriched(month),
            Path::new("/data/enriched_data/enriched_data_2024-05.csv")
        );
        assert_eq!(
            layout.summary(month),
            Path::new("/data/monthly_reports/post_summary_2024-05.csv")
        );
        assert_eq!(layout.report(month), Path::new("/data/monthly_reports/report-2024-05.md"));
    }

    #[test]
    fn write_then_read_preserves_quoted_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rows.csv");
        write_csv(&path, &[sample_row()]).unwrap();

        let rows: Vec<MappedComment> = read_csv(&path).unwrap();
        assert_eq!(rows, vec![sample_row()]);
        assert!(!dir.path().join("nested").join("rows.csv.tmp").exists());
    }

    #[test]
    fn empty_rows_still_write_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv::<MappedComment>(&path, &[]).unwrap();

        let headers = read_csv_headers(&path).unwrap();
        assert_eq!(headers, MappedComment::COLUMNS);
        let rows: Vec<MappedComment> = read_csv(&path).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn missing_file_is_missing_input() {
        let err = read_csv::<MappedComment>(Path::new("/nonexistent/x.csv")).unwrap_err();
        assert!(matches!(err, StageError::MissingInput { .. }));
    }

    #[test]
    fn zero_byte_file_reads_as_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.csv");
        fs::write(&path, b"").unwrap();
        assert!(read_csv_headers(&path).unwrap().is_empty());
        assert!(read_csv::<MappedComment>(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_columns_lists_absent_in_order() {
        let headers = vec!["post_id".to_string(), "topic".to_string()];
        assert_eq!(
            missing_columns(&headers, &["post_id", "sentiment_score", "topic", "x"]),
            vec!["sentiment_score".to_string(), "x".to_string()]
        );
    }
}
