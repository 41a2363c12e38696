//! Split the bulk comment export into one JSON file per calendar month.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use astra_core::Month;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

use crate::artifacts::{read_json, write_json, ArtifactLayout};
use crate::error::StageError;

static MONTH_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2})\.json$").expect("valid regex"));

/// Outcome of a partition run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSummary {
    pub total: usize,
    /// Records per written month, ascending.
    pub months: Vec<(Month, usize)>,
    /// Records with a missing or unparseable date.
    pub dropped: usize,
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Calendar month of an ISO-style timestamp.
///
/// Seconds, fractions and the offset are optional; a trailing `Z` means
/// UTC and offsets may be written with or without a colon.
/// Offset-qualified timestamps use the date in their own offset.
#[must_use]
pub fn month_of(date: &str) -> Option<Month> {
    let date = date.trim();
    let zulu = date
        .strip_suffix(['Z', 'z'])
        .map(|rest| format!("{rest}+00:00"));
    let date = zulu.as_deref().unwrap_or(date);

    let day = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(date, fmt).ok())
        .map(|dt| dt.date_naive())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(date, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())?;
    Month::new(day.year(), day.month()).ok()
}

/// Group records by the month of their `date` field, preserving input order
/// within each month. Returns the groups and the number of dropped records.
#[must_use]
pub fn partition_records(records: Vec<Value>) -> (BTreeMap<Month, Vec<Value>>, usize) {
    let mut groups: BTreeMap<Month, Vec<Value>> = BTreeMap::new();
    let mut dropped = 0usize;
    for record in records {
        match record.get("date").and_then(Value::as_str).and_then(month_of) {
            Some(month) => groups.entry(month).or_default().push(record),
            None => dropped += 1,
        }
    }
    (groups, dropped)
}

/// Read the bulk export at `comments_path` and write one partition per month.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the export is absent; `Json` if it is not
/// a JSON array; `Io` if a partition cannot be written.
pub fn run_partition(
    comments_path: &Path,
    layout: &ArtifactLayout,
) -> Result<PartitionSummary, StageError> {
    let records: Vec<Value> = read_json(comments_path)?;
    let total = records.len();
    let (groups, dropped) = partition_records(records);

    if dropped > 0 {
        tracing::warn!(dropped, "records with missing or unparseable dates skipped");
    }

    let mut months = Vec::with_capacity(groups.len());
    for (month, items) in groups {
        write_json(&layout.partition(month), &items)?;
        tracing::info!(month = %month, rows = items.len(), "partition written");
        months.push((month, items.len()));
    }

    Ok(PartitionSummary {
        total,
        months,
        dropped,
    })
}

/// Months with a partition file under `monthly_data/`, ascending.
///
/// # Errors
///
/// [`StageError::MissingInput`] if the directory does not exist; `Io` if it
/// cannot be listed.
pub fn discover_months(layout: &ArtifactLayout) -> Result<Vec<Month>, StageError> {
    let dir = layout.monthly_data_dir();
    if !dir.is_dir() {
        return Err(StageError::MissingInput { path: dir });
    }
    let entries = fs::read_dir(&dir).map_err(|source| StageError::Io {
        path: dir.clone(),
        source,
    })?;

    let mut months = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StageError::Io {
            path: dir.clone(),
            source,
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(month) = MONTH_FILE_RE
            .captures(name)
            .and_then(|caps| caps[1].parse::<Month>().ok())
        {
            months.push(month);
        }
    }
    months.sort_unstable();
    Ok(months)
}
