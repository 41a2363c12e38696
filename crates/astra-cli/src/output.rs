//! Pass/fail banners for stage and validation results.

use astra_core::Month;
use astra_pipeline::{StageError, ValidationReport};

pub(crate) fn passed(report: &ValidationReport) {
    println!("[PASSED] {} check for {}", report.stage, report.month);
    for finding in &report.findings {
        println!("  {finding}");
    }
}

pub(crate) fn failed(stage: &str, month: Month, err: &StageError) {
    println!("[FAILED] {stage} for {month}: {err}");
    for line in err.diagnostics() {
        println!("  {line}");
    }
}

/// Print the failure banner and turn the error into the process error.
pub(crate) fn check<T>(stage: &str, month: Month, result: Result<T, StageError>) -> anyhow::Result<T> {
    result.map_err(|e| {
        failed(stage, month, &e);
        anyhow::anyhow!("{stage} failed for {month}")
    })
}
