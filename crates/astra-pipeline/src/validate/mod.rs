//! Stage validators.
//!
//! Each validator re-reads its artifact from disk and walks the state
//! machine `Pending → SchemaChecked → QualityChecked → Passed`. Any violation
//! moves it to `Failed` and surfaces as a [`StageError`] that halts the
//! current month.

mod mapping;
mod summary;
mod translation;

use std::fmt;

use astra_core::Month;

use crate::error::StageError;

pub use mapping::verify_mapping;
pub use summary::{verify_enrichment, verify_final_outputs, verify_summary};
pub use translation::{is_mostly_non_latin, verify_translation};

/// Progress of one validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    Pending,
    SchemaChecked,
    QualityChecked,
    Passed,
    Failed,
}

impl ValidationState {
    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub fn can_transition_to(self, next: ValidationState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::SchemaChecked)
                | (Self::SchemaChecked, Self::QualityChecked)
                | (Self::QualityChecked, Self::Passed)
                | (Self::Pending | Self::SchemaChecked | Self::QualityChecked, Self::Failed)
        )
    }
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::SchemaChecked => "schema-checked",
            Self::QualityChecked => "quality-checked",
            Self::Passed => "passed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Result of a validation that passed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub stage: &'static str,
    pub month: Month,
    pub state: ValidationState,
    /// Human-readable notes for the pass banner.
    pub findings: Vec<String>,
}

/// In-flight validation; consumed by [`Validation::pass`] or
/// [`Validation::fail`].
pub(crate) struct Validation {
    report: ValidationReport,
}

impl Validation {
    pub(crate) fn start(stage: &'static str, month: Month) -> Self {
        Self {
            report: ValidationReport {
                stage,
                month,
                state: ValidationState::Pending,
                findings: Vec::new(),
            },
        }
    }

    pub(crate) fn advance(&mut self, next: ValidationState) {
        debug_assert!(
            self.report.state.can_transition_to(next),
            "illegal validation transition {} -> {next}",
            self.report.state
        );
        self.report.state = next;
        tracing::debug!(stage = self.report.stage, month = %self.report.month, state = %next, "validation advanced");
    }

    pub(crate) fn note(&mut self, finding: impl Into<String>) {
        self.report.findings.push(finding.into());
    }

    pub(crate) fn fail(mut self, err: StageError) -> StageError {
        self.advance(ValidationState::Failed);
        tracing::error!(
            stage = self.report.stage,
            month = %self.report.month,
            error = %err,
            "validation failed"
        );
        err
    }

    pub(crate) fn pass(mut self) -> ValidationReport {
        self.advance(ValidationState::Passed);
        tracing::info!(stage = self.report.stage, month = %self.report.month, "validation passed");
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ValidationState::{Failed, Passed, Pending, QualityChecked, SchemaChecked};

    #[test]
    fn happy_path_transitions_are_legal() {
        assert!(Pending.can_transition_to(SchemaChecked));
        assert!(SchemaChecked.can_transition_to(QualityChecked));
        assert!(QualityChecked.can_transition_to(Passed));
    }

    #[test]
    fn any_open_state_may_fail() {
        for state in [Pending, SchemaChecked, QualityChecked] {
            assert!(state.can_transition_to(Failed), "{state} -> failed");
        }
    }

    #[test]
    fn terminal_states_and_skips_are_illegal() {
        assert!(!Pending.can_transition_to(Passed));
        assert!(!Pending.can_transition_to(QualityChecked));
        assert!(!Passed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Pending));
    }

    #[test]
    fn validation_pass_records_final_state() {
        let month: Month = "2024-01".parse().unwrap();
        let mut v = Validation::start("test", month);
        v.advance(SchemaChecked);
        v.advance(QualityChecked);
        v.note("ok");
        let report = v.pass();
        assert_eq!(report.state, Passed);
        assert_eq!(report.findings, vec!["ok".to_string()]);
    }
}
