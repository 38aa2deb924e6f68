//! Commit-safety verdicts.
//!
//! Reports end with one of a few fixed sentences. Callers (usually an agent
//! about to run `git commit`) pattern-match on `DO NOT COMMIT` and
//! `Safe to commit`.

use serde::Serialize;

use crate::stage::StageOutcome;

pub const SAFE_TO_COMMIT: &str = "All validations passed. Safe to commit.";
pub const DO_NOT_COMMIT: &str = "DO NOT COMMIT - Fix errors first!";
pub const DO_NOT_COMMIT_SCHEMA: &str = "DO NOT COMMIT - Fix schema errors first!";
pub const YAML_VALID: &str = "All YAML files are syntactically valid.";
pub const DO_NOT_COMMIT_YAML: &str = "DO NOT COMMIT - Fix YAML syntax errors first!";

/// Passed/failed tally for a report.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    /// Tally stage outcomes; anything but `Passed` counts as failed.
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a StageOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            summary.record(outcome.is_passed());
        }
        summary
    }

    pub fn record(&mut self, passed: bool) {
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn safe_to_commit(&self) -> bool {
        self.failed == 0
    }

    /// The closing sentence for dry-run reports.
    pub fn verdict(&self) -> &'static str {
        if self.safe_to_commit() {
            SAFE_TO_COMMIT
        } else {
            DO_NOT_COMMIT
        }
    }
}
