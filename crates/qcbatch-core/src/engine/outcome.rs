use std::path::PathBuf;
use thiserror::Error;

use super::staging::StagingError;

/// Terminal classification of a single work unit's failure.
///
/// Variants carry plain data only, so reports can be cloned, compared, and
/// stored long after the run. A non-zero exit and a missing expected output
/// are distinct: quantum-chemistry tools routinely exit 0 without producing
/// the artifact the next step needs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("Staging failed: {message}")]
    Staging { message: String },

    #[error("Step {step} ('{command}') exited with status {code:?}; see {log}", log = .log_path.display())]
    CommandFailed {
        step: usize,
        command: String,
        code: Option<i32>,
        log_path: PathBuf,
    },

    #[error("Step {step} exited cleanly but expected output '{expected}' was not produced")]
    MissingOutput { step: usize, expected: String },

    #[error("Unexpected failure: {message}")]
    Unexpected { message: String },
}

impl From<StagingError> for UnitError {
    fn from(err: StagingError) -> Self {
        UnitError::Staging {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Success,
    Failed(UnitError),
}

impl UnitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UnitOutcome::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub name: String,
    pub dir: PathBuf,
    pub input_file: String,
    pub outcome: UnitOutcome,
}

/// Aggregate of one batch run, in input submission order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResult {
    pub units: Vec<UnitReport>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.units.len()
    }

    pub fn success_count(&self) -> usize {
        self.units
            .iter()
            .filter(|u| u.outcome.is_success())
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.total() - self.success_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|u| !u.outcome.is_success())
    }
}
