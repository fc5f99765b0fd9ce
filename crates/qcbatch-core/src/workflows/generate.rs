use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::core::generation::CoordinateGenerator;
use crate::core::generation::failure_log::FailureLog;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmilesEntry {
    pub smiles: String,
    pub name: String,
}

impl SmilesEntry {
    /// Assigns the conventional `molecule_<n>` names (1-based) to a list of
    /// SMILES strings, in file order.
    pub fn numbered<I, S>(smiles: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        smiles
            .into_iter()
            .enumerate()
            .map(|(i, s)| Self {
                smiles: s.into(),
                name: format!("molecule_{}", i + 1),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    pub name: String,
    pub smiles: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct GenerationSummary {
    pub written: Vec<PathBuf>,
    pub failures: Vec<GenerationFailure>,
}

impl GenerationSummary {
    pub fn total(&self) -> usize {
        self.written.len() + self.failures.len()
    }

    pub fn success_count(&self) -> usize {
        self.written.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Generates a 3-D structure file for every SMILES entry, sequentially.
///
/// Generation is I/O- and CPU-light compared to the calculations that follow,
/// and external generators are not always safe to run concurrently, so the
/// loop is deliberately serial. A molecule that fails is recorded in the
/// failure log and the summary; it never aborts the rest of the batch.
#[instrument(skip_all, name = "generate_workflow")]
pub fn run(
    entries: &[SmilesEntry],
    out_dir: &Path,
    generator: &dyn CoordinateGenerator,
    failure_log: &FailureLog,
    reporter: &ProgressReporter,
) -> Result<GenerationSummary, EngineError> {
    if entries.is_empty() {
        return Err(EngineError::EmptyBatch("no SMILES entries provided"));
    }

    reporter.report(Progress::PhaseStart { name: "Generation" });
    reporter.report(Progress::TaskStart {
        total: entries.len() as u64,
    });
    info!(molecules = entries.len(), out = %out_dir.display(), "Generating coordinates.");
    fs::create_dir_all(out_dir)?;

    let mut summary = GenerationSummary::default();
    for entry in entries {
        let generated = generator
            .generate(&entry.smiles, &entry.name)
            .and_then(|doc| {
                let path = out_dir.join(format!("{}.xyz", entry.name));
                doc.write_to_path(&path)?;
                Ok(path)
            });

        match generated {
            Ok(path) => {
                summary.written.push(path);
                reporter.report(Progress::UnitFinished {
                    name: entry.name.clone(),
                    success: true,
                });
            }
            Err(err) => {
                let message = err.to_string();
                warn!(molecule = %entry.name, error = %message, "Coordinate generation failed.");
                if let Err(log_err) = failure_log.record(&entry.smiles, &entry.name, &message) {
                    warn!(error = %log_err, "Could not append to the failure log.");
                }
                summary.failures.push(GenerationFailure {
                    name: entry.name.clone(),
                    smiles: entry.smiles.clone(),
                    message,
                });
                reporter.report(Progress::UnitFinished {
                    name: entry.name.clone(),
                    success: false,
                });
            }
        }
        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    info!(
        total = summary.total(),
        success = summary.success_count(),
        failed = summary.failure_count(),
        "Coordinate generation complete."
    );
    Ok(summary)
}
