use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::engine::config::CalculationConfig;
use crate::engine::error::EngineError;
use crate::engine::outcome::{BatchResult, UnitError, UnitOutcome, UnitReport};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scheduler;
use crate::engine::sequencer;
use crate::engine::staging::{self, WorkUnit};

/// Runs the configured command chain for every input structure in parallel.
///
/// Results come back in input order, one report per input. Staging failures
/// (missing file, unwritable directory, a duplicate unit name) are recorded
/// in the corresponding position and never abort the batch; only an empty
/// input set, an unusable output root, or worker-pool construction failure
/// do.
#[instrument(skip_all, name = "calculate_batch")]
pub fn run_batch(
    inputs: &[PathBuf],
    output_root: &Path,
    config: &CalculationConfig,
    reporter: &ProgressReporter,
) -> Result<BatchResult, EngineError> {
    if inputs.is_empty() {
        return Err(EngineError::EmptyBatch("no input structures provided"));
    }

    // === Phase 1: Staging ===
    reporter.report(Progress::PhaseStart { name: "Staging" });
    info!(
        inputs = inputs.len(),
        output = %output_root.display(),
        "Staging work units."
    );
    fs::create_dir_all(output_root)?;

    let mut claimed_names = HashSet::new();
    let staged: Vec<Result<WorkUnit, UnitReport>> = inputs
        .iter()
        .map(|input| stage_input(input, output_root, &mut claimed_names))
        .collect();

    for failed in staged.iter().filter_map(|s| s.as_ref().err()) {
        warn!(unit = %failed.name, outcome = ?failed.outcome, "Unit excluded during staging.");
    }
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Execution ===
    reporter.report(Progress::PhaseStart {
        name: "Calculation",
    });
    let ready: Vec<WorkUnit> = staged.iter().filter_map(|s| s.as_ref().ok()).cloned().collect();
    let executed = scheduler::run_units(&ready, config, reporter)?;
    reporter.report(Progress::PhaseFinish);

    // Stitch executed reports back into input positions.
    let mut executed = executed.into_iter();
    let units = staged
        .into_iter()
        .map(|s| match s {
            Ok(_) => executed.next().ok_or_else(|| {
                EngineError::WorkerPool("scheduler returned fewer reports than units".to_string())
            }),
            Err(report) => Ok(report),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let result = BatchResult { units };
    info!(
        total = result.total(),
        success = result.success_count(),
        failed = result.failure_count(),
        "Batch calculation complete."
    );
    Ok(result)
}

/// Degenerate one-unit case with the same staging and isolation guarantees,
/// executed on the calling thread without a pool.
#[instrument(skip_all, name = "calculate_single")]
pub fn run_single(
    input: &Path,
    output_root: &Path,
    config: &CalculationConfig,
    reporter: &ProgressReporter,
) -> Result<UnitReport, EngineError> {
    fs::create_dir_all(output_root)?;

    let mut claimed = HashSet::new();
    let report = match stage_input(input, output_root, &mut claimed) {
        Ok(unit) => {
            let outcome = sequencer::execute_unit(&unit, config);
            UnitReport {
                name: unit.name,
                dir: unit.dir,
                input_file: unit.input_file,
                outcome,
            }
        }
        Err(report) => report,
    };

    reporter.report(Progress::UnitFinished {
        name: report.name.clone(),
        success: report.outcome.is_success(),
    });
    info!(
        unit = %report.name,
        success = report.outcome.is_success(),
        "Single calculation complete."
    );
    Ok(report)
}

fn stage_input(
    input: &Path,
    output_root: &Path,
    claimed_names: &mut HashSet<String>,
) -> Result<WorkUnit, UnitReport> {
    let name = unit_name_of(input);

    if !claimed_names.insert(name.clone()) {
        return Err(UnitReport {
            dir: output_root.join(&name),
            input_file: input_file_of(input),
            outcome: UnitOutcome::Failed(UnitError::Staging {
                message: format!("duplicate unit name '{name}' in batch"),
            }),
            name,
        });
    }

    staging::stage_unit(input, output_root).map_err(|err| UnitReport {
        dir: output_root.join(&name),
        input_file: input_file_of(input),
        outcome: UnitOutcome::Failed(err.into()),
        name,
    })
}

fn unit_name_of(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

fn input_file_of(input: &Path) -> String {
    input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
