use crate::cli::CollectArgs;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use qcbatch::engine::outcome::{BatchResult, UnitOutcome, UnitReport};
use qcbatch::engine::progress::ProgressReporter;
use qcbatch::workflows;
use std::path::Path;
use tracing::{debug, info};

pub fn run(args: CollectArgs) -> Result<()> {
    if !args.batch_dir.is_dir() {
        return Err(CliError::Argument(format!(
            "'{}' is not a directory",
            args.batch_dir.display()
        )));
    }

    let units = discover_finished_units(&args.batch_dir, &args.optimized_output)?;
    if units.is_empty() {
        return Err(CliError::Argument(format!(
            "no unit directories containing '{}' found in '{}'",
            args.optimized_output,
            args.batch_dir.display()
        )));
    }
    info!(
        units = units.len(),
        "Collecting optimized structures from the batch directory..."
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let result = BatchResult { units };
    let summary =
        workflows::collect::run(&result, &args.optimized_output, &args.export_dir, &reporter)?;

    println!();
    println!(
        "Exported {} structure(s) to {}",
        summary.exported.len(),
        args.export_dir.display()
    );
    if !summary.skipped.is_empty() {
        println!("Skipped {} unit(s) with unreadable artifacts:", summary.skipped.len());
        for (name, reason) in &summary.skipped {
            println!("  ✗ {name}: {reason}");
        }
    }
    println!("Dataset index written to {}", summary.index_path.display());

    Ok(())
}

/// Scans a batch directory for unit subdirectories that contain the optimized
/// artifact, reconstructing the reports `collect` operates on. Units that
/// never produced the artifact are skipped with a debug note.
fn discover_finished_units(batch_dir: &Path, optimized_output: &str) -> Result<Vec<UnitReport>> {
    let mut units = Vec::new();
    for entry in std::fs::read_dir(batch_dir)? {
        let entry = entry?;
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let Some(name) = dir.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
            debug!(dir = %dir.display(), "Skipping unit directory with a non-UTF-8 name");
            continue;
        };
        if !dir.join(optimized_output).exists() {
            debug!(unit = %name, "Skipping unit without the optimized artifact");
            continue;
        }
        units.push(UnitReport {
            name: name.clone(),
            input_file: format!("{name}.xyz"),
            dir,
            outcome: UnitOutcome::Success,
        });
    }
    units.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(units)
}
