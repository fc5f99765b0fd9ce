use crate::cli::RunArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use qcbatch::engine::outcome::{BatchResult, UnitOutcome};
use qcbatch::engine::progress::ProgressReporter;
use qcbatch::workflows;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn run(args: RunArgs, workers: Option<usize>) -> Result<()> {
    let partial_config = PartialConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args, workers)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    if args.input.is_dir() {
        let inputs = discover_xyz_files(&args.input)?;
        if inputs.is_empty() {
            return Err(CliError::Argument(format!(
                "no .xyz files found in '{}'",
                args.input.display()
            )));
        }

        println!(
            "Starting batch calculation for {} structure(s) with {} worker(s)...",
            inputs.len(),
            config.max_workers
        );
        info!("Invoking the batch calculation workflow...");
        let result = workflows::calculate::run_batch(&inputs, &args.output, &config, &reporter)?;
        print_summary(&result, &args.output);
    } else {
        println!("Starting calculation for {}...", args.input.display());
        let report =
            workflows::calculate::run_single(&args.input, &args.output, &config, &reporter)?;

        match &report.outcome {
            UnitOutcome::Success => {
                println!("✓ {} completed; artifacts in {}", report.name, report.dir.display());
            }
            UnitOutcome::Failed(err) => {
                println!("✗ {} failed: {}", report.name, err);
            }
        }
    }

    Ok(())
}

/// `.xyz` files of a directory in sorted order, so submission order (and
/// with it the report order) is stable across runs.
fn discover_xyz_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("xyz"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn print_summary(result: &BatchResult, output_root: &Path) {
    println!();
    println!(
        "Batch complete: {}/{} succeeded, {} failed.",
        result.success_count(),
        result.total(),
        result.failure_count()
    );
    for unit in result.failures() {
        if let UnitOutcome::Failed(err) = &unit.outcome {
            println!("  ✗ {}: {}", unit.name, err);
        }
    }
    println!("Per-unit artifacts and step logs are in {}", output_root.display());
}
