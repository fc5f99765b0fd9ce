use crate::cli::{ForceFieldArg, GenerateArgs};
use crate::config::{PartialConfig, PartialGenerationConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use chrono::Local;
use qcbatch::core::generation::failure_log::FailureLog;
use qcbatch::core::generation::obabel::{DEFAULT_OPTIMIZATION_STEPS, ForceField, ObabelGenerator};
use qcbatch::engine::progress::ProgressReporter;
use qcbatch::workflows;
use qcbatch::workflows::generate::SmilesEntry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const FAILURE_LOG_NAME: &str = "error.log";

pub fn run(args: GenerateArgs) -> Result<()> {
    let file_defaults = match &args.config {
        Some(path) => PartialConfig::from_file(path)?.generation(),
        None => PartialGenerationConfig::default(),
    };

    let smiles = read_smi_file(&args.input)?;
    if smiles.is_empty() {
        return Err(CliError::Argument(format!(
            "no SMILES entries found in '{}'",
            args.input.display()
        )));
    }
    let entries = SmilesEntry::numbered(smiles);

    let out_dir = batch_dir_name(&args.output_root, &args.input, &args.tag)?;
    fs::create_dir_all(&out_dir)?;
    let failure_log = open_failure_log(&out_dir)?;

    let force_field = resolve_force_field(args.force_field, file_defaults.force_field.as_deref())?;
    let steps = args
        .optimization_steps
        .or(file_defaults.optimization_steps)
        .unwrap_or(DEFAULT_OPTIMIZATION_STEPS);
    let generator = ObabelGenerator::new()
        .force_field(force_field)
        .optimization_steps(steps)
        .minimize(!args.no_optimize);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Generating 3D structures for {} SMILES entr{}...",
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" }
    );
    info!("Invoking the structure generation workflow...");
    let summary = workflows::generate::run(&entries, &out_dir, &generator, &failure_log, &reporter)?;

    println!();
    println!(
        "Generation complete: {}/{} structures written, {} failed.",
        summary.success_count(),
        summary.total(),
        summary.failure_count()
    );
    if !summary.failures.is_empty() {
        println!("Failures are recorded in {}", failure_log.path().display());
    }
    println!("Structures written to {}", out_dir.display());

    Ok(())
}

/// Reads a `.smi` file into its non-empty, trimmed lines.
fn read_smi_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Builds the `<stem>_<timestamp>_<tag>` batch directory path under the
/// output root, so repeated runs on the same input never collide.
fn batch_dir_name(output_root: &Path, input: &Path, tag: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            CliError::Argument(format!("cannot derive a name from '{}'", input.display()))
        })?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    Ok(output_root.join(format!("{stem}_{timestamp}_{tag}")))
}

/// Opens the batch directory's failure log, appending to one left by an
/// earlier run into the same directory instead of truncating it.
fn open_failure_log(out_dir: &Path) -> Result<FailureLog> {
    let path = out_dir.join(FAILURE_LOG_NAME);
    let log = if path.exists() {
        FailureLog::append(&path)?
    } else {
        FailureLog::create(&path)?
    };
    Ok(log)
}

/// CLI choice wins over the configuration file, which wins over the default.
fn resolve_force_field(cli: Option<ForceFieldArg>, file: Option<&str>) -> Result<ForceField> {
    if let Some(arg) = cli {
        return Ok(arg.into());
    }
    match file {
        Some(name) => match name.to_ascii_uppercase().as_str() {
            "MMFF94" => Ok(ForceField::Mmff94),
            "UFF" => Ok(ForceField::Uff),
            "GAFF" => Ok(ForceField::Gaff),
            _ => Err(CliError::Config(format!(
                "unknown force field '{name}' in configuration file (expected MMFF94, UFF, or GAFF)"
            ))),
        },
        None => Ok(ForceField::default()),
    }
}
