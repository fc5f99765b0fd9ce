use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::core::io::xyz::XyzDocument;
use crate::engine::outcome::BatchResult;
use crate::engine::progress::{Progress, ProgressReporter};

pub const INDEX_FILE: &str = "index.csv";

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to write dataset index: {0}")]
    Index(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct IndexRecord {
    name: String,
    formula: String,
    atoms: usize,
    file: String,
}

#[derive(Debug, Default)]
pub struct CollectSummary {
    pub exported: Vec<PathBuf>,
    /// Successful units whose artifacts could not be read, with the reason.
    pub skipped: Vec<(String, String)>,
    pub index_path: PathBuf,
}

/// Gathers the optimized structures of a finished batch into one directory.
///
/// For each successful unit the file named by `optimized_output` is read from
/// the unit directory and written to `<export_dir>/<unit>.xyz`, with its
/// comment line replaced by the metadata comment of the unit's original
/// staged input. A `index.csv` dataset (name, formula, atom count, file)
/// sorted by unit name is written alongside. Failed units are never
/// revisited; a successful unit with a missing or unreadable artifact is
/// skipped with a warning.
#[instrument(skip_all, name = "collect_workflow")]
pub fn run(
    result: &BatchResult,
    optimized_output: &str,
    export_dir: &Path,
    reporter: &ProgressReporter,
) -> Result<CollectSummary, CollectError> {
    reporter.report(Progress::PhaseStart { name: "Collection" });
    fs::create_dir_all(export_dir)?;

    let mut successes: Vec<_> = result
        .units
        .iter()
        .filter(|u| u.outcome.is_success())
        .collect();
    successes.sort_by(|a, b| a.name.cmp(&b.name));

    reporter.report(Progress::TaskStart {
        total: successes.len() as u64,
    });
    info!(
        units = successes.len(),
        export = %export_dir.display(),
        "Collecting optimized structures."
    );

    let mut summary = CollectSummary {
        index_path: export_dir.join(INDEX_FILE),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(successes.len());

    for unit in successes {
        match merge_unit(&unit.dir, &unit.input_file, optimized_output) {
            Ok(document) => {
                let file = format!("{}.xyz", unit.name);
                let path = export_dir.join(&file);
                if let Err(err) = document.write_to_path(&path) {
                    warn!(unit = %unit.name, error = %err, "Could not write exported structure.");
                    summary.skipped.push((unit.name.clone(), err.to_string()));
                } else {
                    records.push(IndexRecord {
                        name: unit.name.clone(),
                        formula: document.formula(),
                        atoms: document.atoms.len(),
                        file,
                    });
                    summary.exported.push(path);
                }
            }
            Err(reason) => {
                warn!(unit = %unit.name, error = %reason, "Skipping unit during collection.");
                summary.skipped.push((unit.name.clone(), reason));
            }
        }
        reporter.report(Progress::TaskIncrement);
    }

    let mut writer = csv::Writer::from_path(&summary.index_path)?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    info!(
        exported = summary.exported.len(),
        skipped = summary.skipped.len(),
        "Collection complete."
    );
    Ok(summary)
}

/// Optimized coordinates with the original input's metadata comment.
fn merge_unit(
    unit_dir: &Path,
    input_file: &str,
    optimized_output: &str,
) -> Result<XyzDocument, String> {
    let optimized_path = unit_dir.join(optimized_output);
    let mut document = XyzDocument::read_from_path(&optimized_path)
        .map_err(|e| format!("cannot read '{}': {e}", optimized_path.display()))?;

    let original_path = unit_dir.join(input_file);
    let original = XyzDocument::read_from_path(&original_path)
        .map_err(|e| format!("cannot read '{}': {e}", original_path.display()))?;

    document.comment = original.comment;
    Ok(document)
}
