use rayon::prelude::*;
use tracing::{info, warn};

use super::config::CalculationConfig;
use super::error::EngineError;
use super::outcome::{UnitOutcome, UnitReport};
use super::progress::{Progress, ProgressReporter};
use super::sequencer;
use super::staging::WorkUnit;

/// Executes staged units across a bounded worker pool.
///
/// A dedicated pool of `max_workers` threads keeps the batch width
/// independent of the global rayon pool. Each worker blocks only on its own
/// child process; one unit's failure is recorded and never cancels the rest.
/// Reports come back in submission order regardless of completion order.
pub fn run_units(
    units: &[WorkUnit],
    config: &CalculationConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<UnitReport>, EngineError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_workers)
        .build()
        .map_err(|e| EngineError::WorkerPool(e.to_string()))?;

    info!(
        units = units.len(),
        workers = config.max_workers,
        "Dispatching batch to worker pool."
    );
    reporter.report(Progress::TaskStart {
        total: units.len() as u64,
    });

    let reports: Vec<UnitReport> = pool.install(|| {
        units
            .par_iter()
            .map(|unit| {
                let outcome = sequencer::execute_unit(unit, config);
                if let UnitOutcome::Failed(err) = &outcome {
                    warn!(unit = %unit.name, error = %err, "Unit failed.");
                }
                reporter.report(Progress::UnitFinished {
                    name: unit.name.clone(),
                    success: outcome.is_success(),
                });
                reporter.report(Progress::TaskIncrement);
                UnitReport {
                    name: unit.name.clone(),
                    dir: unit.dir.clone(),
                    input_file: unit.input_file.clone(),
                    outcome,
                }
            })
            .collect()
    });

    reporter.report(Progress::TaskFinish);
    Ok(reports)
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use crate::engine::config::CalculationConfigBuilder;
    use crate::engine::outcome::UnitError;
    use crate::engine::staging::stage_unit;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::tempdir;

    fn write_script(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn stage_inputs(root: &Path, names: &[&str]) -> Vec<WorkUnit> {
        names
            .iter()
            .map(|name| {
                let input = root.join(format!("{name}.xyz"));
                fs::write(&input, format!("1\n{name}\nC 0.0 0.0 0.0\n")).unwrap();
                stage_unit(&input, &root.join("out")).unwrap()
            })
            .collect()
    }

    fn config_of(commands: Vec<String>, workers: usize) -> CalculationConfig {
        CalculationConfigBuilder::new()
            .commands(commands)
            .expected_output("stepout.xyz")
            .max_workers(workers)
            .build()
            .unwrap()
    }

    #[test]
    fn reports_preserve_submission_order() {
        let root = tempdir().unwrap();
        let units = stage_inputs(root.path(), &["slow", "medium", "fast"]);
        // Inverse sleep times force completion in reverse submission order.
        let script = write_script(
            root.path(),
            "sleepy.sh",
            r#"case "$1" in slow.xyz) sleep 0.3;; medium.xyz) sleep 0.15;; esac"#,
        );

        let reports = run_units(
            &units,
            &config_of(vec![format!("{script} {{}}")], 3),
            &ProgressReporter::new(),
        )
        .unwrap();

        let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["slow", "medium", "fast"]);
    }

    #[test]
    fn one_failing_unit_leaves_the_rest_untouched() {
        let root = tempdir().unwrap();
        let units = stage_inputs(root.path(), &["mol1", "mol2", "mol3"]);
        let optimize = write_script(
            root.path(),
            "opt.sh",
            r#"if [ "$1" = "mol2.xyz" ]; then echo diverged >&2; exit 1; fi
cp "$1" stepout.xyz"#,
        );
        let property = write_script(root.path(), "prop.sh", "test -f stepout.xyz");

        let reports = run_units(
            &units,
            &config_of(vec![format!("{optimize} {{}}"), property], 3),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(reports.len(), 3);
        assert!(reports[0].outcome.is_success());
        assert!(matches!(
            reports[1].outcome,
            UnitOutcome::Failed(UnitError::CommandFailed { step: 1, .. })
        ));
        assert!(reports[2].outcome.is_success());
    }

    #[test]
    fn units_never_touch_each_others_directories() {
        let root = tempdir().unwrap();
        let units = stage_inputs(root.path(), &["alpha", "beta"]);
        let script = write_script(root.path(), "mark.sh", r#"touch "marker_$1.txt""#);

        run_units(
            &units,
            &config_of(vec![format!("{script} {{}}")], 2),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(units[0].dir.join("marker_alpha.xyz.txt").exists());
        assert!(!units[0].dir.join("marker_beta.xyz.txt").exists());
        assert!(units[1].dir.join("marker_beta.xyz.txt").exists());
        assert!(!units[1].dir.join("marker_alpha.xyz.txt").exists());
    }

    #[test]
    fn worker_count_does_not_change_the_result() {
        let root = tempdir().unwrap();
        let units = stage_inputs(root.path(), &["a", "b", "c", "d"]);
        let script = write_script(
            root.path(),
            "opt.sh",
            r#"if [ "$1" = "c.xyz" ]; then exit 1; fi; cp "$1" stepout.xyz"#,
        );
        let commands = vec![format!("{script} {{}}")];

        let serial = run_units(
            &units,
            &config_of(commands.clone(), 1),
            &ProgressReporter::new(),
        )
        .unwrap();
        let parallel = run_units(
            &units,
            &config_of(commands, 4),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(serial, parallel);
    }

    #[test]
    fn progress_events_cover_every_unit() {
        let root = tempdir().unwrap();
        let units = stage_inputs(root.path(), &["x", "y", "z"]);
        let script = write_script(root.path(), "ok.sh", "exit 0");

        let events = Mutex::new(Vec::new());
        let reporter =
            ProgressReporter::with_callback(Box::new(|p| events.lock().unwrap().push(p)));

        run_units(&units, &config_of(vec![script], 2), &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert!(matches!(events.first(), Some(Progress::TaskStart { total: 3 })));
        assert!(matches!(events.last(), Some(Progress::TaskFinish)));

        let mut finished: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Progress::UnitFinished { name, success } => {
                    assert!(*success);
                    Some(name.clone())
                }
                _ => None,
            })
            .collect();
        finished.sort();
        assert_eq!(finished, vec!["x", "y", "z"]);

        let increments = events
            .iter()
            .filter(|e| matches!(e, Progress::TaskIncrement))
            .count();
        assert_eq!(increments, 3);
    }
}
