use std::fs::File;
use std::process::{Command, Stdio};
use tracing::debug;

use super::config::CalculationConfig;
use super::outcome::{UnitError, UnitOutcome};
use super::staging::WorkUnit;

pub(crate) fn step_log_name(step: usize) -> String {
    format!("step_{step}.log")
}

/// Runs the configured command chain for one staged unit.
///
/// Commands execute in order with the unit directory as working directory;
/// each step's stdout and stderr are merged into `step_<n>.log` beside the
/// staged input. The first non-zero exit aborts the remaining steps. For
/// multi-step chains the configured expected output must exist after the
/// first step, since dependent steps consume it by name.
///
/// There is no per-step timeout: a hung external process blocks this unit
/// (and its worker slot) until the process exits.
pub fn execute_unit(unit: &WorkUnit, config: &CalculationConfig) -> UnitOutcome {
    match run_steps(unit, config) {
        Ok(()) => UnitOutcome::Success,
        Err(err) => UnitOutcome::Failed(err),
    }
}

fn run_steps(unit: &WorkUnit, config: &CalculationConfig) -> Result<(), UnitError> {
    for (index, template) in config.commands.iter().enumerate() {
        let step = index + 1;
        let command_line = template.resolve(&unit.input_file);
        let log_path = unit.dir.join(step_log_name(step));

        debug!(unit = %unit.name, step, command = %command_line, "Executing step.");

        let mut parts = command_line.split_whitespace();
        let Some(program) = parts.next() else {
            return Err(UnitError::Unexpected {
                message: format!("step {step} resolved to an empty command"),
            });
        };

        let stdout_log = File::create(&log_path).map_err(|e| UnitError::Unexpected {
            message: format!("failed to create '{}': {e}", log_path.display()),
        })?;
        let stderr_log = stdout_log.try_clone().map_err(|e| UnitError::Unexpected {
            message: format!("failed to clone log handle for '{}': {e}", log_path.display()),
        })?;

        let status = Command::new(program)
            .args(parts)
            .current_dir(&unit.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_log))
            .stderr(Stdio::from(stderr_log))
            .status()
            .map_err(|e| UnitError::Unexpected {
                message: format!("failed to launch '{program}': {e}"),
            })?;

        if !status.success() {
            return Err(UnitError::CommandFailed {
                step,
                command: command_line,
                code: status.code(),
                log_path,
            });
        }

        // Tools like xtb can exit 0 without converging; the artifact check
        // catches that before a dependent step consumes a stale structure.
        if index == 0 && config.commands.len() > 1 {
            let expected = unit.dir.join(&config.expected_output);
            if !expected.exists() {
                return Err(UnitError::MissingOutput {
                    step,
                    expected: config.expected_output.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use crate::engine::config::CalculationConfigBuilder;
    use crate::engine::staging::stage_unit;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    fn write_script(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn staged_unit(root: &TempDir) -> WorkUnit {
        let input = root.path().join("mol.xyz");
        fs::write(&input, "1\nmol\nC 0.0 0.0 0.0\n").unwrap();
        stage_unit(&input, &root.path().join("out")).unwrap()
    }

    fn config_of(commands: &[String]) -> CalculationConfig {
        CalculationConfigBuilder::new()
            .commands(commands.iter().cloned())
            .max_workers(1)
            .build()
            .unwrap()
    }

    #[test]
    fn single_step_success_writes_merged_log() {
        let root = tempdir().unwrap();
        let unit = staged_unit(&root);
        let script = write_script(root.path(), "noisy.sh", "echo to-stdout; echo to-stderr >&2");

        let outcome = execute_unit(&unit, &config_of(&[format!("{script} {{}}")]));

        assert_eq!(outcome, UnitOutcome::Success);
        let log = fs::read_to_string(unit.dir.join("step_1.log")).unwrap();
        assert!(log.contains("to-stdout"));
        assert!(log.contains("to-stderr"));
    }

    #[test]
    fn placeholder_receives_staged_filename() {
        let root = tempdir().unwrap();
        let unit = staged_unit(&root);
        let script = write_script(root.path(), "record.sh", "echo \"arg=$1\"");

        let outcome = execute_unit(&unit, &config_of(&[format!("{script} {{}}")]));

        assert_eq!(outcome, UnitOutcome::Success);
        let log = fs::read_to_string(unit.dir.join("step_1.log")).unwrap();
        assert!(log.contains("arg=mol.xyz"));
    }

    #[test]
    fn steps_run_in_the_unit_directory() {
        let root = tempdir().unwrap();
        let unit = staged_unit(&root);
        let script = write_script(root.path(), "touch.sh", "touch marker.txt");

        let outcome = execute_unit(&unit, &config_of(&[script]));

        assert_eq!(outcome, UnitOutcome::Success);
        assert!(unit.dir.join("marker.txt").exists());
    }

    #[test]
    fn nonzero_exit_aborts_with_command_failed() {
        let root = tempdir().unwrap();
        let unit = staged_unit(&root);
        let fail = write_script(root.path(), "fail.sh", "echo diverged >&2; exit 2");
        let never = write_script(root.path(), "never.sh", "touch should_not_exist.txt");

        let outcome = execute_unit(
            &unit,
            &config_of(&[format!("{fail} {{}}"), never.clone()]),
        );

        match outcome {
            UnitOutcome::Failed(UnitError::CommandFailed {
                step,
                code,
                log_path,
                ..
            }) => {
                assert_eq!(step, 1);
                assert_eq!(code, Some(2));
                assert!(log_path.ends_with("step_1.log"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!unit.dir.join("should_not_exist.txt").exists());
        assert!(!unit.dir.join("step_2.log").exists());
    }

    #[test]
    fn multi_step_chain_requires_expected_output_after_first_step() {
        let root = tempdir().unwrap();
        let unit = staged_unit(&root);
        let quiet = write_script(root.path(), "quiet.sh", "exit 0");
        let never = write_script(root.path(), "never.sh", "touch should_not_exist.txt");

        let outcome = execute_unit(&unit, &config_of(&[format!("{quiet} {{}}"), never]));

        assert_eq!(
            outcome,
            UnitOutcome::Failed(UnitError::MissingOutput {
                step: 1,
                expected: "xtbopt.xyz".to_string(),
            })
        );
        assert!(!unit.dir.join("should_not_exist.txt").exists());
    }

    #[test]
    fn multi_step_chain_proceeds_once_expected_output_exists() {
        let root = tempdir().unwrap();
        let unit = staged_unit(&root);
        let optimize = write_script(root.path(), "opt.sh", "cp \"$1\" xtbopt.xyz");
        let property = write_script(root.path(), "prop.sh", "test -f xtbopt.xyz && touch done.txt");

        let outcome = execute_unit(
            &unit,
            &config_of(&[format!("{optimize} {{}}"), property]),
        );

        assert_eq!(outcome, UnitOutcome::Success);
        assert!(unit.dir.join("done.txt").exists());
        assert!(unit.dir.join("step_1.log").exists());
        assert!(unit.dir.join("step_2.log").exists());
    }

    #[test]
    fn single_step_chain_skips_expected_output_check() {
        let root = tempdir().unwrap();
        let unit = staged_unit(&root);
        let quiet = write_script(root.path(), "quiet.sh", "exit 0");

        let outcome = execute_unit(&unit, &config_of(&[format!("{quiet} {{}}")]));

        assert_eq!(outcome, UnitOutcome::Success);
    }

    #[test]
    fn literal_template_runs_verbatim() {
        let root = tempdir().unwrap();
        let unit = staged_unit(&root);
        let script = write_script(root.path(), "plain.sh", "echo \"argc=$#\"");

        let outcome = execute_unit(&unit, &config_of(&[script]));

        assert_eq!(outcome, UnitOutcome::Success);
        let log = fs::read_to_string(unit.dir.join("step_1.log")).unwrap();
        assert!(log.contains("argc=0"));
    }

    #[test]
    fn unlaunchable_program_maps_to_unexpected() {
        let root = tempdir().unwrap();
        let unit = staged_unit(&root);

        let outcome = execute_unit(
            &unit,
            &config_of(&["/nonexistent/xtb {}".to_string()]),
        );

        match outcome {
            UnitOutcome::Failed(UnitError::Unexpected { message }) => {
                assert!(message.contains("failed to launch"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
