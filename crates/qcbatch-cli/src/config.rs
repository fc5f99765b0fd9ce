use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use qcbatch::engine::config::{CalculationConfig, CalculationConfigBuilder};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialCalculationConfig {
    commands: Option<Vec<String>>,
    #[serde(rename = "expected-output")]
    expected_output: Option<String>,
    #[serde(rename = "max-workers")]
    max_workers: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialGenerationConfig {
    #[serde(rename = "force-field")]
    pub force_field: Option<String>,
    #[serde(rename = "optimization-steps")]
    pub optimization_steps: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    calculation: Option<PartialCalculationConfig>,
    generation: Option<PartialGenerationConfig>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Folds the config file and CLI overrides into the core configuration.
    /// Precedence: CLI argument, then config file, then built-in default.
    pub fn merge_with_cli(
        mut self,
        args: &RunArgs,
        workers: Option<usize>,
    ) -> Result<CalculationConfig> {
        let calc = self.calculation.take().unwrap_or_default();

        let commands = calc.commands.ok_or_else(|| {
            CliError::Config(
                "`calculation.commands` is required in the configuration file.".to_string(),
            )
        })?;

        let mut builder = CalculationConfigBuilder::new().commands(commands);
        if let Some(expected) = args.expected_output.clone().or(calc.expected_output) {
            builder = builder.expected_output(expected);
        }
        if let Some(workers) = workers.or(calc.max_workers) {
            builder = builder.max_workers(workers);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn generation(&self) -> PartialGenerationConfig {
        self.generation.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use once_cell::sync::Lazy;
    use qcbatch::engine::config::DEFAULT_EXPECTED_OUTPUT;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn parse_run(extra: &[&str], config_path: &Path) -> (RunArgs, Option<usize>) {
        let mut argv = vec![
            "qcbatch".to_string(),
            "run".to_string(),
            "-i".to_string(),
            "structures/".to_string(),
            "-o".to_string(),
            "batch_out/".to_string(),
            "-c".to_string(),
            config_path.to_str().unwrap().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));

        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Run(args) => (args, cli.workers),
            _ => unreachable!(),
        }
    }

    #[test]
    fn file_values_flow_into_the_core_config() {
        let path = write_config_file(
            "full.toml",
            r#"
            [calculation]
            commands = [
                "xtb {} --opt normal --gbsa benzene",
                "xtb xtbopt.xyz --vipea --gbsa benzene",
            ]
            expected-output = "optimized.xyz"
            max-workers = 4
            "#,
        );

        let (args, workers) = parse_run(&[], &path);
        let config = PartialConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args, workers)
            .unwrap();

        assert_eq!(config.commands.len(), 2);
        assert_eq!(config.commands[0].as_str(), "xtb {} --opt normal --gbsa benzene");
        assert_eq!(config.expected_output, "optimized.xyz");
        assert_eq!(config.max_workers, 4);
    }

    #[test]
    fn cli_arguments_take_precedence_over_the_file() {
        let path = write_config_file(
            "precedence.toml",
            r#"
            [calculation]
            commands = ["xtb {} --opt"]
            expected-output = "from-file.xyz"
            max-workers = 2
            "#,
        );

        let (args, workers) = parse_run(&["-j", "8", "--expected-output", "from-cli.xyz"], &path);
        let config = PartialConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args, workers)
            .unwrap();

        assert_eq!(config.expected_output, "from-cli.xyz");
        assert_eq!(config.max_workers, 8);
    }

    #[test]
    fn defaults_fill_in_when_only_commands_are_given() {
        let path = write_config_file(
            "minimal.toml",
            r#"
            [calculation]
            commands = ["xtb {} --opt"]
            "#,
        );

        let (args, workers) = parse_run(&[], &path);
        let config = PartialConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args, workers)
            .unwrap();

        assert_eq!(config.expected_output, DEFAULT_EXPECTED_OUTPUT);
        assert!(config.max_workers >= 1);
    }

    #[test]
    fn missing_commands_is_a_config_error() {
        let path = write_config_file("empty.toml", "[calculation]\n");

        let (args, workers) = parse_run(&[], &path);
        let err = PartialConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args, workers)
            .unwrap_err();

        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("calculation.commands"));
    }

    #[test]
    fn empty_command_list_is_rejected_by_the_builder() {
        let path = write_config_file(
            "no-commands.toml",
            r#"
            [calculation]
            commands = []
            "#,
        );

        let (args, workers) = parse_run(&[], &path);
        let err = PartialConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args, workers)
            .unwrap_err();

        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let path = write_config_file(
            "unknown.toml",
            r#"
            [calculation]
            commands = ["xtb {}"]
            comands = ["typo"]
            "#,
        );

        let err = PartialConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { .. }));
    }

    #[test]
    fn generation_section_is_optional_and_parsed() {
        let path = write_config_file(
            "generation.toml",
            r#"
            [calculation]
            commands = ["xtb {}"]

            [generation]
            force-field = "UFF"
            optimization-steps = 500
            "#,
        );

        let config = PartialConfig::from_file(&path).unwrap();
        let generation = config.generation();
        assert_eq!(generation.force_field.as_deref(), Some("UFF"));
        assert_eq!(generation.optimization_steps, Some(500));
    }
}
