use std::fmt;
use std::thread;
use thiserror::Error;
use tracing::warn;

/// Ceiling on the default worker count on very wide machines.
pub const WORKER_CAP: usize = 30;

/// Artifact an optimization step must leave behind before dependent steps run.
pub const DEFAULT_EXPECTED_OUTPUT: &str = "xtbopt.xyz";

pub const PLACEHOLDER: &str = "{}";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Command list must contain at least one command")]
    NoCommands,
    #[error("Command at index {index} is blank")]
    BlankCommand { index: usize },
    #[error("Worker count must be at least 1")]
    ZeroWorkers,
}

/// One configured external command, optionally containing a `{}` placeholder
/// for the unit's staged input filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate(String);

impl CommandTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn has_placeholder(&self) -> bool {
        self.0.contains(PLACEHOLDER)
    }

    /// Substitutes the staged input filename; templates without a
    /// placeholder come back verbatim.
    pub fn resolve(&self, input_file: &str) -> String {
        self.0.replace(PLACEHOLDER, input_file)
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationConfig {
    pub commands: Vec<CommandTemplate>,
    pub expected_output: String,
    pub max_workers: usize,
}

pub fn default_max_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(WORKER_CAP)
}

#[derive(Default)]
pub struct CalculationConfigBuilder {
    commands: Option<Vec<String>>,
    expected_output: Option<String>,
    max_workers: Option<usize>,
}

impl CalculationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands = Some(commands.into_iter().map(Into::into).collect());
        self
    }

    pub fn expected_output(mut self, name: impl Into<String>) -> Self {
        self.expected_output = Some(name.into());
        self
    }

    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    pub fn build(self) -> Result<CalculationConfig, ConfigError> {
        let raw_commands = self
            .commands
            .ok_or(ConfigError::MissingParameter("commands"))?;
        if raw_commands.is_empty() {
            return Err(ConfigError::NoCommands);
        }

        let mut commands = Vec::with_capacity(raw_commands.len());
        for (index, raw) in raw_commands.into_iter().enumerate() {
            if raw.trim().is_empty() {
                return Err(ConfigError::BlankCommand { index });
            }
            let template = CommandTemplate::new(raw);
            if !template.has_placeholder() {
                warn!(
                    step = index + 1,
                    template = %template,
                    "Command template has no '{{}}' placeholder; it will run verbatim for every unit."
                );
            }
            commands.push(template);
        }

        let max_workers = match self.max_workers {
            Some(0) => return Err(ConfigError::ZeroWorkers),
            Some(n) => n,
            None => default_max_workers(),
        };

        Ok(CalculationConfig {
            commands,
            expected_output: self
                .expected_output
                .unwrap_or_else(|| DEFAULT_EXPECTED_OUTPUT.to_string()),
            max_workers,
        })
    }
}
