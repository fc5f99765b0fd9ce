use thiserror::Error;

use super::config::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("No work units in batch: {0}")]
    EmptyBatch(&'static str),

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
