//! Provides SMILES-to-3D coordinate generation through external tools.
//!
//! Generators are deliberately narrow: one line of SMILES notation in, one
//! parsed [`XyzDocument`](crate::core::io::xyz::XyzDocument) out. The batch
//! workflow drives them sequentially and records failures through an
//! explicitly passed [`FailureLog`](failure_log::FailureLog) rather than a
//! process-global file.

pub mod failure_log;
pub mod obabel;

use crate::core::io::xyz::{XyzDocument, XyzError};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        source: io::Error,
    },
    #[error("Generator exited with status {code:?}: {stderr}")]
    ToolFailure { code: Option<i32>, stderr: String },
    #[error("Generator produced no output file")]
    MissingOutput,
    #[error("Generated structure could not be read: {0}")]
    Xyz(#[from] XyzError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Produces a 3-D structure for a molecule given in SMILES line notation.
pub trait CoordinateGenerator {
    fn generate(&self, smiles: &str, name: &str) -> Result<XyzDocument, GenerationError>;
}
