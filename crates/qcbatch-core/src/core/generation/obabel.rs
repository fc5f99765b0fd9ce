use super::{CoordinateGenerator, GenerationError};
use crate::core::io::xyz::XyzDocument;
use std::fs;
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, info};

pub const DEFAULT_FORCE_FIELD: ForceField = ForceField::Mmff94;
pub const DEFAULT_OPTIMIZATION_STEPS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceField {
    Mmff94,
    Uff,
    Gaff,
}

impl ForceField {
    pub fn as_arg(self) -> &'static str {
        match self {
            ForceField::Mmff94 => "MMFF94",
            ForceField::Uff => "UFF",
            ForceField::Gaff => "GAFF",
        }
    }
}

impl Default for ForceField {
    fn default() -> Self {
        DEFAULT_FORCE_FIELD
    }
}

/// Generates 3-D structures by invoking the OpenBabel `obabel` binary.
///
/// The SMILES string is written to a temporary `.smi` file, converted with
/// `--gen3d` (plus an optional force-field minimization), and the resulting
/// XYZ is read back with its comment line rewritten to carry the molecule
/// name, source SMILES, and derived formula.
#[derive(Debug, Clone)]
pub struct ObabelGenerator {
    program: String,
    force_field: ForceField,
    optimization_steps: u32,
    minimize: bool,
}

impl ObabelGenerator {
    pub fn new() -> Self {
        Self {
            program: "obabel".to_string(),
            force_field: DEFAULT_FORCE_FIELD,
            optimization_steps: DEFAULT_OPTIMIZATION_STEPS,
            minimize: true,
        }
    }

    pub fn force_field(mut self, force_field: ForceField) -> Self {
        self.force_field = force_field;
        self
    }

    pub fn optimization_steps(mut self, steps: u32) -> Self {
        self.optimization_steps = steps;
        self
    }

    pub fn minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }

    /// Overrides the executable name, e.g. for an `obabel` outside `PATH`.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for ObabelGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateGenerator for ObabelGenerator {
    fn generate(&self, smiles: &str, name: &str) -> Result<XyzDocument, GenerationError> {
        let workdir = TempDir::new()?;
        let smi_path = workdir.path().join("input.smi");
        let xyz_path = workdir.path().join("output.xyz");
        fs::write(&smi_path, smiles)?;

        let mut command = Command::new(&self.program);
        command
            .arg(&smi_path)
            .arg("-O")
            .arg(&xyz_path)
            .arg("--gen3d");
        if self.minimize {
            command
                .arg("--minimize")
                .arg("--steps")
                .arg(self.optimization_steps.to_string())
                .arg("--ff")
                .arg(self.force_field.as_arg());
        }

        debug!(molecule = name, program = %self.program, "Invoking coordinate generator.");
        let output = command.output().map_err(|source| GenerationError::Launch {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(GenerationError::ToolFailure {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if !xyz_path.exists() {
            return Err(GenerationError::MissingOutput);
        }

        let mut document = XyzDocument::read_from_path(&xyz_path)?;
        document.comment = format!(
            "{} - SMILES: {} - Formula: {}",
            name,
            smiles,
            document.formula()
        );

        info!(
            molecule = name,
            atoms = document.atoms.len(),
            minimized = self.minimize,
            "Generated 3-D coordinates."
        );
        Ok(document)
    }
}
