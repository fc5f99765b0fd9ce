use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only sink for molecules that failed coordinate generation.
///
/// One entry per failure: `TIMESTAMP | SMILES | MOLECULE_NAME | ERROR_MESSAGE`.
/// The log is owned by whoever runs the batch and passed down explicitly, so
/// two concurrent batches never race on a shared global file.
pub struct FailureLog {
    path: PathBuf,
    writer: Mutex<File>,
}

impl FailureLog {
    pub fn create(path: &Path) -> io::Result<Self> {
        let mut file = File::create(path)?;
        writeln!(file, "# Error Log for SMILES Coordinate Generation")?;
        writeln!(
            file,
            "# Generated on: {}",
            Local::now().format(TIMESTAMP_FORMAT)
        )?;
        writeln!(file, "# Format: TIMESTAMP | SMILES | MOLECULE_NAME | ERROR_MESSAGE")?;
        writeln!(file, "# {}", "=".repeat(80))?;
        writeln!(file)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(file),
        })
    }

    /// Reopens an existing log for appending without rewriting the header.
    pub fn append(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, smiles: &str, name: &str, error: &str) -> io::Result<()> {
        let entry = format!(
            "{} | {} | {} | {}",
            Local::now().format(TIMESTAMP_FORMAT),
            smiles,
            name,
            error
        );
        let mut file = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("failure log mutex poisoned"))?;
        writeln!(file, "{}", entry)?;
        file.flush()
    }
}
