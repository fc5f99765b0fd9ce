use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },
    #[error("Input file has no usable name: {}", path.display())]
    InvalidInputName { path: PathBuf },
    #[error("Failed to create unit directory '{}': {source}", dir.display())]
    CreateDir { dir: PathBuf, source: io::Error },
    #[error("Failed to copy input into '{}': {source}", dir.display())]
    CopyInput { dir: PathBuf, source: io::Error },
}

/// One staged input structure with its isolated working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub name: String,
    pub dir: PathBuf,
    pub input_file: String,
}

/// Prepares the isolated working directory for one input structure.
///
/// The directory `<output_root>/<stem>/` is created if absent and reused if
/// present; the input file is copied in unchanged. Re-staging the same input
/// overwrites the single staged copy rather than accumulating duplicates.
pub fn stage_unit(input: &Path, output_root: &Path) -> Result<WorkUnit, StagingError> {
    if !input.is_file() {
        return Err(StagingError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    let (name, input_file) = match (
        input.file_stem().and_then(|s| s.to_str()),
        input.file_name().and_then(|s| s.to_str()),
    ) {
        (Some(stem), Some(file)) if !stem.is_empty() => (stem.to_string(), file.to_string()),
        _ => {
            return Err(StagingError::InvalidInputName {
                path: input.to_path_buf(),
            });
        }
    };

    let dir = output_root.join(&name);
    fs::create_dir_all(&dir).map_err(|source| StagingError::CreateDir {
        dir: dir.clone(),
        source,
    })?;
    fs::copy(input, dir.join(&input_file)).map_err(|source| StagingError::CopyInput {
        dir: dir.clone(),
        source,
    })?;

    debug!(unit = %name, dir = %dir.display(), "Staged work unit.");
    Ok(WorkUnit {
        name,
        dir,
        input_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn stage_creates_directory_and_copies_input() {
        let root = tempdir().unwrap();
        let input = write_input(root.path(), "benzene.xyz", "12\nbenzene\n");
        let out = root.path().join("out");

        let unit = stage_unit(&input, &out).unwrap();

        assert_eq!(unit.name, "benzene");
        assert_eq!(unit.input_file, "benzene.xyz");
        assert_eq!(unit.dir, out.join("benzene"));
        let staged = fs::read_to_string(unit.dir.join("benzene.xyz")).unwrap();
        assert_eq!(staged, "12\nbenzene\n");
    }

    #[test]
    fn stage_is_idempotent_and_overwrites_the_staged_copy() {
        let root = tempdir().unwrap();
        let input = write_input(root.path(), "mol.xyz", "old");
        let out = root.path().join("out");

        stage_unit(&input, &out).unwrap();
        fs::write(&input, "new").unwrap();
        let unit = stage_unit(&input, &out).unwrap();

        let entries: Vec<_> = fs::read_dir(&unit.dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(fs::read_to_string(unit.dir.join("mol.xyz")).unwrap(), "new");
    }

    #[test]
    fn stage_reuses_a_preexisting_directory() {
        let root = tempdir().unwrap();
        let input = write_input(root.path(), "mol.xyz", "data");
        let out = root.path().join("out");
        fs::create_dir_all(out.join("mol")).unwrap();
        fs::write(out.join("mol").join("leftover.log"), "previous run").unwrap();

        let unit = stage_unit(&input, &out).unwrap();

        assert!(unit.dir.join("leftover.log").exists());
        assert!(unit.dir.join("mol.xyz").exists());
    }

    #[test]
    fn stage_rejects_missing_input() {
        let root = tempdir().unwrap();
        let err = stage_unit(&root.path().join("absent.xyz"), root.path()).unwrap_err();
        assert!(matches!(err, StagingError::InputNotFound { .. }));
    }
}
