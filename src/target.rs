//! Validation of the repository path given on the command line.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TargetError {
    #[error("only repositories inside {allowed} can be analyzed (got {path})")]
    OutsideAllowedRoot { path: String, allowed: String },
    #[error("path {0} must not contain '..'")]
    ParentTraversal(String),
    #[error("path {0} does not exist")]
    NotFound(String),
    #[error("path {0} is not a directory")]
    NotADirectory(String),
}

/// A repository directory that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDir {
    path: PathBuf,
}

impl TargetDir {
    /// Validate `raw` against the allow-listed root.
    ///
    /// The check is a component-wise prefix match on the path as given (so
    /// `./repos/app` is accepted for `./repos`, `./repos-other` is not).
    pub fn resolve(raw: &Path, allowed_root: &Path) -> Result<Self, TargetError> {
        let shown = raw.display().to_string();

        if raw.components().any(|c| c == Component::ParentDir) {
            return Err(TargetError::ParentTraversal(shown));
        }
        if !raw.starts_with(allowed_root) {
            return Err(TargetError::OutsideAllowedRoot {
                path: shown,
                allowed: allowed_root.display().to_string(),
            });
        }

        match std::fs::metadata(raw) {
            Ok(m) if m.is_dir() => Ok(Self {
                path: raw.to_path_buf(),
            }),
            Ok(_) => Err(TargetError::NotADirectory(shown)),
            Err(_) => Err(TargetError::NotFound(shown)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_accepts_directory_inside_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("repos");
        std::fs::create_dir_all(root.join("app")).unwrap();

        let target = TargetDir::resolve(&root.join("app"), &root).unwrap();
        assert_eq!(target.path(), root.join("app"));
    }

    #[test]
    fn test_rejects_outside_root() {
        let err = TargetDir::resolve(Path::new("./elsewhere/app"), Path::new("./repos")).unwrap_err();
        assert!(matches!(err, TargetError::OutsideAllowedRoot { .. }));

        // String prefix is not enough
        let err = TargetDir::resolve(Path::new("./repos-evil/app"), Path::new("./repos")).unwrap_err();
        assert!(matches!(err, TargetError::OutsideAllowedRoot { .. }));
    }

    #[test]
    fn test_rejects_parent_traversal() {
        let err = TargetDir::resolve(Path::new("./repos/../etc"), Path::new("./repos")).unwrap_err();
        assert_eq!(err, TargetError::ParentTraversal("./repos/../etc".to_string()));
    }

    #[test]
    fn test_rejects_missing_and_file_paths() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("repos");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("file.txt"), "x").unwrap();

        let err = TargetDir::resolve(&root.join("missing"), &root).unwrap_err();
        assert!(matches!(err, TargetError::NotFound(_)));

        let err = TargetDir::resolve(&root.join("file.txt"), &root).unwrap_err();
        assert!(matches!(err, TargetError::NotADirectory(_)));
    }
}
