//! Analyzer settings.
//!
//! Settings are optional: every field has a default, and a YAML file only needs
//! the fields it changes.
//!
//! ```yaml
//! allowed_root: ./repos
//! output_file: analysis_result.json
//! excluded_paths:
//!   - "**/target/**"
//! migration:
//!   timeout_secs: 600
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default settings file names to search for.
pub const DEFAULT_SETTINGS_NAMES: &[&str] = &["reposcope.yaml", ".reposcope.yaml"];

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Top-level analyzer settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Only paths under this (relative) directory may be analyzed.
    pub allowed_root: PathBuf,
    /// Report file name, written inside the analyzed repository.
    pub output_file: String,
    /// Glob patterns (relative to the repository) excluded from scanning.
    pub excluded_paths: Vec<String>,
    pub migration: MigrationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allowed_root: PathBuf::from("./repos"),
            output_file: "analysis_result.json".to_string(),
            excluded_paths: Vec::new(),
            migration: MigrationSettings::default(),
        }
    }
}

/// Maven to Gradle migration settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct MigrationSettings {
    pub enabled: bool,
    /// Migration executable.
    pub command: String,
    pub args: Vec<String>,
    /// Legacy build descriptor looked up directly in the repository root.
    pub descriptor: String,
    /// File that must exist after a successful migration.
    pub artifact: String,
    pub timeout_secs: u64,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "gradle".to_string(),
            args: vec!["init".to_string(), "--type".to_string(), "pom".to_string()],
            descriptor: "pom.xml".to_string(),
            artifact: "build.gradle".to_string(),
            timeout_secs: 300,
        }
    }
}

impl Settings {
    /// Parse settings from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_str(&content).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parse settings from YAML text. Empty text yields the defaults.
    pub fn parse_str(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Look for a settings file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_SETTINGS_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Check settings for values the analyzer cannot work with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.output_file.trim().is_empty() {
            return Err(SettingsError::Invalid("output_file must not be empty".to_string()));
        }
        if Path::new(&self.output_file).components().count() != 1 {
            return Err(SettingsError::Invalid(format!(
                "output_file must be a plain file name, got {:?}",
                self.output_file
            )));
        }
        if self.allowed_root.as_os_str().is_empty() {
            return Err(SettingsError::Invalid("allowed_root must not be empty".to_string()));
        }
        crate::files::build_excludes(&self.excluded_paths)
            .map_err(|e| SettingsError::Invalid(format!("invalid excluded_paths glob: {}", e)))?;

        let m = &self.migration;
        for (field, value) in [
            ("migration.command", &m.command),
            ("migration.descriptor", &m.descriptor),
            ("migration.artifact", &m.artifact),
        ] {
            if value.trim().is_empty() {
                return Err(SettingsError::Invalid(format!("{} must not be empty", field)));
            }
        }
        if m.timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "migration.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.allowed_root, PathBuf::from("./repos"));
        assert_eq!(settings.output_file, "analysis_result.json");
        assert_eq!(settings.migration.command, "gradle");
        assert_eq!(settings.migration.args, vec!["init", "--type", "pom"]);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = Settings::parse_str(
            r#"
excluded_paths:
  - "**/target/**"
migration:
  timeout_secs: 30
"#,
        )
        .unwrap();

        assert_eq!(settings.excluded_paths, vec!["**/target/**"]);
        assert_eq!(settings.migration.timeout_secs, 30);
        assert_eq!(settings.migration.descriptor, "pom.xml");
        assert_eq!(settings.output_file, "analysis_result.json");
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Settings::parse_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_unknown_types_rejected() {
        assert!(Settings::parse_str("migration:\n  timeout_secs: soon\n").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.migration.timeout_secs = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.output_file = "../escape.json".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.excluded_paths = vec!["[".to_string()];
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.migration.command = " ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_discover_and_parse_file() {
        let temp = TempDir::new().unwrap();
        assert!(Settings::discover(temp.path()).is_none());

        let path = temp.path().join(".reposcope.yaml");
        std::fs::write(&path, "output_file: report.json\n").unwrap();

        let found = Settings::discover(temp.path()).unwrap();
        assert_eq!(found, path);
        assert_eq!(Settings::parse_file(&found).unwrap().output_file, "report.json");
    }

    #[test]
    fn test_parse_file_missing() {
        let err = Settings::parse_file("/nonexistent/reposcope.yaml").unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }
}
