//! Maven to Gradle build migration.
//!
//! If the repository root holds a `pom.xml`, the migration command
//! (`gradle init --type pom` by default) is run inside it. The migration counts
//! as successful only if the command exits with status 0 and `build.gradle`
//! exists afterwards. Every failure is reported in the outcome, never raised.

mod executor;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use executor::{ExecError, MigrationExecutor, ProcessExecutor, SIGNALED_EXIT_CODE};

use crate::settings::MigrationSettings;

/// Result of the build migration step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationOutcome {
    /// Whether the legacy build descriptor was present.
    #[serde(rename = "wasMaven")]
    pub was_legacy_build: bool,
    #[serde(rename = "migrationSuccess")]
    pub migration_succeeded: bool,
    pub message: String,
}

impl MigrationOutcome {
    pub fn not_detected() -> Self {
        Self {
            was_legacy_build: false,
            migration_succeeded: false,
            message: "Not a Maven project".to_string(),
        }
    }

    pub fn succeeded() -> Self {
        Self {
            was_legacy_build: true,
            migration_succeeded: true,
            message: "Migration successful".to_string(),
        }
    }

    pub fn exit_failure(code: i32) -> Self {
        Self {
            was_legacy_build: true,
            migration_succeeded: false,
            message: format!("Migration failed. Exit code: {}", code),
        }
    }

    pub fn error(cause: &str) -> Self {
        Self {
            was_legacy_build: true,
            migration_succeeded: false,
            message: format!("Migration failed: {}", cause),
        }
    }
}

/// Detects a legacy build and runs the migration command.
pub struct BuildMigrator {
    settings: MigrationSettings,
    executor: Box<dyn MigrationExecutor>,
}

impl BuildMigrator {
    /// Create a migrator that runs the real command.
    pub fn new(settings: MigrationSettings) -> Self {
        Self::with_executor(settings, Box::new(ProcessExecutor))
    }

    /// Create a migrator with a custom executor.
    pub fn with_executor(settings: MigrationSettings, executor: Box<dyn MigrationExecutor>) -> Self {
        Self { settings, executor }
    }

    /// Check whether the legacy build descriptor sits directly in `root`.
    pub fn is_legacy_build(&self, root: &Path) -> bool {
        root.join(&self.settings.descriptor).is_file()
    }

    /// Migrate the repository at `root` if it is a legacy build.
    pub fn migrate(&self, root: &Path) -> MigrationOutcome {
        if !self.is_legacy_build(root) {
            log::info!(
                "No {} found in {}. Not a Maven project.",
                self.settings.descriptor,
                root.display()
            );
            return MigrationOutcome::not_detected();
        }

        if !self.settings.enabled {
            log::info!("Migration disabled; skipping {}", root.display());
            return MigrationOutcome::error("migration disabled");
        }

        log::info!(
            "Detected Maven project at {}. Running {} {}",
            root.display(),
            self.settings.command,
            self.settings.args.join(" ")
        );

        let timeout = Duration::from_secs(self.settings.timeout_secs);
        let exit_code = match self
            .executor
            .run(root, &self.settings.command, &self.settings.args, timeout)
        {
            Ok(code) => code,
            Err(e) => {
                log::error!("Migration for {} failed: {}", root.display(), e);
                return MigrationOutcome::error(&e.to_string());
            }
        };

        if exit_code == 0 && root.join(&self.settings.artifact).is_file() {
            log::info!("Migration to Gradle successful for {}", root.display());
            MigrationOutcome::succeeded()
        } else {
            log::error!(
                "Migration to Gradle failed for {}. Exit code: {}",
                root.display(),
                exit_code
            );
            MigrationOutcome::exit_failure(exit_code)
        }
    }
}
