//! Analysis orchestration: config, endpoints and migration for one repository.

use std::path::{Path, PathBuf};

use globset::GlobSet;

use crate::config::ConfigAggregator;
use crate::endpoints::EndpointExtractor;
use crate::files;
use crate::migrate::{BuildMigrator, MigrationExecutor, ProcessExecutor};
use crate::parser::{JavaParser, SourceParser};
use crate::report::{self, AnalysisReport};
use crate::settings::{Settings, SettingsError};

/// Runs the three analysis steps against a repository and writes the report.
pub struct Analyzer {
    settings: Settings,
    aggregator: ConfigAggregator,
    extractor: EndpointExtractor,
    migrator: BuildMigrator,
}

impl Analyzer {
    /// Create an analyzer with the Java parser and the real migration command.
    pub fn new(settings: Settings) -> Result<Self, SettingsError> {
        Self::with_collaborators(settings, Box::new(JavaParser::new()), Box::new(ProcessExecutor))
    }

    /// Create an analyzer with custom parser and executor collaborators.
    pub fn with_collaborators(
        settings: Settings,
        parser: Box<dyn SourceParser>,
        executor: Box<dyn MigrationExecutor>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let excludes = exclude_set(&settings)?;

        Ok(Self {
            aggregator: ConfigAggregator::new().excludes(excludes.clone()),
            extractor: EndpointExtractor::with_parser(parser).excludes(excludes),
            migrator: BuildMigrator::with_executor(settings.migration.clone(), executor),
            settings,
        })
    }

    /// Where the report for `root` is written.
    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.settings.output_file)
    }

    /// Run all steps and assemble the report. Nothing is written.
    ///
    /// The steps share no data; per-file failures are absorbed by each step and
    /// migration failures are recorded in the report.
    pub fn analyze(&self, root: &Path) -> AnalysisReport {
        log::info!("Analyzing {}", root.display());

        let config = self.aggregator.aggregate(root);
        let endpoints = self.extractor.extract(root);
        let migration = self.migrator.migrate(root);

        AnalysisReport {
            config,
            endpoints,
            migration,
        }
    }

    /// Analyze `root` and write the JSON report inside it.
    ///
    /// The report is returned even if writing fails; the error is returned
    /// alongside so the caller can signal failure.
    pub fn run(&self, root: &Path) -> (AnalysisReport, anyhow::Result<PathBuf>) {
        let report = self.analyze(root);
        let output = self.output_path(root);

        let written = match report::write_json(&report, &output) {
            Ok(()) => {
                log::info!("Analysis complete. Results written to {}", output.display());
                Ok(output)
            }
            Err(e) => {
                log::error!("Failed to write analysis result to {}: {}", output.display(), e);
                Err(e)
            }
        };
        (report, written)
    }
}

fn exclude_set(settings: &Settings) -> Result<GlobSet, SettingsError> {
    files::build_excludes(&settings.excluded_paths)
        .map_err(|e| SettingsError::Invalid(format!("invalid excluded_paths glob: {}", e)))
}
