//! Reposcope - static analysis for Spring repositories.
//!
//! Reposcope inspects one repository and produces a single JSON report with:
//! - every `.properties`/`.yml`/`.yaml` setting, flattened to dot-separated keys
//! - the REST endpoints declared on `@RestController` classes
//! - the outcome of migrating a Maven build to Gradle
//!
//! # Architecture
//!
//! - `config`: Config file discovery, parsing and flattening
//! - `parser`: Declaration trees from Java source (tree-sitter)
//! - `endpoints`: Controller detection and route annotation resolution
//! - `migrate`: Maven detection and the migration subprocess
//! - `analyzer`: Runs the steps and writes the report
//! - `report`: Report type and output formatting (JSON, pretty)
//! - `settings`: Optional YAML settings
//! - `target`: Command-line path validation

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod endpoints;
pub mod files;
pub mod migrate;
pub mod parser;
pub mod report;
pub mod settings;
pub mod target;

pub use analyzer::Analyzer;
pub use config::{ConfigAggregator, ConfigMap};
pub use endpoints::{Endpoint, EndpointExtractor, HttpMethod};
pub use migrate::{BuildMigrator, MigrationExecutor, MigrationOutcome, ProcessExecutor};
pub use parser::{JavaParser, SourceParser, SourceTree};
pub use report::AnalysisReport;
pub use settings::Settings;
pub use target::{TargetDir, TargetError};
