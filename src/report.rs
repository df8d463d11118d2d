//! Analysis report and output formatting.
//!
//! The JSON report is the external contract consumed downstream; its field
//! names (`config`, `endpoints`, `migrationResult`) must stay stable. The pretty
//! format is a colored terminal summary for humans.

use colored::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::ConfigMap;
use crate::endpoints::{Endpoint, HttpMethod};
use crate::migrate::MigrationOutcome;

/// Combined result of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub config: ConfigMap,
    pub endpoints: Vec<Endpoint>,
    #[serde(rename = "migrationResult")]
    pub migration: MigrationOutcome,
}

impl AnalysisReport {
    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Write the report to `path`, replacing any existing file.
pub fn write_json(report: &AnalysisReport, path: &Path) -> anyhow::Result<()> {
    let json = report.to_json()?;
    fs::write(path, json)?;
    Ok(())
}

/// Print the report as JSON to stdout.
pub fn print_json(report: &AnalysisReport) -> anyhow::Result<()> {
    println!("{}", report.to_json()?);
    Ok(())
}

/// Print a colored human-readable summary to stdout.
pub fn write_pretty(repo: &str, report: &AnalysisReport, output: Option<&Path>) {
    println!();
    println!("{} {}", "reposcope".bold(), repo);
    println!();

    println!("{} ({} keys)", "Configuration".bold(), report.config.len());
    for (key, value) in &report.config {
        let shown = value.as_deref().unwrap_or("null");
        println!("  {} = {}", key.cyan(), shown);
    }
    println!();

    println!("{} ({})", "Endpoints".bold(), report.endpoints.len());
    if report.endpoints.is_empty() {
        println!("  {}", "none found".dimmed());
    }
    for e in &report.endpoints {
        println!(
            "  {:<8} {:<30} {}.{}",
            color_method(e.http_method),
            e.path,
            e.class_name.dimmed(),
            e.method_name
        );
    }
    println!();

    let m = &report.migration;
    let status = if !m.was_legacy_build {
        "SKIPPED".dimmed()
    } else if m.migration_succeeded {
        "OK".green().bold()
    } else {
        "FAILED".red().bold()
    };
    println!("{} {} {}", "Migration".bold(), status, m.message);

    if let Some(path) = output {
        println!();
        println!("Results written to {}", path.display());
    }
}

fn color_method(method: HttpMethod) -> ColoredString {
    let label = method.as_str();
    match method {
        HttpMethod::Get => label.green(),
        HttpMethod::Post => label.yellow(),
        HttpMethod::Put | HttpMethod::Patch => label.blue(),
        HttpMethod::Delete => label.red(),
        HttpMethod::Request => label.magenta(),
    }
}
