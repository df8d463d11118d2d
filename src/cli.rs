//! Command-line interface for reposcope.

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::analyzer::Analyzer;
use crate::report;
use crate::settings::Settings;
use crate::target::TargetDir;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Analyze a Spring repository: aggregate config, find REST endpoints,
/// and migrate a Maven build to Gradle.
///
/// Results are written as JSON inside the analyzed repository.
#[derive(Parser, Debug)]
#[command(name = "reposcope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository to analyze (must be inside the allowed root)
    pub path: PathBuf,

    /// Path to settings YAML file (default: auto-discover)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Allowed parent directory for analyzed repositories
    #[arg(long)]
    pub allowed_root: Option<PathBuf>,

    /// Report file name written inside the repository
    #[arg(short, long)]
    pub output: Option<String>,

    /// Stdout format: pretty, json, or none
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Migration command timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Detect Maven builds but do not run the migration command
    #[arg(long)]
    pub skip_migration: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Initialize the logger. `RUST_LOG` takes precedence over the flags.
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

/// Load settings from an explicit path or by discovery in the working directory.
fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => Settings::discover(&std::env::current_dir()?),
    };

    match path {
        Some(p) => {
            let settings = Settings::parse_file(&p)?;
            log::debug!("Loaded settings from {}", p.display());
            Ok(settings)
        }
        None => Ok(Settings::default()),
    }
}

/// Apply command-line overrides on top of file settings.
pub fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(root) = &cli.allowed_root {
        settings.allowed_root = root.clone();
    }
    if let Some(output) = &cli.output {
        settings.output_file = output.clone();
    }
    if let Some(timeout) = cli.timeout {
        settings.migration.timeout_secs = timeout;
    }
    if cli.skip_migration {
        settings.migration.enabled = false;
    }
    settings
}

/// Run the analysis.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    // Validate format
    if !matches!(cli.format.as_str(), "pretty" | "json" | "none") {
        log::error!(
            "invalid format {:?}, must be 'pretty', 'json', or 'none'",
            cli.format
        );
        return Ok(EXIT_ERROR);
    }

    let settings = match load_settings(cli.settings.as_deref()) {
        Ok(s) => apply_overrides(s, cli),
        Err(e) => {
            log::error!("Error loading settings: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let target = match TargetDir::resolve(&cli.path, &settings.allowed_root) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let analyzer = match Analyzer::new(settings) {
        Ok(a) => a,
        Err(e) => {
            log::error!("Error: invalid settings: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let (result, written) = analyzer.run(target.path());

    match cli.format.as_str() {
        "json" => report::print_json(&result)?,
        "pretty" => report::write_pretty(
            &cli.path.to_string_lossy(),
            &result,
            written.as_ref().ok().map(PathBuf::as_path),
        ),
        _ => {}
    }

    match written {
        Ok(_) => Ok(EXIT_SUCCESS),
        Err(_) => Ok(EXIT_FAILED),
    }
}
