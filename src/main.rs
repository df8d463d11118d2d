//! Reposcope CLI entry point.

use clap::Parser;
use reposcope::cli::{self, Cli, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose, cli.quiet);

    let exit_code = match cli::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
