//! # schemata CLI entry point
//!
//! Parses arguments, installs the tracing subscriber and runs the check.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use schemata_cli::check::{run_check, CheckArgs};

/// Exit code when the run itself failed.
const EXIT_ERROR: u8 = 2;

/// Validate a data document against a JSON-Schema-like document.
#[derive(Parser, Debug)]
#[command(name = "schemata", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// Ignored when RUST_LOG is set.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    check: CheckArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run_check(&cli.check) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
