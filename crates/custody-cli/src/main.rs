//! # custody CLI entry point
//!
//! Parses command-line arguments, initialises logging, loads the optional
//! configuration file and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use custody_cli::canonical::{run_canonical, CanonicalArgs};
use custody_cli::config::CliConfig;
use custody_cli::seal::{run_seal, SealArgs};
use custody_cli::verify::{run_verify, VerifyArgs};
use custody_cli::EXIT_ERROR;

/// Custody manifest integrity tool.
///
/// Verifies that an audit manifest of evidence-file operations has not been
/// altered, reordered, extended or truncated since it was sealed.
#[derive(Parser, Debug)]
#[command(name = "custody", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify every per-record and aggregate digest in a manifest.
    Verify(VerifyArgs),

    /// Compute and fill in the digests for a list of records.
    Seal(SealArgs),

    /// Print canonical record strings and their SHA-256 digests.
    Canonical(CanonicalArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!("custody CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("ERROR: {e:#}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let result = match &cli.command {
        Commands::Verify(args) => run_verify(args, &config),
        Commands::Seal(args) => run_seal(args, &config),
        Commands::Canonical(args) => run_canonical(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("ERROR: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Logs go to stderr so stdout stays a clean report or manifest.
fn init_tracing(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
