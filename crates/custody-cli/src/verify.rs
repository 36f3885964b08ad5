//! # Verify CLI: Check a sealed manifest.
//!
//! ```bash
//! custody verify manifest.json --expected-key-id prod-1 --require-signed
//! custody verify manifest.json --key-file key.b64 --key-base64 --format json
//! ```
//!
//! Prints a `PASS:`/`FAIL:` line followed by every failure, or the report
//! as JSON. Exits 0 on pass and 1 on any failure.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use custody_verify::{ManifestVerifier, VerificationReport, VerifyOptions};

use crate::config::CliConfig;
use crate::keys::KeyArgs;
use crate::{OutputFormat, EXIT_FAILURES, EXIT_PASS};

/// Arguments for `custody verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the manifest JSON file.
    pub manifest: PathBuf,

    /// Key ID the manifest must declare, if it declares one.
    #[arg(long)]
    pub expected_key_id: Option<String>,

    /// Fail if the manifest is not signed.
    #[arg(long)]
    pub require_signed: bool,

    #[command(flatten)]
    pub key: KeyArgs,

    /// Number of hashing threads.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute `custody verify`.
pub fn run_verify(args: &VerifyArgs, config: &CliConfig) -> Result<u8> {
    let key = args.key.source(config).load()?;
    let options = VerifyOptions {
        expected_key_id: args
            .expected_key_id
            .clone()
            .or_else(|| config.expected_key_id.clone()),
        require_signed: args.require_signed || config.require_signed,
        key,
        workers: args.workers.unwrap_or_else(|| config.workers()),
    };
    tracing::debug!(
        manifest = %args.manifest.display(),
        key_supplied = options.key.is_some(),
        "starting verification"
    );

    let report = ManifestVerifier::new(options)
        .verify_path(&args.manifest)
        .with_context(|| format!("cannot verify {}", args.manifest.display()))?;

    print!("{}", render(&report, args.format)?);
    Ok(exit_code(&report))
}

/// Render a report in the requested format.
pub fn render(report: &VerificationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report.render_text()),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(report)?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// Exit code for a completed verification.
pub fn exit_code(report: &VerificationReport) -> u8 {
    if report.pass {
        EXIT_PASS
    } else {
        EXIT_FAILURES
    }
}
