//! # Seal CLI: Fill in manifest claims.
//!
//! Takes either a bare JSON array of records or a full envelope and writes
//! a sealed envelope. Records keep their input order.
//!
//! ```bash
//! custody seal records.json --key-file key --key-id prod-1 --out manifest.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use custody_core::{ManifestEnvelope, ManifestRecord};
use custody_verify::{seal_envelope, seal_records, SealOptions};

use crate::config::CliConfig;
use crate::keys::KeyArgs;
use crate::EXIT_PASS;

/// Arguments for `custody seal`.
#[derive(Args, Debug)]
pub struct SealArgs {
    /// Records (JSON array) or an existing manifest envelope.
    pub input: PathBuf,

    /// Write the sealed manifest here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Key label to record in the header.
    #[arg(long)]
    pub key_id: Option<String>,

    /// Seal without a key even if one is configured.
    #[arg(long)]
    pub unsigned: bool,

    #[command(flatten)]
    pub key: KeyArgs,

    /// Number of hashing threads.
    #[arg(long)]
    pub workers: Option<usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SealInput {
    Records(Vec<ManifestRecord>),
    Envelope(ManifestEnvelope),
}

/// Execute `custody seal`.
pub fn run_seal(args: &SealArgs, config: &CliConfig) -> Result<u8> {
    let key = if args.unsigned {
        None
    } else {
        args.key.source(config).load()?
    };
    if key.is_none() && !args.unsigned {
        tracing::warn!("no key material found; sealing an unsigned manifest");
    }

    let options = SealOptions {
        key,
        key_id: args.key_id.clone(),
        workers: args.workers.unwrap_or_else(|| config.workers()),
    };

    let envelope = match read_input(&args.input)? {
        SealInput::Records(records) => seal_records(records, &options),
        SealInput::Envelope(envelope) => seal_envelope(envelope, &options),
    }
    .with_context(|| format!("cannot seal {}", args.input.display()))?;

    let mut json = envelope.to_json_pretty()?;
    json.push('\n');

    match &args.out {
        Some(out) => {
            std::fs::write(out, json.as_bytes())
                .with_context(|| format!("failed to write manifest: {}", out.display()))?;
            let (records, signed) = summary(&envelope);
            println!(
                "OK: sealed {records} records ({}) -> {}",
                if signed { "signed" } else { "unsigned" },
                out.display()
            );
        }
        None => print!("{json}"),
    }
    Ok(EXIT_PASS)
}

fn read_input(path: &Path) -> Result<SealInput> {
    let content = std::fs::read(path)
        .with_context(|| format!("failed to read input: {}", path.display()))?;
    serde_json::from_slice(&content)
        .with_context(|| format!("{} is neither a record array nor a manifest", path.display()))
}

fn summary(envelope: &ManifestEnvelope) -> (usize, bool) {
    let records = envelope.records.as_ref().map_or(0, Vec::len);
    let signed = envelope.header.as_ref().is_some_and(|h| h.signed);
    (records, signed)
}
