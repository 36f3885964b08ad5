//! # Canonical CLI: Show what gets hashed.
//!
//! Prints each record's canonical string with its SHA-256, so an
//! investigator can diff the recomputed string against a record's stored
//! `recordCanonical`.
//!
//! ```bash
//! custody canonical manifest.json --index 1
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use custody_core::{sha256_digest, CanonicalRecord, ManifestEnvelope, StructuralError};

use crate::{OutputFormat, EXIT_PASS};

/// Arguments for `custody canonical`.
#[derive(Args, Debug)]
pub struct CanonicalArgs {
    /// Path to the manifest JSON file.
    pub manifest: PathBuf,

    /// Only show the record at this zero-based index.
    #[arg(long)]
    pub index: Option<usize>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// One previewed record.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CanonicalEntry {
    pub index: usize,
    pub canonical: String,
    pub digest: String,
}

/// Execute `custody canonical`.
pub fn run_canonical(args: &CanonicalArgs) -> Result<u8> {
    let bytes = std::fs::read(&args.manifest)
        .with_context(|| format!("failed to read manifest: {}", args.manifest.display()))?;
    let envelope = ManifestEnvelope::from_json(&bytes)
        .with_context(|| format!("invalid manifest: {}", args.manifest.display()))?;

    let entries = preview(&envelope, args.index)?;
    match args.format {
        OutputFormat::Text => {
            for entry in &entries {
                println!("[{}] sha256={}", entry.index, entry.digest);
                println!("    {}", entry.canonical);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
    }
    Ok(EXIT_PASS)
}

/// Canonical strings and digests for all records, or just one.
pub fn preview(envelope: &ManifestEnvelope, index: Option<usize>) -> Result<Vec<CanonicalEntry>> {
    let records = envelope
        .records
        .as_deref()
        .ok_or(StructuralError::MissingRecords)?;

    let selected: Vec<usize> = match index {
        Some(i) if i >= records.len() => {
            bail!("record index {i} out of range ({} records)", records.len())
        }
        Some(i) => vec![i],
        None => (0..records.len()).collect(),
    };

    Ok(selected
        .into_iter()
        .map(|i| {
            let canonical = CanonicalRecord::new(&records[i]);
            CanonicalEntry {
                index: i,
                digest: sha256_digest(&canonical).to_hex(),
                canonical: canonical.into_string(),
            }
        })
        .collect())
}
