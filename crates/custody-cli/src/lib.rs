//! # custody-cli: Custody Manifest CLI
//!
//! Provides the `custody` command-line interface over the verification
//! engine.
//!
//! ## Subcommands
//!
//! - `custody verify`: Recompute and check every claim in a manifest.
//! - `custody seal`: Fill in the claims for a list of records.
//! - `custody canonical`: Print canonical record strings and digests.
//!
//! ```bash
//! CUSTODY_MANIFEST_KEY=... custody verify manifest.json --expected-key-id prod-1 --require-signed
//! custody seal records.json --key-file /run/secrets/key --key-id prod-1 --out manifest.json
//! custody canonical manifest.json --index 3
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0    | Verification passed, or the command succeeded |
//! | 1    | Verification completed and reported failures |
//! | 2    | The manifest, config or key could not be read or parsed |

pub mod canonical;
pub mod config;
pub mod keys;
pub mod seal;
pub mod verify;

use clap::ValueEnum;

/// Verification passed.
pub const EXIT_PASS: u8 = 0;
/// Verification ran and found discrepancies.
pub const EXIT_FAILURES: u8 = 1;
/// No report could be produced.
pub const EXIT_ERROR: u8 = 2;

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}
