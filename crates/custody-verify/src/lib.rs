//! # custody-verify: Manifest Verification and Sealing
//!
//! Orchestrates the canonicalizer, hasher and chain aggregator over a whole
//! manifest:
//!
//! - [`ManifestVerifier`] recomputes every per-record and aggregate claim
//!   and accumulates each discrepancy as a [`Failure`] in a
//!   [`VerificationReport`].
//! - [`seal_records`] fills in those claims for a fresh manifest.
//! - [`pool::hash_records`] spreads per-record hashing over scoped threads
//!   and returns results in record order.
//!
//! ## Crate Policy
//!
//! - Discrepancies are data, not errors. [`VerifyError`] is reserved for
//!   conditions under which no report can be built.
//! - Record order is authenticated. Nothing in this crate sorts records.
//! - Key material is never logged; computed keyed digests never appear in a
//!   report.

pub mod error;
pub mod pool;
pub mod report;
pub mod seal;
pub mod verifier;

pub use error::VerifyError;
pub use report::{Failure, FailureKind, VerificationReport};
pub use seal::{seal_envelope, seal_records, SealOptions};
pub use verifier::{verify_manifest, ManifestVerifier, VerifyOptions};
