//! # Verification Report
//!
//! Discrepancies are accumulated as [`Failure`] values, in the order they
//! were found: header checks first, then records by index, then the two
//! aggregates. A run reports every discrepancy it finds; it never stops at
//! the first one.
//!
//! Computed keyed digests are never included in a failure. Printing the
//! correct HMAC next to a forged one would let anyone holding the report
//! re-seal a tampered manifest.

use std::fmt;

use serde::Serialize;

/// The category of a discrepancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    UnsupportedAlgorithm,
    KeyIdMismatch,
    UnsignedRejected,
    MissingKey,
    RecordCanonicalMismatch,
    RecordDigestMismatch,
    RecordKeyedDigestMismatch,
    RecordKeyedDigestMissing,
    MasterDigestMismatch,
    MasterKeyedDigestMismatch,
    MasterKeyedDigestMissing,
}

impl FailureKind {
    /// Returns the kind identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedAlgorithm => "UnsupportedAlgorithm",
            Self::KeyIdMismatch => "KeyIdMismatch",
            Self::UnsignedRejected => "UnsignedRejected",
            Self::MissingKey => "MissingKey",
            Self::RecordCanonicalMismatch => "RecordCanonicalMismatch",
            Self::RecordDigestMismatch => "RecordDigestMismatch",
            Self::RecordKeyedDigestMismatch => "RecordKeyedDigestMismatch",
            Self::RecordKeyedDigestMissing => "RecordKeyedDigestMissing",
            Self::MasterDigestMismatch => "MasterDigestMismatch",
            Self::MasterKeyedDigestMismatch => "MasterKeyedDigestMismatch",
            Self::MasterKeyedDigestMissing => "MasterKeyedDigestMissing",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discrepancy between a manifest and its recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Failure {
    /// `header.algorithm` is not `HMAC-SHA256`. Terminal for the run.
    UnsupportedAlgorithm { found: String },

    /// Caller-expected key ID and `header.keyId` are both set and differ.
    KeyIdMismatch { expected: String, found: String },

    /// The caller requires a signed manifest and `header.signed` is false.
    UnsignedRejected,

    /// The manifest is signed but no usable key was supplied.
    MissingKey { reason: String },

    /// Stored `recordCanonical` differs from the recomputed string.
    RecordCanonicalMismatch {
        index: usize,
        stored: String,
        computed: String,
    },

    /// Stored `recordCanonicalDigest` differs from the recomputed SHA-256.
    RecordDigestMismatch {
        index: usize,
        stored: String,
        computed: String,
    },

    /// Stored `recordKeyedDigest` differs from the recomputed HMAC.
    RecordKeyedDigestMismatch { index: usize, stored: String },

    /// A signed manifest has a record without `recordKeyedDigest`.
    RecordKeyedDigestMissing { index: usize },

    /// `header.masterDigest` differs from the recomputed chain digest.
    MasterDigestMismatch { stored: String, computed: String },

    /// `header.masterKeyedDigest` differs from the recomputed chain HMAC.
    MasterKeyedDigestMismatch { stored: String },

    /// A signed manifest has no `header.masterKeyedDigest`.
    MasterKeyedDigestMissing,
}

impl Failure {
    /// The category of this failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::UnsupportedAlgorithm { .. } => FailureKind::UnsupportedAlgorithm,
            Self::KeyIdMismatch { .. } => FailureKind::KeyIdMismatch,
            Self::UnsignedRejected => FailureKind::UnsignedRejected,
            Self::MissingKey { .. } => FailureKind::MissingKey,
            Self::RecordCanonicalMismatch { .. } => FailureKind::RecordCanonicalMismatch,
            Self::RecordDigestMismatch { .. } => FailureKind::RecordDigestMismatch,
            Self::RecordKeyedDigestMismatch { .. } => FailureKind::RecordKeyedDigestMismatch,
            Self::RecordKeyedDigestMissing { .. } => FailureKind::RecordKeyedDigestMissing,
            Self::MasterDigestMismatch { .. } => FailureKind::MasterDigestMismatch,
            Self::MasterKeyedDigestMismatch { .. } => FailureKind::MasterKeyedDigestMismatch,
            Self::MasterKeyedDigestMissing => FailureKind::MasterKeyedDigestMissing,
        }
    }

    /// The offending record index, for per-record failures.
    pub fn record_index(&self) -> Option<usize> {
        match self {
            Self::RecordCanonicalMismatch { index, .. }
            | Self::RecordDigestMismatch { index, .. }
            | Self::RecordKeyedDigestMismatch { index, .. }
            | Self::RecordKeyedDigestMissing { index } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedAlgorithm { found } => write!(
                f,
                "header.algorithm: unsupported algorithm '{found}' (expected {})",
                custody_core::SUPPORTED_ALGORITHM
            ),
            Self::KeyIdMismatch { expected, found } => write!(
                f,
                "header.keyId: key id mismatch (expected '{expected}', manifest has '{found}')"
            ),
            Self::UnsignedRejected => {
                f.write_str("header.signed: manifest is unsigned but a signed manifest is required")
            }
            Self::MissingKey { reason } => write!(
                f,
                "key: manifest is signed but no usable key material is available ({reason}); \
                 keyed checks skipped"
            ),
            Self::RecordCanonicalMismatch {
                index,
                stored,
                computed,
            } => write!(
                f,
                "records[{index}].recordCanonical: stored canonical string does not match \
                 recomputed (stored '{stored}', computed '{computed}')"
            ),
            Self::RecordDigestMismatch {
                index,
                stored,
                computed,
            } => write!(
                f,
                "records[{index}].recordCanonicalDigest: digest mismatch \
                 (stored {stored}, computed {computed})"
            ),
            Self::RecordKeyedDigestMismatch { index, stored } => write!(
                f,
                "records[{index}].recordKeyedDigest: keyed digest mismatch (stored {stored})"
            ),
            Self::RecordKeyedDigestMissing { index } => write!(
                f,
                "records[{index}].recordKeyedDigest: missing from signed manifest"
            ),
            Self::MasterDigestMismatch { stored, computed } => write!(
                f,
                "header.masterDigest: digest mismatch (stored {stored}, computed {computed})"
            ),
            Self::MasterKeyedDigestMismatch { stored } => write!(
                f,
                "header.masterKeyedDigest: keyed digest mismatch (stored {stored})"
            ),
            Self::MasterKeyedDigestMissing => {
                f.write_str("header.masterKeyedDigest: missing from signed manifest")
            }
        }
    }
}

/// The outcome of one verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    /// True iff `failures` is empty.
    pub pass: bool,
    /// `header.signed` as declared by the manifest.
    pub signed: bool,
    /// Number of records in the manifest.
    pub record_count: usize,
    /// Number of entries in `failures`.
    pub failure_count: usize,
    /// Every discrepancy found, in discovery order.
    pub failures: Vec<Failure>,
}

impl VerificationReport {
    /// Build a report; `pass` and `failure_count` are derived.
    pub fn new(signed: bool, record_count: usize, failures: Vec<Failure>) -> Self {
        Self {
            pass: failures.is_empty(),
            signed,
            record_count,
            failure_count: failures.len(),
            failures,
        }
    }

    /// Number of failures of the given kind.
    pub fn count(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind() == kind).count()
    }

    /// Whether any failure of the given kind was reported.
    pub fn has(&self, kind: FailureKind) -> bool {
        self.count(kind) > 0
    }

    /// Sorted, de-duplicated indices of records with at least one failure.
    pub fn failing_records(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .failures
            .iter()
            .filter_map(Failure::record_index)
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// Human-readable rendering: a PASS/FAIL line, then one numbered line per
    /// failure.
    pub fn render_text(&self) -> String {
        let signed = if self.signed { "signed" } else { "unsigned" };
        let mut out = if self.pass {
            format!(
                "PASS: manifest verified ({} records, {signed})\n",
                self.record_count
            )
        } else {
            format!(
                "FAIL: {} discrepancies found ({} records, {signed})\n",
                self.failure_count, self.record_count
            )
        };
        for (n, failure) in self.failures.iter().enumerate() {
            out.push_str(&format!("  {}. [{}] {failure}\n", n + 1, failure.kind()));
        }
        out
    }
}
