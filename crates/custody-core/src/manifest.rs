//! # Manifest Data Model
//!
//! The persisted unit is a [`ManifestEnvelope`]: a [`ManifestHeader`] with
//! aggregate metadata and an ordered list of [`ManifestRecord`] entries, one
//! per audited file operation. Keys are camelCase on the wire.
//!
//! `header` and `records` are modelled as `Option` so that an envelope with
//! either section missing still deserializes; [`ManifestEnvelope::parts()`]
//! turns that into a [`StructuralError`] before any check runs.

use serde::{Deserialize, Serialize};

use crate::error::{CustodyError, StructuralError};

/// The only keyed-hash algorithm family a manifest may declare.
pub const SUPPORTED_ALGORITHM: &str = "HMAC-SHA256";

/// A manifest as read from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEnvelope {
    /// Aggregate metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<ManifestHeader>,
    /// Audited operations, in authenticated order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<ManifestRecord>>,
}

impl ManifestEnvelope {
    /// Build an envelope from a header and its records.
    pub fn new(header: ManifestHeader, records: Vec<ManifestRecord>) -> Self {
        Self {
            header: Some(header),
            records: Some(records),
        }
    }

    /// Parse an envelope from JSON bytes.
    ///
    /// A missing `header` or `records` is not a parse error here; it is
    /// reported by [`parts()`](Self::parts).
    pub fn from_json(bytes: &[u8]) -> Result<Self, CustodyError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Render the envelope as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, CustodyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Borrow the header and records, failing if either is absent.
    ///
    /// The header is checked first, so an envelope missing both reports
    /// [`StructuralError::MissingHeader`].
    pub fn parts(&self) -> Result<(&ManifestHeader, &[ManifestRecord]), StructuralError> {
        let header = self.header.as_ref().ok_or(StructuralError::MissingHeader)?;
        let records = self
            .records
            .as_deref()
            .ok_or(StructuralError::MissingRecords)?;
        Ok((header, records))
    }
}

/// Aggregate metadata for a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestHeader {
    /// Keyed-hash algorithm family. Only [`SUPPORTED_ALGORITHM`] verifies.
    #[serde(default)]
    pub algorithm: Option<String>,
    /// Label of the key used for signing. Never used to derive key material.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Whether per-record and aggregate keyed digests are present.
    /// An absent field reads as `false`.
    #[serde(default)]
    pub signed: bool,
    /// SHA-256 over all canonical records joined by `\n`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_digest: Option<String>,
    /// HMAC-SHA256 over all per-record keyed digests joined by `\n`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_keyed_digest: Option<String>,
}

impl ManifestHeader {
    /// The declared algorithm, or the empty string when absent.
    pub fn algorithm_label(&self) -> &str {
        self.algorithm.as_deref().unwrap_or("")
    }

    /// True if the declared algorithm is [`SUPPORTED_ALGORITHM`].
    ///
    /// The comparison ignores ASCII case and surrounding whitespace, so
    /// `hmac-sha256` is accepted. Any other family is rejected.
    pub fn algorithm_supported(&self) -> bool {
        self.algorithm_label()
            .trim()
            .eq_ignore_ascii_case(SUPPORTED_ALGORITHM)
    }
}

/// One audited file-handling operation.
///
/// The first sixteen fields are the semantic content that gets
/// canonicalized. The last three are claims made by whoever sealed the
/// manifest; verification recomputes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestRecord {
    /// When the operation happened, as recorded by the producer.
    #[serde(default)]
    pub timestamp_utc: Option<String>,
    /// Storage provider the source file came from.
    #[serde(default)]
    pub source_provider: Option<String>,
    /// Operation name (copy, verify, quarantine, ...).
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub source_path: Option<String>,
    #[serde(default)]
    pub destination_path: Option<String>,
    /// Size of the file in bytes.
    #[serde(default)]
    pub bytes: Option<i64>,
    #[serde(default)]
    pub source_digest_hex: Option<String>,
    #[serde(default)]
    pub destination_digest_hex: Option<String>,
    #[serde(default)]
    pub verify_size: Option<bool>,
    #[serde(default)]
    pub verify_digest: Option<bool>,
    #[serde(default)]
    pub verify_structure: Option<bool>,
    /// Overall outcome of the post-copy verification.
    #[serde(default)]
    pub verify_ok: Option<bool>,
    /// Number of attempts the operation took.
    #[serde(default)]
    pub attempts: Option<i64>,
    #[serde(default)]
    pub retried: Option<bool>,
    /// Where the file was moved if it failed verification.
    #[serde(default)]
    pub quarantine_path: Option<String>,
    #[serde(default)]
    pub original_path: Option<String>,

    /// Claimed canonical string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_canonical: Option<String>,
    /// Claimed SHA-256 of the canonical string (hex).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_canonical_digest: Option<String>,
    /// Claimed HMAC-SHA256 of the canonical string (hex).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_keyed_digest: Option<String>,
}

impl ManifestRecord {
    /// Drop the three stored claims, leaving only semantic content.
    pub fn without_claims(mut self) -> Self {
        self.record_canonical = None;
        self.record_canonical_digest = None;
        self.record_keyed_digest = None;
        self
    }
}

/// Normalise an optional stored claim: trimmed, and `None` if empty.
///
/// Used for digest-valued fields, where an empty string means "not
/// provided".
pub fn claim(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
