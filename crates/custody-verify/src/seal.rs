//! # Manifest Sealing
//!
//! The generation-side counterpart of verification: fills in every claim a
//! verifier will later recompute. Sealing and verification share the
//! canonicalizer, hasher and aggregator, so a manifest sealed under a key
//! verifies cleanly under the same key.

use custody_core::{ManifestEnvelope, ManifestHeader, ManifestRecord, SUPPORTED_ALGORITHM};
use custody_crypto::{ChainAggregator, KeyMaterial, RecordHasher};

use crate::error::VerifyError;
use crate::pool;

/// Settings for sealing a manifest.
#[derive(Debug)]
pub struct SealOptions {
    /// Signing key. `None` produces an unsigned manifest.
    pub key: Option<KeyMaterial>,
    /// Label written to `header.keyId`.
    pub key_id: Option<String>,
    /// Hashing threads.
    pub workers: usize,
}

impl Default for SealOptions {
    fn default() -> Self {
        Self {
            key: None,
            key_id: None,
            workers: 1,
        }
    }
}

/// Seal records, in the order given, into a new envelope.
///
/// Existing claim fields are overwritten.
///
/// # Errors
///
/// [`VerifyError::Key`] if the key cannot be resolved. Unlike verification,
/// sealing with an unusable key is an error rather than a downgrade to an
/// unsigned manifest.
pub fn seal_records(
    records: Vec<ManifestRecord>,
    options: &SealOptions,
) -> Result<ManifestEnvelope, VerifyError> {
    let hasher = match &options.key {
        Some(material) => {
            let key = material.resolve()?;
            RecordHasher::new(Some(&key))?
        }
        None => RecordHasher::unkeyed(),
    };

    let digests = pool::hash_records(&hasher, &records, options.workers);
    let chain = ChainAggregator::new(&hasher).aggregate(&digests);

    let sealed: Vec<ManifestRecord> = records
        .into_iter()
        .zip(digests)
        .map(|(record, computed)| ManifestRecord {
            record_canonical_digest: Some(computed.digest.to_hex()),
            record_keyed_digest: computed.keyed_digest.map(|d| d.to_hex()),
            record_canonical: Some(computed.canonical.into_string()),
            ..record
        })
        .collect();

    let header = ManifestHeader {
        algorithm: Some(SUPPORTED_ALGORITHM.to_string()),
        key_id: options.key_id.clone(),
        signed: hasher.is_keyed(),
        master_digest: Some(chain.master_digest.to_hex()),
        master_keyed_digest: chain.master_keyed_digest.map(|d| d.to_hex()),
    };
    tracing::info!(
        records = sealed.len(),
        signed = header.signed,
        "sealed manifest"
    );
    Ok(ManifestEnvelope::new(header, sealed))
}

/// Re-seal an existing envelope's records. Its header is replaced.
///
/// A missing records collection is a structural error; a missing header is
/// not, since sealing writes a fresh one.
pub fn seal_envelope(
    envelope: ManifestEnvelope,
    options: &SealOptions,
) -> Result<ManifestEnvelope, VerifyError> {
    let records = envelope
        .records
        .ok_or(custody_core::StructuralError::MissingRecords)?;
    seal_records(records, options)
}
