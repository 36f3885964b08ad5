//! # Manifest Verifier
//!
//! Recomputes every claim in a manifest and compares it with what is
//! stored. The run order is fixed:
//!
//! 1. Envelope shape (`header` and `records` present). Terminal `Err`.
//! 2. Algorithm. An unsupported family ends the run with a single
//!    [`Failure::UnsupportedAlgorithm`].
//! 3. Key ID compatibility.
//! 4. Signed-manifest requirement.
//! 5. Key resolution, only for signed manifests. Failure to resolve is
//!    reported and keyed checks are skipped; unkeyed checks still run.
//! 6. Per-record canonical string, digest and keyed digest, in record order.
//! 7. Master digest, then master keyed digest for signed manifests.
//!
//! Nothing after step 2 short-circuits: a run reports every discrepancy.
//!
//! ## Security Invariant
//!
//! Key bytes exist only inside the [`RecordHasher`] for the duration of
//! [`ManifestVerifier::verify`]. They are never logged and computed keyed
//! digests never appear in failures.

use std::path::Path;

use tracing::{debug, info, warn};

use custody_core::{claim, ManifestEnvelope, ManifestHeader, ManifestRecord};
use custody_crypto::{
    digest_matches, text_matches, ChainAggregator, ChainDigests, KeyMaterial, RecordDigests,
    RecordHasher,
};

use crate::error::VerifyError;
use crate::pool;
use crate::report::{Failure, VerificationReport};

/// Caller-side verification settings.
#[derive(Debug)]
pub struct VerifyOptions {
    /// Key label the caller expects. Empty or `None` disables the check.
    pub expected_key_id: Option<String>,
    /// Reject manifests whose header says `signed: false`.
    pub require_signed: bool,
    /// HMAC key for signed manifests.
    pub key: Option<KeyMaterial>,
    /// Hashing threads; `1` hashes on the calling thread.
    pub workers: usize,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            expected_key_id: None,
            require_signed: false,
            key: None,
            workers: 1,
        }
    }
}

/// Verifies manifests against one set of options.
#[derive(Debug, Default)]
pub struct ManifestVerifier {
    options: VerifyOptions,
}

impl ManifestVerifier {
    pub fn new(options: VerifyOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Verify a parsed envelope.
    ///
    /// # Errors
    ///
    /// Only [`VerifyError::Custody`] for a missing header or records
    /// collection. Every other problem is a [`Failure`] in the report.
    pub fn verify(&self, envelope: &ManifestEnvelope) -> Result<VerificationReport, VerifyError> {
        let (header, records) = envelope.parts()?;
        let signed = header.signed;
        debug!(
            records = records.len(),
            signed,
            require_signed = self.options.require_signed,
            workers = self.options.workers,
            "verifying manifest"
        );

        if !header.algorithm_supported() {
            let failure = Failure::UnsupportedAlgorithm {
                found: header.algorithm_label().to_string(),
            };
            warn!("{failure}");
            return Ok(VerificationReport::new(signed, records.len(), vec![failure]));
        }

        let mut failures = Vec::new();
        self.check_key_id(header, &mut failures);

        if !signed && self.options.require_signed {
            failures.push(Failure::UnsignedRejected);
        }

        let hasher = if signed {
            self.signing_hasher(&mut failures)
        } else {
            RecordHasher::unkeyed()
        };

        let digests = pool::hash_records(&hasher, records, self.options.workers);
        for (index, (record, computed)) in records.iter().zip(&digests).enumerate() {
            check_record(index, record, computed, signed, &mut failures);
        }

        let chain = ChainAggregator::new(&hasher).aggregate(&digests);
        check_master(header, &chain, signed, &mut failures);

        for failure in &failures {
            debug!(kind = %failure.kind(), "{failure}");
        }
        let report = VerificationReport::new(signed, records.len(), failures);
        if report.pass {
            info!(records = report.record_count, signed, "manifest verified");
        } else {
            warn!(
                failures = report.failure_count,
                records = report.record_count,
                "manifest failed verification"
            );
        }
        Ok(report)
    }

    /// Parse JSON bytes and verify.
    pub fn verify_json(&self, bytes: &[u8]) -> Result<VerificationReport, VerifyError> {
        let envelope = ManifestEnvelope::from_json(bytes)?;
        self.verify(&envelope)
    }

    /// Read a manifest file and verify.
    pub fn verify_path(&self, path: &Path) -> Result<VerificationReport, VerifyError> {
        let bytes = std::fs::read(path).map_err(|source| VerifyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.verify_json(&bytes)
    }

    fn check_key_id(&self, header: &ManifestHeader, failures: &mut Vec<Failure>) {
        let expected = self.options.expected_key_id.as_deref().unwrap_or("");
        let found = header.key_id.as_deref().unwrap_or("");
        if !expected.is_empty() && !found.is_empty() && expected != found {
            failures.push(Failure::KeyIdMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
    }

    /// Resolve the configured key into a keyed hasher. On any failure the
    /// reason is recorded and an unkeyed hasher is returned.
    fn signing_hasher(&self, failures: &mut Vec<Failure>) -> RecordHasher {
        let Some(material) = self.options.key.as_ref() else {
            failures.push(Failure::MissingKey {
                reason: "no key material supplied".to_string(),
            });
            return RecordHasher::unkeyed();
        };
        let resolved = material
            .resolve()
            .and_then(|key| RecordHasher::new(Some(&key)));
        match resolved {
            Ok(hasher) => {
                debug!(encoding = %material.encoding(), "resolved signing key");
                hasher
            }
            Err(err) => {
                failures.push(Failure::MissingKey {
                    reason: err.to_string(),
                });
                RecordHasher::unkeyed()
            }
        }
    }
}

fn check_record(
    index: usize,
    record: &ManifestRecord,
    computed: &RecordDigests,
    signed: bool,
    failures: &mut Vec<Failure>,
) {
    if let Some(stored) = record.record_canonical.as_deref() {
        if !text_matches(stored, computed.canonical.as_str()) {
            failures.push(Failure::RecordCanonicalMismatch {
                index,
                stored: stored.to_string(),
                computed: computed.canonical.to_string(),
            });
        }
    }

    if let Some(stored) = claim(record.record_canonical_digest.as_deref()) {
        if !digest_matches(stored, &computed.digest) {
            failures.push(Failure::RecordDigestMismatch {
                index,
                stored: stored.to_string(),
                computed: computed.digest.to_hex(),
            });
        }
    }

    if !signed {
        return;
    }
    match claim(record.record_keyed_digest.as_deref()) {
        None => failures.push(Failure::RecordKeyedDigestMissing { index }),
        Some(stored) => {
            if let Some(keyed) = &computed.keyed_digest {
                if !digest_matches(stored, keyed) {
                    failures.push(Failure::RecordKeyedDigestMismatch {
                        index,
                        stored: stored.to_string(),
                    });
                }
            }
        }
    }
}

fn check_master(
    header: &ManifestHeader,
    chain: &ChainDigests,
    signed: bool,
    failures: &mut Vec<Failure>,
) {
    if let Some(stored) = claim(header.master_digest.as_deref()) {
        if !digest_matches(stored, &chain.master_digest) {
            failures.push(Failure::MasterDigestMismatch {
                stored: stored.to_string(),
                computed: chain.master_digest.to_hex(),
            });
        }
    }

    if !signed {
        return;
    }
    match claim(header.master_keyed_digest.as_deref()) {
        None => failures.push(Failure::MasterKeyedDigestMissing),
        Some(stored) => {
            if let Some(keyed) = &chain.master_keyed_digest {
                if !digest_matches(stored, keyed) {
                    failures.push(Failure::MasterKeyedDigestMismatch {
                        stored: stored.to_string(),
                    });
                }
            }
        }
    }
}

/// Verify an envelope with the given options.
pub fn verify_manifest(
    envelope: &ManifestEnvelope,
    options: VerifyOptions,
) -> Result<VerificationReport, VerifyError> {
    ManifestVerifier::new(options).verify(envelope)
}
