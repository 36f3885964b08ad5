//! # Chain Aggregation
//!
//! Folds the ordered per-record results into two values that bind the whole
//! manifest, including its record order:
//!
//! - `master_digest` = SHA-256 of every canonical string joined by `\n`;
//! - `master_keyed_digest` = HMAC-SHA256 of every per-record keyed digest
//!   (lowercase hex) joined by `\n`, under the same key.
//!
//! Per-record digests alone cannot detect a reordered, duplicated or
//! dropped record. The aggregates do.
//!
//! ## Empty Manifests
//!
//! With no records the joined input is the empty string, so
//! `master_digest` is SHA-256 of zero bytes ([`EMPTY_MASTER_DIGEST_HEX`])
//! and `master_keyed_digest` is the HMAC of zero bytes under the key.
//!
//! ## Security Invariant
//!
//! Inputs are consumed in slice order. Callers that hash records
//! concurrently must reassemble results by record index first.

use sha2::{Digest, Sha256};

use custody_core::{CanonicalRecord, ContentDigest};

use crate::hasher::{RecordDigests, RecordHasher};

/// Separator between chained entries.
pub const CHAIN_SEPARATOR: &[u8] = b"\n";

/// SHA-256 of the empty string: the master digest of a manifest with no
/// records.
pub const EMPTY_MASTER_DIGEST_HEX: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// The two aggregate values for a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDigests {
    /// SHA-256 over the joined canonical strings.
    pub master_digest: ContentDigest,
    /// HMAC-SHA256 over the joined keyed digests, when signing is active.
    pub master_keyed_digest: Option<ContentDigest>,
}

/// Computes aggregate digests using the key of a [`RecordHasher`].
#[derive(Debug, Clone, Copy)]
pub struct ChainAggregator<'h> {
    hasher: &'h RecordHasher,
}

impl<'h> ChainAggregator<'h> {
    /// Aggregate with the same key (or lack of one) as `hasher`.
    pub fn new(hasher: &'h RecordHasher) -> Self {
        Self { hasher }
    }

    /// Aggregate per-record results, in slice order.
    ///
    /// The keyed aggregate is present only if the hasher is keyed.
    pub fn aggregate(&self, records: &[RecordDigests]) -> ChainDigests {
        let master_digest = master_digest(records.iter().map(|r| &r.canonical));
        let master_keyed_digest = if self.hasher.is_keyed() {
            let hexes: Vec<String> = records
                .iter()
                .filter_map(|r| r.keyed_digest.as_ref().map(ContentDigest::to_hex))
                .collect();
            self.master_keyed_digest(hexes.iter().map(String::as_str))
        } else {
            None
        };
        ChainDigests {
            master_digest,
            master_keyed_digest,
        }
    }

    /// HMAC-SHA256 over keyed-digest hex strings joined by `\n`.
    ///
    /// Returns `None` if the hasher is unkeyed.
    pub fn master_keyed_digest<'a>(
        &self,
        keyed_hexes: impl IntoIterator<Item = &'a str>,
    ) -> Option<ContentDigest> {
        let mut joined = Vec::new();
        for (i, hex) in keyed_hexes.into_iter().enumerate() {
            if i > 0 {
                joined.extend_from_slice(CHAIN_SEPARATOR);
            }
            joined.extend_from_slice(hex.as_bytes());
        }
        self.hasher.mac(&joined)
    }
}

/// SHA-256 over canonical strings joined by `\n`, streamed without
/// building the joined string.
pub fn master_digest<'a>(
    canonicals: impl IntoIterator<Item = &'a CanonicalRecord>,
) -> ContentDigest {
    let mut hasher = Sha256::new();
    for (i, canonical) in canonicals.into_iter().enumerate() {
        if i > 0 {
            hasher.update(CHAIN_SEPARATOR);
        }
        hasher.update(canonical.as_bytes());
    }
    ContentDigest::new(hasher.finalize().into())
}
