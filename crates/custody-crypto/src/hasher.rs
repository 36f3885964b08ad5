//! # Record Hasher
//!
//! Computes, for one canonical record:
//!
//! - `digest` = SHA-256 of the canonical string's UTF-8 bytes;
//! - `keyed_digest` = HMAC-SHA256 of the same bytes, only when a key is
//!   active.
//!
//! The keyed MAC is initialised once from the key and cloned per record, so
//! the key schedule is not recomputed for every record and no key bytes are
//! held outside [`KeyBytes`](crate::KeyBytes).

use hmac::{Hmac, Mac};
use sha2::Sha256;

use custody_core::{sha256_digest, CanonicalRecord, ContentDigest, ManifestRecord};

use crate::error::CryptoError;
use crate::key::KeyBytes;

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Digests computed for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDigests {
    /// The record's canonical string.
    pub canonical: CanonicalRecord,
    /// SHA-256 of the canonical string.
    pub digest: ContentDigest,
    /// HMAC-SHA256 of the canonical string, when signing is active.
    pub keyed_digest: Option<ContentDigest>,
}

/// Hashes canonical records, optionally under an HMAC key.
#[derive(Clone)]
pub struct RecordHasher {
    mac: Option<HmacSha256>,
}

impl RecordHasher {
    /// Build a hasher. `None` disables keyed digests.
    pub fn new(key: Option<&KeyBytes>) -> Result<Self, CryptoError> {
        let mac = key
            .map(|k| {
                <HmacSha256 as Mac>::new_from_slice(k.expose())
                    .map_err(|e| CryptoError::InvalidKey(e.to_string()))
            })
            .transpose()?;
        Ok(Self { mac })
    }

    /// A hasher that only computes plain digests.
    pub fn unkeyed() -> Self {
        Self { mac: None }
    }

    /// Whether keyed digests are produced.
    pub fn is_keyed(&self) -> bool {
        self.mac.is_some()
    }

    /// Hash an already-canonicalized record.
    pub fn hash(&self, canonical: CanonicalRecord) -> RecordDigests {
        let digest = sha256_digest(&canonical);
        let keyed_digest = self.mac(canonical.as_bytes());
        RecordDigests {
            canonical,
            digest,
            keyed_digest,
        }
    }

    /// Canonicalize and hash a manifest record.
    pub fn hash_record(&self, record: &ManifestRecord) -> RecordDigests {
        self.hash(CanonicalRecord::new(record))
    }

    /// HMAC-SHA256 of `data`, or `None` if this hasher is unkeyed.
    pub fn mac(&self, data: &[u8]) -> Option<ContentDigest> {
        self.mac.as_ref().map(|mac| {
            let mut mac = mac.clone();
            mac.update(data);
            ContentDigest::new(mac.finalize().into_bytes().into())
        })
    }
}

impl std::fmt::Debug for RecordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordHasher")
            .field("keyed", &self.is_keyed())
            .finish()
    }
}
