//! # Content Digest
//!
//! Defines `ContentDigest`, the 32-byte SHA-256 / HMAC-SHA256 output that
//! manifests store as lowercase hex.
//!
//! ## Security Invariant
//!
//! Record digests are computed only from [`CanonicalRecord`], enforced by
//! the signature of [`sha256_digest()`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalRecord;
use crate::error::CustodyError;

/// A 32-byte digest value.
///
/// Rendered and parsed as 64 lowercase hex characters; serialized the same
/// way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Wrap raw digest bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex string (either case, surrounding whitespace
    /// ignored).
    pub fn from_hex(s: &str) -> Result<Self, CustodyError> {
        let s = s.trim();
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| {
            CustodyError::InvalidDigest(format!(
                "expected 64 hex chars, got {} chars: {e}",
                s.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// SHA-256 of a canonical record's UTF-8 bytes.
pub fn sha256_digest(data: &CanonicalRecord) -> ContentDigest {
    ContentDigest(Sha256::digest(data.as_bytes()).into())
}

/// Convenience wrapper around [`sha256_digest()`] returning hex.
pub fn sha256_hex(data: &CanonicalRecord) -> String {
    sha256_digest(data).to_hex()
}
