//! # Key Material
//!
//! Converts a configured HMAC key into raw bytes. The configured value is
//! a two-variant input: raw text (used as its UTF-8 bytes) or base64
//! (decoded). Where the value came from (an environment variable, a file)
//! is the caller's concern.
//!
//! ## Security Invariants
//!
//! - [`KeyMaterial`] and [`KeyBytes`] zeroize their buffers on drop.
//! - Neither type prints its contents through `Debug`.
//! - An empty key is rejected: HMAC accepts one, but an empty key
//!   authenticates nothing.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// How a configured key string is encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    /// The string's UTF-8 bytes are the key.
    #[default]
    Raw,
    /// The string is standard-alphabet, padded base64.
    Base64,
}

impl KeyEncoding {
    /// Returns the encoding identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Base64 => "base64",
        }
    }
}

impl fmt::Display for KeyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured key, before resolution.
pub enum KeyMaterial {
    /// Use the UTF-8 bytes of the string directly.
    Raw(String),
    /// Base64-decode the string.
    Base64(String),
}

impl KeyMaterial {
    /// Wrap a configured value according to its encoding.
    pub fn new(value: String, encoding: KeyEncoding) -> Self {
        match encoding {
            KeyEncoding::Raw => Self::Raw(value),
            KeyEncoding::Base64 => Self::Base64(value),
        }
    }

    /// The encoding this material was configured with.
    pub fn encoding(&self) -> KeyEncoding {
        match self {
            Self::Raw(_) => KeyEncoding::Raw,
            Self::Base64(_) => KeyEncoding::Base64,
        }
    }

    /// Resolve into raw key bytes.
    ///
    /// # Errors
    ///
    /// [`CryptoError::Base64Decode`] if base64 input is malformed;
    /// [`CryptoError::EmptyKey`] if the result has no bytes.
    pub fn resolve(&self) -> Result<KeyBytes, CryptoError> {
        let bytes = match self {
            Self::Raw(text) => text.as_bytes().to_vec(),
            Self::Base64(encoded) => STANDARD
                .decode(encoded.trim())
                .map_err(|e| CryptoError::Base64Decode(e.to_string()))?,
        };
        if bytes.is_empty() {
            return Err(CryptoError::EmptyKey);
        }
        Ok(KeyBytes(bytes))
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial::{}([REDACTED])", self.encoding())
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        match self {
            Self::Raw(s) | Self::Base64(s) => s.zeroize(),
        }
    }
}

/// Resolved HMAC key bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyBytes(Vec<u8>);

impl KeyBytes {
    /// Borrow the key bytes for MAC initialisation.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a resolved key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyBytes([REDACTED; {} bytes])", self.0.len())
    }
}
