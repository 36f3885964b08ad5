//! # Cryptographic Error Types
//!
//! Structured errors for key handling in `custody-crypto`.

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The configured key is not valid base64.
    #[error("base64 decode error: {0}")]
    Base64Decode(String),

    /// The key resolved to zero bytes.
    #[error("key material is empty")]
    EmptyKey,

    /// The MAC could not be initialised with the key.
    #[error("invalid MAC key: {0}")]
    InvalidKey(String),
}
