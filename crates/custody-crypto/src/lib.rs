//! # custody-crypto: Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for manifest sealing and
//! verification:
//!
//! - **Key material** resolution from raw text or base64 into [`KeyBytes`],
//!   which redacts itself in `Debug` output and zeroizes on drop.
//! - **Record hashing**: SHA-256 and HMAC-SHA256 of a
//!   [`CanonicalRecord`](custody_core::CanonicalRecord).
//! - **Chain aggregation**: the master digest and master keyed digest over
//!   the ordered sequence of records.
//! - **Constant-time comparison** of stored hex claims against recomputed
//!   digests.
//!
//! ## Crate Policy
//!
//! - Depends only on `custody-core` internally.
//! - No mocking of cryptographic operations in tests: all tests use real
//!   SHA-256 and real HMAC-SHA256 with known-answer vectors.
//! - Key bytes are never formatted, logged, or serialized.

pub mod chain;
pub mod compare;
pub mod error;
pub mod hasher;
pub mod key;

pub use chain::{ChainAggregator, ChainDigests};
pub use compare::{digest_matches, text_matches};
pub use error::CryptoError;
pub use hasher::{RecordDigests, RecordHasher};
pub use key::{KeyBytes, KeyEncoding, KeyMaterial};
