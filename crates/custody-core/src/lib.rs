//! # custody-core: Foundational Types for Custody Manifests
//!
//! This crate defines the data model of an audit manifest describing
//! evidence-handling operations (copy, verify, quarantine) and the canonical
//! record encoding that every digest in the workspace is computed over.
//! Every other `custody-*` crate depends on it; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalRecord` newtype.** Record hashing flows through
//!    `CanonicalRecord::new()`. The inner string is private, so no code path
//!    can hash a hand-assembled record string by mistake.
//!
//! 2. **Claims are not trusted.** `recordCanonical`, `recordCanonicalDigest`
//!    and `recordKeyedDigest` are carried on [`ManifestRecord`] as stored
//!    claims. The canonical form is computed from the 16 semantic fields only.
//!
//! 3. **Order is content.** `records` is a `Vec`, never a map or set. The
//!    stored order is the order that gets hashed and chained.
//!
//! 4. **`sha256_digest()` accepts only `&CanonicalRecord`.** The aggregate
//!    chain digests are computed in `custody-crypto` over the ordered
//!    sequence of canonical records.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `custody-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod manifest;

// Re-export primary types for ergonomic imports.
pub use canonical::{CanonicalRecord, CANONICAL_FIELDS, CANONICAL_FIELD_COUNT};
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, CustodyError, StructuralError};
pub use manifest::{
    claim, ManifestEnvelope, ManifestHeader, ManifestRecord, SUPPORTED_ALGORITHM,
};
