//! # Error Types
//!
//! Errors raised while loading or decoding manifests. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Verification discrepancies (a digest that does not match, a missing
//! keyed digest) are not errors: they are accumulated as report entries in
//! `custody-verify`. Only problems that prevent a report from being built
//! at all live here.

use thiserror::Error;

/// Top-level error type for manifest handling.
#[derive(Error, Debug)]
pub enum CustodyError {
    /// The envelope is missing a mandatory section.
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    /// A canonical record string could not be decoded.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A digest string is not 64 hex characters.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The envelope does not have the shape verification needs.
///
/// These are terminal: no checks are attempted and no report is produced.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralError {
    /// The `header` object is absent or null.
    #[error("manifest has no header")]
    MissingHeader,

    /// The `records` array is absent or null.
    #[error("manifest has no records collection")]
    MissingRecords,
}

/// Error while splitting a canonical record string back into its fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalizationError {
    /// The string ends in the middle of an escape sequence.
    #[error("dangling escape at byte offset {offset}")]
    DanglingEscape {
        /// Byte offset of the trailing backslash.
        offset: usize,
    },

    /// A backslash is followed by a character that is not an escape code.
    #[error("unknown escape sequence '\\{found}' at byte offset {offset}")]
    UnknownEscape {
        /// The character after the backslash.
        found: char,
        /// Byte offset of the backslash.
        offset: usize,
    },

    /// A segment has no `name=` prefix.
    #[error("segment {position} has no '=' separator")]
    MissingAssignment {
        /// Zero-based segment position.
        position: usize,
    },

    /// A segment names a different field than the fixed order requires.
    #[error("segment {position} names field '{found}', expected '{expected}'")]
    UnexpectedField {
        /// Zero-based segment position.
        position: usize,
        /// The field name required at this position.
        expected: &'static str,
        /// The field name actually found.
        found: String,
    },

    /// The string does not have exactly one segment per semantic field.
    #[error("expected {expected} fields, found {found}")]
    FieldCount {
        /// Required field count.
        expected: usize,
        /// Field count actually found.
        found: usize,
    },
}
