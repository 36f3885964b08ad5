//! # Canonical Record Serialization
//!
//! This module defines `CanonicalRecord`, the sole construction path for
//! the string a manifest record is hashed over.
//!
//! ## Format
//!
//! Sixteen `name=value` segments in the fixed order of [`CANONICAL_FIELDS`],
//! joined by `|`:
//!
//! ```text
//! timestampUtc=...|sourceProvider=...|operation=...|...|originalPath=...
//! ```
//!
//! 1. **Missing values are empty, never omitted.** Every record has exactly
//!    sixteen segments, so field boundaries cannot shift.
//! 2. **Scalars use their plain textual form.** Integers are decimal,
//!    booleans are `true`/`false`.
//! 3. **Values are escaped.** `\` becomes `\\`, `|` becomes `\|`, CR becomes
//!    the two characters `\r`, LF becomes the two characters `\n`. Backslash
//!    is escaped first so that backslashes introduced by later rules are not
//!    escaped again.
//!
//! The stored claim fields (`recordCanonical`, `recordCanonicalDigest`,
//! `recordKeyedDigest`) never contribute to the canonical form.
//!
//! ## Security Invariant
//!
//! The inner `String` is private. The only constructor is
//! [`CanonicalRecord::new()`], so every digest in the workspace is computed
//! over a string produced by these rules.

use std::borrow::Cow;
use std::fmt;

use crate::error::CanonicalizationError;
use crate::manifest::ManifestRecord;

/// Separator between `name=value` segments.
pub const FIELD_SEPARATOR: char = '|';

/// Number of semantic fields in every canonical record.
pub const CANONICAL_FIELD_COUNT: usize = 16;

/// Semantic field names, in canonical order.
pub const CANONICAL_FIELDS: [&str; CANONICAL_FIELD_COUNT] = [
    "timestampUtc",
    "sourceProvider",
    "operation",
    "sourcePath",
    "destinationPath",
    "bytes",
    "sourceDigestHex",
    "destinationDigestHex",
    "verifySize",
    "verifyDigest",
    "verifyStructure",
    "verifyOk",
    "attempts",
    "retried",
    "quarantinePath",
    "originalPath",
];

/// The escaped, field-ordered encoding of one manifest record.
///
/// # Invariants
///
/// - Produced only by [`CanonicalRecord::new()`].
/// - A pure function of the record's sixteen semantic fields.
/// - Contains exactly fifteen unescaped `|` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalRecord(String);

impl CanonicalRecord {
    /// Canonicalize a manifest record.
    pub fn new(record: &ManifestRecord) -> Self {
        let mut out = String::with_capacity(256);
        let values = semantic_values(record);
        for (position, (name, value)) in CANONICAL_FIELDS.iter().zip(&values).enumerate() {
            if position > 0 {
                out.push(FIELD_SEPARATOR);
            }
            out.push_str(name);
            out.push('=');
            if let Some(value) = value {
                push_escaped(&mut out, value);
            }
        }
        Self(out)
    }

    /// The canonical string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// UTF-8 bytes of the canonical string, for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Length of the canonical string in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: even an empty record renders its field names.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalRecord {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for CanonicalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn text(value: &Option<String>) -> Option<Cow<'_, str>> {
    value.as_deref().map(Cow::Borrowed)
}

fn integer(value: Option<i64>) -> Option<Cow<'static, str>> {
    value.map(|n| Cow::Owned(n.to_string()))
}

fn flag(value: Option<bool>) -> Option<Cow<'static, str>> {
    value.map(|b| Cow::Borrowed(if b { "true" } else { "false" }))
}

/// The sixteen semantic values, index-aligned with [`CANONICAL_FIELDS`].
fn semantic_values(r: &ManifestRecord) -> [Option<Cow<'_, str>>; CANONICAL_FIELD_COUNT] {
    [
        text(&r.timestamp_utc),
        text(&r.source_provider),
        text(&r.operation),
        text(&r.source_path),
        text(&r.destination_path),
        integer(r.bytes),
        text(&r.source_digest_hex),
        text(&r.destination_digest_hex),
        flag(r.verify_size),
        flag(r.verify_digest),
        flag(r.verify_structure),
        flag(r.verify_ok),
        integer(r.attempts),
        flag(r.retried),
        text(&r.quarantine_path),
        text(&r.original_path),
    ]
}

/// Append `value` to `out` with the canonical escapes applied.
///
/// A single pass over the characters is equivalent to applying the four
/// substitutions in order (backslash, pipe, CR, LF), because each input
/// character is rewritten exactly once.
fn push_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
}

/// Escape a single field value.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    push_escaped(&mut out, value);
    out
}

/// Split a canonical string back into `(name, unescaped value)` pairs.
///
/// Fails unless the string has exactly [`CANONICAL_FIELD_COUNT`] segments
/// naming [`CANONICAL_FIELDS`] in order. Absent and empty values both come
/// back as the empty string.
pub fn split_fields(
    canonical: &str,
) -> Result<Vec<(&'static str, String)>, CanonicalizationError> {
    let mut segments: Vec<String> = Vec::with_capacity(CANONICAL_FIELD_COUNT);
    let mut current = String::new();
    let mut chars = canonical.char_indices();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some((_, '\\')) => current.push('\\'),
                Some((_, '|')) => current.push('|'),
                Some((_, 'r')) => current.push('\r'),
                Some((_, 'n')) => current.push('\n'),
                Some((_, found)) => {
                    return Err(CanonicalizationError::UnknownEscape { found, offset })
                }
                None => return Err(CanonicalizationError::DanglingEscape { offset }),
            },
            FIELD_SEPARATOR => segments.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    segments.push(current);

    if segments.len() != CANONICAL_FIELD_COUNT {
        return Err(CanonicalizationError::FieldCount {
            expected: CANONICAL_FIELD_COUNT,
            found: segments.len(),
        });
    }

    segments
        .into_iter()
        .zip(CANONICAL_FIELDS)
        .enumerate()
        .map(|(position, (segment, expected))| {
            let (name, value) = segment
                .split_once('=')
                .ok_or(CanonicalizationError::MissingAssignment { position })?;
            if name != expected {
                return Err(CanonicalizationError::UnexpectedField {
                    position,
                    expected,
                    found: name.to_string(),
                });
            }
            Ok((expected, value.to_string()))
        })
        .collect()
}
