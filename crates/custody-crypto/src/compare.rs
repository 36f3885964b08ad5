//! # Constant-Time Comparison
//!
//! Stored claims are compared with recomputed values using
//! `subtle::ConstantTimeEq`, so the time taken does not reveal how many
//! leading bytes of a forged keyed digest were correct.

use subtle::ConstantTimeEq;

use custody_core::ContentDigest;

/// True if `stored` is the hex rendering of `computed`.
///
/// `stored` may use either case and carry surrounding whitespace. Anything
/// that is not 64 hex characters never matches.
pub fn digest_matches(stored: &str, computed: &ContentDigest) -> bool {
    match ContentDigest::from_hex(stored) {
        Ok(parsed) => bool::from(
            parsed
                .as_bytes()
                .as_slice()
                .ct_eq(computed.as_bytes().as_slice()),
        ),
        Err(_) => false,
    }
}

/// Byte-exact comparison of two strings.
///
/// Lengths are compared in variable time; contents in constant time.
pub fn text_matches(stored: &str, computed: &str) -> bool {
    bool::from(stored.as_bytes().ct_eq(computed.as_bytes()))
}
