//! # Verification Errors
//!
//! Conditions that stop a run before any report exists. Discrepancies
//! found during a run are [`Failure`](crate::Failure) values instead.

use std::path::PathBuf;

use thiserror::Error;

use custody_core::{CustodyError, StructuralError};
use custody_crypto::CryptoError;

/// Errors from loading, verifying or sealing a manifest.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The manifest could not be decoded or lacks a mandatory section.
    #[error(transparent)]
    Custody(#[from] CustodyError),

    /// Reading or writing a manifest file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key material could not be turned into a usable MAC key.
    #[error("key error: {0}")]
    Key(#[from] CryptoError),
}

impl VerifyError {
    /// True for a missing header or records collection.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Custody(CustodyError::Structural(_)))
    }
}

impl From<StructuralError> for VerifyError {
    fn from(err: StructuralError) -> Self {
        Self::Custody(CustodyError::Structural(err))
    }
}
