//! # Key Sources
//!
//! Locates the manifest key. First match wins:
//!
//! 1. `--key-file` (or `key_file` in the config), with one trailing newline
//!    removed so `echo secret > key` works;
//! 2. the environment variable named by `--key-env` (default
//!    `CUSTODY_MANIFEST_KEY`).
//!
//! The value is wrapped as [`KeyMaterial`] according to the configured
//! encoding. Only the source's location is ever logged.

use std::env::VarError;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use custody_crypto::{KeyEncoding, KeyMaterial};

use crate::config::CliConfig;

/// Key location flags shared by `verify` and `seal`.
#[derive(Args, Debug, Clone, Default)]
pub struct KeyArgs {
    /// Environment variable holding the key [default: CUSTODY_MANIFEST_KEY].
    #[arg(long)]
    pub key_env: Option<String>,

    /// File holding the key. Takes precedence over the environment.
    #[arg(long)]
    pub key_file: Option<PathBuf>,

    /// The key is base64-encoded rather than raw text.
    #[arg(long)]
    pub key_base64: bool,
}

impl KeyArgs {
    /// Merge flags over config-file defaults.
    pub fn source(&self, config: &CliConfig) -> KeySource {
        KeySource {
            key_file: self.key_file.clone().or_else(|| config.key_file.clone()),
            key_env: self
                .key_env
                .clone()
                .unwrap_or_else(|| config.key_env().to_string()),
            encoding: if self.key_base64 {
                KeyEncoding::Base64
            } else {
                config.key_encoding
            },
        }
    }
}

/// Where to look for key material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySource {
    pub key_file: Option<PathBuf>,
    pub key_env: String,
    pub encoding: KeyEncoding,
}

impl KeySource {
    /// Read the key, returning `None` if no source holds one.
    ///
    /// A configured key file that cannot be read is an error, not a missing
    /// key: the operator asked for that file explicitly.
    pub fn load(&self) -> Result<Option<KeyMaterial>> {
        if let Some(path) = &self.key_file {
            let mut value = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read key file: {}", path.display()))?;
            trim_line_ending(&mut value);
            tracing::debug!(
                source = %path.display(),
                encoding = %self.encoding,
                "loaded key from file"
            );
            return Ok(Some(KeyMaterial::new(value, self.encoding)));
        }

        match std::env::var(&self.key_env) {
            Ok(value) => {
                tracing::debug!(
                    source = %self.key_env,
                    encoding = %self.encoding,
                    "loaded key from environment"
                );
                Ok(Some(KeyMaterial::new(value, self.encoding)))
            }
            Err(VarError::NotPresent) => {
                tracing::debug!(source = %self.key_env, "no key in environment");
                Ok(None)
            }
            Err(VarError::NotUnicode(_)) => {
                bail!("environment variable {} is not valid UTF-8", self.key_env)
            }
        }
    }
}

fn trim_line_ending(value: &mut String) {
    if value.ends_with('\n') {
        value.pop();
        if value.ends_with('\r') {
            value.pop();
        }
    }
}
