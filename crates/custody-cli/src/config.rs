//! # CLI Configuration
//!
//! Optional YAML file of defaults, loaded with `--config`:
//!
//! ```yaml
//! expected_key_id: prod-1
//! require_signed: true
//! key_env: CUSTODY_MANIFEST_KEY
//! key_file: /run/secrets/manifest-key
//! key_encoding: base64
//! workers: 4
//! ```
//!
//! Command-line flags override file values. The file never holds key
//! material itself, only where to find it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use custody_crypto::KeyEncoding;

/// Default environment variable holding the manifest key.
pub const DEFAULT_KEY_ENV: &str = "CUSTODY_MANIFEST_KEY";

/// Defaults read from the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub expected_key_id: Option<String>,
    pub require_signed: bool,
    pub key_env: Option<String>,
    pub key_file: Option<PathBuf>,
    pub key_encoding: KeyEncoding,
    pub workers: Option<usize>,
}

impl CliConfig {
    /// Load from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// The environment variable to read the key from.
    pub fn key_env(&self) -> &str {
        self.key_env.as_deref().unwrap_or(DEFAULT_KEY_ENV)
    }

    /// Hashing threads, defaulting to one.
    pub fn workers(&self) -> usize {
        self.workers.unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_gives_defaults() {
        let config = CliConfig::load(None).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.key_env(), DEFAULT_KEY_ENV);
        assert_eq!(config.workers(), 1);
        assert_eq!(config.key_encoding, KeyEncoding::Raw);
        assert!(!config.require_signed);
    }

    #[test]
    fn full_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custody.yaml");
        std::fs::write(
            &path,
            "expected_key_id: prod-1\n\
             require_signed: true\n\
             key_env: EVIDENCE_KEY\n\
             key_file: /run/secrets/key\n\
             key_encoding: base64\n\
             workers: 4\n",
        )
        .unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.expected_key_id.as_deref(), Some("prod-1"));
        assert!(config.require_signed);
        assert_eq!(config.key_env(), "EVIDENCE_KEY");
        assert_eq!(config.key_file, Some(PathBuf::from("/run/secrets/key")));
        assert_eq!(config.key_encoding, KeyEncoding::Base64);
        assert_eq!(config.workers(), 4);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custody.yaml");
        std::fs::write(&path, "require_signed: true\n").unwrap();
        let config = CliConfig::load(Some(&path)).unwrap();
        assert!(config.require_signed);
        assert_eq!(config.key_env(), DEFAULT_KEY_ENV);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custody.yaml");
        std::fs::write(&path, "key: hunter2\n").unwrap();
        let err = CliConfig::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("invalid YAML"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = CliConfig::load(Some(Path::new("/nonexistent/custody.yaml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
