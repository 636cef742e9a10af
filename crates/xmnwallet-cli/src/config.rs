//! Configuration loading for the CLI.
//!
//! Precedence, highest first: command-line flags, the `--config` JSON
//! file, built-in defaults.

use std::path::Path;

use xmnwallet_types::config::KeystoreConfig;
use xmnwallet_types::Language;

/// Loads the keystore configuration, or defaults when no file is given.
pub fn load(path: Option<&Path>) -> std::result::Result<KeystoreConfig, String> {
    match path {
        Some(p) => {
            let config = KeystoreConfig::load(p).map_err(|e| e.to_string())?;
            tracing::debug!(path = %p.display(), "configuration loaded");
            Ok(config)
        }
        None => Ok(KeystoreConfig::default()),
    }
}

/// Applies `--language` / `--count` overrides and re-validates.
pub fn merge(
    mut config: KeystoreConfig,
    language: Option<&str>,
    count: Option<usize>,
) -> std::result::Result<KeystoreConfig, String> {
    if let Some(tag) = language {
        config.language = tag.parse::<Language>().map_err(|e| e.to_string())?;
    }
    if let Some(count) = count {
        config.word_count = count;
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}
