//! Keystore configuration with sensible defaults.
//!
//! Every tunable used when creating a key file lives here. Values are
//! loaded from JSON by the front end and checked with
//! [`KeystoreConfig::validate`] before use.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Language, Result, WordCount, XmnError};

/// Default name of the persisted key file inside an account directory.
pub const DEFAULT_KEY_FILE_NAME: &str = "key.xmn";

/// Largest accepted Argon2id memory cost in KiB (1 GiB).
pub const MAX_M_COST: u32 = 1_048_576;

/// Largest accepted Argon2id pass count.
pub const MAX_T_COST: u32 = 16;

/// Largest accepted Argon2id lane count.
pub const MAX_P_COST: u32 = 16;

/// Keystore configuration.
///
/// Missing JSON fields fall back to [`KeystoreConfig::default`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeystoreConfig {
    /// Mnemonic wordlist language.
    pub language: Language,

    /// Number of seed words generated for a new account.
    pub word_count: usize,

    /// File name of the key file written inside the account directory.
    pub key_file_name: String,

    /// Argon2id memory cost in KiB.
    pub m_cost: u32,

    /// Argon2id number of passes.
    pub t_cost: u32,

    /// Argon2id degree of parallelism (lanes).
    pub p_cost: u32,
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        Self {
            language: Language::English,
            word_count: 12,
            key_file_name: DEFAULT_KEY_FILE_NAME.to_string(),
            m_cost: 65_536, // 64 MiB
            t_cost: 3,
            p_cost: 1,
        }
    }
}

impl KeystoreConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`XmnError::ConfigError`] if the file cannot be read or is
    /// not valid JSON, and propagates [`KeystoreConfig::validate`] errors.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| XmnError::ConfigError {
            reason: format!("failed to read config file {}: {e}", path.display()),
        })?;
        Self::from_json(&text)
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| XmnError::ConfigError {
            reason: format!("invalid config JSON: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the configured word count as a [`WordCount`].
    pub fn word_count(&self) -> Result<WordCount> {
        WordCount::from_count(self.word_count)
    }

    /// Validates all configuration values.
    ///
    /// The Argon2 bounds are the same ones the KDF enforces.
    pub fn validate(&self) -> Result<()> {
        self.word_count().map_err(|_| XmnError::ConfigError {
            reason: format!(
                "word_count must be 12, 15, 18, 21 or 24, got {}",
                self.word_count
            ),
        })?;

        let name = self.key_file_name.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(XmnError::ConfigError {
                reason: format!("key_file_name must be a plain file name, got {name:?}"),
            });
        }

        if self.t_cost == 0 || self.t_cost > MAX_T_COST {
            return Err(XmnError::ConfigError {
                reason: format!("t_cost must be between 1 and {MAX_T_COST}, got {}", self.t_cost),
            });
        }

        if self.p_cost == 0 || self.p_cost > MAX_P_COST {
            return Err(XmnError::ConfigError {
                reason: format!("p_cost must be between 1 and {MAX_P_COST}, got {}", self.p_cost),
            });
        }

        let min_m_cost = 8 * self.p_cost;
        if self.m_cost < min_m_cost || self.m_cost > MAX_M_COST {
            return Err(XmnError::ConfigError {
                reason: format!(
                    "m_cost must be between {min_m_cost} and {MAX_M_COST} KiB, got {}",
                    self.m_cost
                ),
            });
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
