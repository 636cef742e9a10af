//! Account creation and loading on top of the key file.
//!
//! An account is one directory holding one `key.xmn`. The caller owns
//! an [`AccountContext`] describing where the file lives and how new
//! keys are protected; nothing is kept between calls.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use xmnwallet_crypto::kdf::Argon2Params;
use xmnwallet_crypto::mnemonic::Mnemonic;
use xmnwallet_crypto::signing::{fingerprint, PrivateKey, PublicKey, Signature};
use xmnwallet_types::config::{KeystoreConfig, DEFAULT_KEY_FILE_NAME};
use xmnwallet_types::{Language, Result, WordCount, XmnError};
use zeroize::Zeroizing;

use crate::key_file::{create_key_file, read_key_file};
use crate::keystore::{open_key_file, seal_key_file};

// ---------------------------------------------------------------------------
// AccountContext
// ---------------------------------------------------------------------------

/// Caller-owned settings for creating and locating an account.
#[derive(Clone, Debug)]
pub struct AccountContext {
    /// Directory holding the key file.
    pub directory: PathBuf,
    /// Wordlist language for newly generated mnemonics.
    pub language: Language,
    /// Length of newly generated mnemonics.
    pub word_count: WordCount,
    /// Argon2id cost for newly written key files.
    pub kdf: Argon2Params,
    /// Key file name inside `directory`.
    pub key_file_name: String,
}

impl AccountContext {
    /// Context with default settings rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            language: Language::default(),
            word_count: WordCount::default(),
            kdf: Argon2Params::default(),
            key_file_name: DEFAULT_KEY_FILE_NAME.to_string(),
        }
    }

    /// Context built from a validated [`KeystoreConfig`].
    pub fn from_config(directory: impl Into<PathBuf>, config: &KeystoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            directory: directory.into(),
            language: config.language,
            word_count: config.word_count()?,
            kdf: Argon2Params {
                m_cost: config.m_cost,
                t_cost: config.t_cost,
                p_cost: config.p_cost,
            },
            key_file_name: config.key_file_name.clone(),
        })
    }

    /// Full path of the key file.
    pub fn key_file_path(&self) -> PathBuf {
        self.directory.join(&self.key_file_name)
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// An unlocked account: the decrypted private key and where it lives.
pub struct Account {
    private_key: PrivateKey,
    path: PathBuf,
}

impl Account {
    /// Public key of the account.
    pub fn public_key(&self) -> PublicKey {
        self.private_key.public_key()
    }

    /// Short hex identifier derived from the public key.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.private_key.public_key())
    }

    /// Signs `message` with the account key.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.private_key.sign(message)
    }

    /// Raw private key bytes.
    pub fn private_key_bytes(&self) -> Zeroizing<[u8; 32]> {
        self.private_key.to_bytes()
    }

    /// Path of the key file this account was written to or read from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Creates a new account protected by `mnemonic`.
///
/// Generates a fresh private key, encrypts it and writes the key file
/// atomically, creating the directory if needed. An existing key file is
/// never replaced, including one that appears while the key is being
/// encrypted.
///
/// # Errors
///
/// - [`XmnError::StorageError`] if a key file already exists at the
///   target path or any I/O step fails.
/// - [`XmnError::ConfigError`] if the context's KDF cost is invalid.
pub fn create_account(context: &AccountContext, mnemonic: &Mnemonic) -> Result<Account> {
    let path = context.key_file_path();
    if path.exists() {
        return Err(XmnError::StorageError {
            reason: format!("key file already exists at {}", path.display()),
        });
    }

    fs::create_dir_all(&context.directory).map_err(|e| XmnError::StorageError {
        reason: format!(
            "failed to create account directory {}: {e}",
            context.directory.display()
        ),
    })?;

    let private_key = PrivateKey::generate();
    let key_file = seal_key_file(mnemonic, &private_key, &context.kdf)?;
    create_key_file(&path, &key_file)?;

    tracing::info!(
        path = %path.display(),
        fingerprint = %fingerprint(&key_file.public_key),
        "account created"
    );
    Ok(Account { private_key, path })
}

/// Reads `path` and decrypts it with `words`.
///
/// # Errors
///
/// Same as [`crate::keystore::decrypt_private_key`], plus
/// [`XmnError::StorageError`] if the file cannot be read.
pub fn load_account<S: AsRef<str>>(path: &Path, words: &[S]) -> Result<Account> {
    let key_file = read_key_file(path)?;
    let mnemonic = Mnemonic::parse(words)?;
    let private_key = open_key_file(&key_file, &mnemonic)?;

    tracing::info!(
        path = %path.display(),
        fingerprint = %fingerprint(&key_file.public_key),
        "account unlocked"
    );
    Ok(Account {
        private_key,
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Public metadata of a key file. Contains no secret.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct KeyFileInfo {
    /// File format version byte.
    pub version: u8,
    /// Stored public key, lowercase hex.
    pub public_key: String,
    /// Short identifier derived from the public key.
    pub fingerprint: String,
    /// Argon2id memory cost in KiB.
    pub m_cost: u32,
    /// Argon2id number of passes.
    pub t_cost: u32,
    /// Argon2id degree of parallelism.
    pub p_cost: u32,
}

/// Reads the public header of a key file without any pass words.
pub fn inspect_key_file(path: &Path) -> Result<KeyFileInfo> {
    let key_file = read_key_file(path)?;
    Ok(KeyFileInfo {
        version: key_file.version(),
        public_key: key_file.public_key.to_string(),
        fingerprint: fingerprint(&key_file.public_key),
        m_cost: key_file.argon2_params.m_cost,
        t_cost: key_file.argon2_params.t_cost,
        p_cost: key_file.argon2_params.p_cost,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_uses_key_xmn() {
        let context = AccountContext::new("/tmp/xmn-account");
        assert_eq!(context.key_file_path(), PathBuf::from("/tmp/xmn-account/key.xmn"));
        assert_eq!(context.word_count, WordCount::Twelve);
        assert_eq!(context.kdf, Argon2Params::default());
    }

    #[test]
    fn context_from_config() -> std::result::Result<(), XmnError> {
        let config = KeystoreConfig {
            language: Language::Czech,
            word_count: 18,
            key_file_name: "wallet.xmn".into(),
            m_cost: 1024,
            t_cost: 2,
            p_cost: 2,
        };
        let context = AccountContext::from_config("/data", &config)?;
        assert_eq!(context.language, Language::Czech);
        assert_eq!(context.word_count, WordCount::Eighteen);
        assert_eq!(context.kdf.p_cost, 2);
        assert_eq!(context.key_file_path(), PathBuf::from("/data/wallet.xmn"));
        Ok(())
    }

    #[test]
    fn context_rejects_invalid_config() {
        let config = KeystoreConfig {
            word_count: 7,
            ..KeystoreConfig::default()
        };
        assert!(matches!(
            AccountContext::from_config("/data", &config),
            Err(XmnError::ConfigError { .. })
        ));
    }
}
