//! Argon2id key derivation from seed words.
//!
//! Derives a 256-bit encryption key from a mnemonic and a per-file
//! random salt using Argon2id (memory-hard, GPU-resistant). The words
//! are joined with `"|"` to form the password; the Argon2 salt binds the
//! file salt to a domain-separation string so keys derived for one
//! purpose are never valid for another.

use rand::rngs::OsRng;
use rand::RngCore;
use sha3::{Digest, Sha3_256};
use xmnwallet_types::{config, Result, XmnError};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::mnemonic::Mnemonic;

/// Separator placed between words when building the Argon2 password.
pub const WORD_SEPARATOR: &str = "|";

/// Domain string used for key files (format version 1).
pub const DEFAULT_DOMAIN: &str = "xmn/key-file/v1";

/// Length of the per-file random salt.
pub const SALT_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Argon2Params
// ---------------------------------------------------------------------------

/// Configurable parameters for the Argon2id key derivation function.
///
/// # Defaults
///
/// | Parameter | Default | Meaning |
/// |-----------|---------|---------|
/// | `m_cost`  | 65 536  | Memory usage in KiB (64 MiB) |
/// | `t_cost`  | 3       | Number of iterations |
/// | `p_cost`  | 1       | Degree of parallelism |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Argon2Params {
    /// Memory cost in KiB. Must be ≥ 8 × `p_cost` and ≤ [`Self::MAX_M_COST`].
    pub m_cost: u32,
    /// Time cost (number of passes). Between 1 and [`Self::MAX_T_COST`].
    pub t_cost: u32,
    /// Parallelism degree (lanes). Between 1 and [`Self::MAX_P_COST`].
    pub p_cost: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            m_cost: 65_536, // 64 MiB
            t_cost: 3,
            p_cost: 1,
        }
    }
}

impl Argon2Params {
    /// Upper bound on memory cost: 1 GiB.
    pub const MAX_M_COST: u32 = config::MAX_M_COST;
    /// Upper bound on passes.
    pub const MAX_T_COST: u32 = config::MAX_T_COST;
    /// Upper bound on lanes.
    pub const MAX_P_COST: u32 = config::MAX_P_COST;

    /// Checks the parameters against Argon2 minimums and the upper
    /// bounds above.
    ///
    /// Parameters read from a key file are untrusted; callers map this
    /// error to [`XmnError::MalformedFile`] in that case.
    ///
    /// # Errors
    ///
    /// Returns [`XmnError::ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.t_cost == 0 || self.t_cost > Self::MAX_T_COST {
            return Err(XmnError::ConfigError {
                reason: format!(
                    "t_cost must be between 1 and {}, got {}",
                    Self::MAX_T_COST,
                    self.t_cost
                ),
            });
        }

        if self.p_cost == 0 || self.p_cost > Self::MAX_P_COST {
            return Err(XmnError::ConfigError {
                reason: format!(
                    "p_cost must be between 1 and {}, got {}",
                    Self::MAX_P_COST,
                    self.p_cost
                ),
            });
        }

        if self.m_cost < 8 * self.p_cost || self.m_cost > Self::MAX_M_COST {
            return Err(XmnError::ConfigError {
                reason: format!(
                    "m_cost must be between {} and {} KiB, got {}",
                    8 * self.p_cost,
                    Self::MAX_M_COST,
                    self.m_cost
                ),
            });
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// KdfContext
// ---------------------------------------------------------------------------

/// Domain string and per-file salt mixed into every derivation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KdfContext {
    domain: String,
    salt: [u8; SALT_LEN],
}

impl KdfContext {
    /// Creates a context for `salt` under [`DEFAULT_DOMAIN`].
    pub fn new(salt: [u8; SALT_LEN]) -> Self {
        Self::with_domain(DEFAULT_DOMAIN, salt)
    }

    /// Creates a context with an explicit domain string.
    pub fn with_domain(domain: impl Into<String>, salt: [u8; SALT_LEN]) -> Self {
        Self {
            domain: domain.into(),
            salt,
        }
    }

    /// Creates a context with a fresh random salt from OS entropy.
    pub fn random() -> Self {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Self::new(salt)
    }

    /// Returns the domain string.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns the per-file salt.
    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// Salt actually passed to Argon2:
    /// `SHA3-256(u64_le(len(domain)) ‖ domain ‖ salt)`.
    fn argon2_salt(&self) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update((self.domain.len() as u64).to_le_bytes());
        hasher.update(self.domain.as_bytes());
        hasher.update(self.salt);
        hasher.finalize().into()
    }
}

// ---------------------------------------------------------------------------
// DerivedKey
// ---------------------------------------------------------------------------

/// 256-bit key derived by Argon2id.
///
/// Automatically zeroized when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; 32]);

impl DerivedKey {
    /// Fixed byte length of the derived key.
    pub const LEN: usize = 32;

    /// Returns the raw 32-byte key material.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// DerivedKey does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

/// Derives the encryption key for a validated mnemonic.
///
/// Deterministic: the same words, context and parameters always give
/// the same key.
pub fn derive(
    mnemonic: &Mnemonic,
    context: &KdfContext,
    params: &Argon2Params,
) -> Result<DerivedKey> {
    derive_from_words(mnemonic.words(), context, params)
}

/// Derives a key from raw words without checksum validation.
///
/// # Errors
///
/// - [`XmnError::InvalidMnemonic`] if `words` is empty.
/// - [`XmnError::ConfigError`] if `params` fail [`Argon2Params::validate`].
/// - [`XmnError::CryptoError`] if Argon2 itself fails.
pub fn derive_from_words<S: AsRef<str>>(
    words: &[S],
    context: &KdfContext,
    params: &Argon2Params,
) -> Result<DerivedKey> {
    if words.is_empty() {
        return Err(XmnError::InvalidMnemonic {
            reason: "cannot derive a key from an empty mnemonic".into(),
        });
    }
    params.validate()?;

    let password = Zeroizing::new(
        words
            .iter()
            .map(|w| w.as_ref())
            .collect::<Vec<&str>>()
            .join(WORD_SEPARATOR),
    );

    argon2id_derive_key(password.as_bytes(), &context.argon2_salt(), params)
}

/// Minimum acceptable salt length (the argon2 crate enforces ≥ 8 bytes).
const MIN_SALT_LEN: usize = 8;

/// Derives a 256-bit key from a password and salt using Argon2id v0x13.
///
/// # Errors
///
/// - [`XmnError::ConfigError`] if parameters are invalid or the salt is
///   too short.
/// - [`XmnError::CryptoError`] if the Argon2 computation fails.
pub fn argon2id_derive_key(
    password: &[u8],
    salt: &[u8],
    params: &Argon2Params,
) -> Result<DerivedKey> {
    if salt.len() < MIN_SALT_LEN {
        return Err(XmnError::ConfigError {
            reason: format!(
                "salt must be at least {MIN_SALT_LEN} bytes, got {}",
                salt.len()
            ),
        });
    }

    let argon2_params = argon2::Params::new(
        params.m_cost,
        params.t_cost,
        params.p_cost,
        Some(DerivedKey::LEN),
    )
    .map_err(|e| XmnError::ConfigError {
        reason: format!("invalid Argon2 parameters: {e}"),
    })?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut output = DerivedKey([0u8; 32]);
    argon2
        .hash_password_into(password, salt, &mut output.0)
        .map_err(|e| XmnError::CryptoError {
            reason: format!("Argon2id derivation failed: {e}"),
        })?;

    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
