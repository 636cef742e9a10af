//! XChaCha20-Poly1305 authenticated encryption.
//!
//! Every seal draws a fresh 192-bit nonce from OS entropy. Decryption
//! failures of any kind collapse into [`XmnError::AuthenticationFailed`]
//! so callers cannot tell a wrong key from tampered data.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use xmnwallet_types::{Result, XmnError};
use zeroize::Zeroizing;

use crate::kdf::DerivedKey;

/// Length of the Poly1305 authentication tag appended to ciphertexts.
pub const TAG_LEN: usize = 16;

// ---------------------------------------------------------------------------
// AeadNonce
// ---------------------------------------------------------------------------

/// 192-bit (24-byte) nonce for XChaCha20-Poly1305.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AeadNonce([u8; 24]);

impl AeadNonce {
    /// Fixed byte length of an XChaCha20-Poly1305 nonce.
    pub const LEN: usize = 24;

    /// Creates an [`AeadNonce`] from raw bytes.
    pub fn from_bytes(bytes: [u8; 24]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 24-byte array.
    pub fn as_bytes(&self) -> &[u8; 24] {
        &self.0
    }
}

/// Generates a fresh random nonce from OS entropy.
pub fn generate_aead_nonce() -> AeadNonce {
    let mut bytes = [0u8; 24];
    OsRng.fill_bytes(&mut bytes);
    AeadNonce(bytes)
}

// ---------------------------------------------------------------------------
// EncryptedBlob
// ---------------------------------------------------------------------------

/// Nonce plus ciphertext (with the tag appended) produced by [`seal`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedBlob {
    /// Nonce used for this encryption.
    pub nonce: AeadNonce,
    /// Encrypted payload, `plaintext.len() + TAG_LEN` bytes.
    pub ciphertext: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Encrypt / Decrypt
// ---------------------------------------------------------------------------

/// Encrypts `plaintext` under `key` with an explicit nonce.
///
/// `aad` is authenticated but not encrypted; pass `&[]` if unused.
///
/// # Errors
///
/// Returns [`XmnError::CryptoError`] if the cipher rejects the input
/// (only possible for absurdly large plaintexts).
pub fn encrypt_xchacha20(
    key: &[u8; 32],
    nonce: &AeadNonce,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<EncryptedBlob> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let payload = Payload { msg: plaintext, aad };

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce.0), payload)
        .map_err(|e| XmnError::CryptoError {
            reason: format!("XChaCha20-Poly1305 encryption failed: {e}"),
        })?;

    Ok(EncryptedBlob {
        nonce: *nonce,
        ciphertext,
    })
}

/// Decrypts and authenticates `ciphertext`.
///
/// # Errors
///
/// Returns [`XmnError::AuthenticationFailed`] for a wrong key, nonce or
/// AAD, tampered bytes, or a ciphertext shorter than the tag.
pub fn decrypt_xchacha20(
    key: &[u8; 32],
    nonce: &AeadNonce,
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext.len() < TAG_LEN {
        return Err(XmnError::AuthenticationFailed);
    }

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let payload = Payload {
        msg: ciphertext,
        aad,
    };

    cipher
        .decrypt(XNonce::from_slice(&nonce.0), payload)
        .map(Zeroizing::new)
        .map_err(|_| XmnError::AuthenticationFailed)
}

/// Encrypts `plaintext` under a derived key with a fresh random nonce.
///
/// The key is only borrowed for the duration of the call.
pub fn seal(plaintext: &[u8], key: &DerivedKey, aad: &[u8]) -> Result<EncryptedBlob> {
    encrypt_xchacha20(key.as_bytes(), &generate_aead_nonce(), plaintext, aad)
}

/// Decrypts a blob produced by [`seal`].
///
/// An empty plaintext is a successful result, distinct from failure.
pub fn open(blob: &EncryptedBlob, key: &DerivedKey, aad: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    decrypt_xchacha20(key.as_bytes(), &blob.nonce, &blob.ciphertext, aad)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
