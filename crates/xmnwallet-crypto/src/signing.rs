//! Ed25519 private key material.
//!
//! The key file protects one independently generated Ed25519 seed. This
//! module generates it, checks that decrypted bytes really form a
//! private key, derives the public key, and signs/verifies messages. The
//! seed is zeroized on drop via `ed25519-dalek`'s `ZeroizeOnDrop`.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use xmnwallet_types::{Result, XmnError};
use zeroize::Zeroizing;

use crate::hash::sha3_256;

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// Ed25519 public key (32 bytes), displayed as lowercase hex.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Fixed byte length of an Ed25519 public key.
    pub const LEN: usize = 32;

    /// Creates a [`PublicKey`] from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 32-byte array.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for PublicKey {
    type Err = XmnError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        decode_hex_array(s, "public key").map(Self)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Ed25519 signature (64 bytes), displayed as lowercase hex.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Signature([u8; 64]);

impl Signature {
    /// Fixed byte length of an Ed25519 signature.
    pub const LEN: usize = 64;

    /// Creates a [`Signature`] from raw bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 64-byte array.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Signature {
    type Err = XmnError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        decode_hex_array(s, "signature").map(Self)
    }
}

fn decode_hex_array<const N: usize>(s: &str, what: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(s.trim()).map_err(|e| XmnError::CryptoError {
        reason: format!("invalid {what} hex: {e}"),
    })?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| XmnError::CryptoError {
        reason: format!("{what} must be {N} bytes, got {}", bytes.len()),
    })
}

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// Ed25519 private key (32-byte seed).
pub struct PrivateKey {
    signing_key: SigningKey,
}

impl PrivateKey {
    /// Fixed byte length of a private key seed.
    pub const LEN: usize = 32;

    /// Generates a new random private key using OS-level entropy.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Interprets `bytes` as an Ed25519 seed.
    ///
    /// # Errors
    ///
    /// Returns [`XmnError::InvalidPrivateKey`] if `bytes` is not exactly
    /// 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let seed: Zeroizing<[u8; 32]> = Zeroizing::new(bytes.try_into().map_err(|_| {
            XmnError::InvalidPrivateKey {
                reason: format!("expected {} bytes, got {}", Self::LEN, bytes.len()),
            }
        })?);
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    /// Returns a copy of the seed in a zeroizing buffer.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    /// Returns the matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Signs `message`. Deterministic per RFC 8032.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

// PrivateKey intentionally does not implement Clone or Debug.

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Verifies an Ed25519 signature against a public key and message.
///
/// # Errors
///
/// Returns [`XmnError::SignatureInvalid`] if the public key is not a
/// valid curve point or the signature does not verify.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> Result<()> {
    let vk = VerifyingKey::from_bytes(&public_key.0).map_err(|e| XmnError::SignatureInvalid {
        reason: format!("invalid public key: {e}"),
    })?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify_strict(message, &sig)
        .map_err(|e| XmnError::SignatureInvalid {
            reason: format!("verification failed: {e}"),
        })
}

/// Short account identifier: hex of the first 8 bytes of
/// `SHA3-256(public_key)`.
pub fn fingerprint(public_key: &PublicKey) -> String {
    hex::encode(&sha3_256(&public_key.0)[..8])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
