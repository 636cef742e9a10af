//! The four key-core operations exposed to front ends.
//!
//! Each call is independent and stateless: inputs in, typed result
//! out. Words are accepted as any `AsRef<str>` slice; the wordlist
//! language is detected from the words themselves. Every secret
//! intermediate (words, derived key, private key bytes) lives in a
//! zeroizing container and is wiped on success and error alike.

use xmnwallet_crypto::aead::{decrypt_xchacha20, encrypt_xchacha20, generate_aead_nonce};
use xmnwallet_crypto::kdf::{derive, Argon2Params, KdfContext};
use xmnwallet_crypto::mnemonic::{self, Mnemonic};
use xmnwallet_crypto::signing::{fingerprint, PrivateKey};
use xmnwallet_types::{Language, Result, WordCount, XmnError};
use zeroize::Zeroizing;

use crate::key_file::{self, KeyFile};

/// Generates a new random mnemonic.
///
/// # Errors
///
/// - [`XmnError::UnsupportedLanguage`] for an unknown language tag.
/// - [`XmnError::InvalidWordCount`] for a count other than 12, 15, 18,
///   21 or 24.
pub fn generate_mnemonic(language: &str, count: usize) -> Result<Zeroizing<Vec<String>>> {
    let language: Language = language.parse()?;
    let word_count = WordCount::from_count(count)?;

    let mnemonic = mnemonic::generate(language, word_count)?;
    Ok(Zeroizing::new(mnemonic.words().to_vec()))
}

/// Encrypts a 32-byte private key under `words` with the default
/// Argon2id cost and returns the serialized key file.
pub fn encrypt_private_key<S: AsRef<str>>(words: &[S], private_key: &[u8]) -> Result<Vec<u8>> {
    encrypt_private_key_with(words, private_key, &Argon2Params::default())
}

/// Same as [`encrypt_private_key`] with an explicit Argon2id cost.
///
/// # Errors
///
/// - Mnemonic validation errors ([`XmnError::ChecksumMismatch`],
///   [`XmnError::InvalidMnemonic`], [`XmnError::InvalidWordCount`]).
/// - [`XmnError::InvalidPrivateKey`] if `private_key` is not 32 bytes.
/// - [`XmnError::ConfigError`] if `params` are out of bounds.
pub fn encrypt_private_key_with<S: AsRef<str>>(
    words: &[S],
    private_key: &[u8],
    params: &Argon2Params,
) -> Result<Vec<u8>> {
    let mnemonic = Mnemonic::parse(words)?;
    let private_key = PrivateKey::from_bytes(private_key)?;

    let key_file = seal_key_file(&mnemonic, &private_key, params)?;
    key_file::serialize(&key_file)
}

/// Decrypts a serialized key file with `words` and returns the 32-byte
/// private key.
///
/// # Errors
///
/// - [`XmnError::MalformedFile`] if `blob` is structurally invalid.
///   Checked before the words are even looked at.
/// - Mnemonic validation errors for malformed or mistyped words.
/// - [`XmnError::AuthenticationFailed`] for valid words that are not the
///   right ones, or a tampered file.
pub fn decrypt_private_key<S: AsRef<str>>(blob: &[u8], words: &[S]) -> Result<Zeroizing<Vec<u8>>> {
    let key_file = key_file::deserialize(blob)?;
    let mnemonic = Mnemonic::parse(words)?;

    let private_key = open_key_file(&key_file, &mnemonic)?;
    Ok(Zeroizing::new(private_key.to_bytes().to_vec()))
}

/// Checks the words' checksum without decrypting anything.
///
/// Returns `Ok(false)` when every word is known but the checksum does
/// not match, the typical transcription error.
///
/// # Errors
///
/// [`XmnError::InvalidWordCount`] or [`XmnError::InvalidMnemonic`] for
/// input that is not a mnemonic at all.
pub fn validate_mnemonic<S: AsRef<str>>(words: &[S]) -> Result<bool> {
    match Mnemonic::parse(words) {
        Ok(_) => Ok(true),
        Err(XmnError::ChecksumMismatch) => Ok(false),
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// Shared by the account layer
// ---------------------------------------------------------------------------

/// Encrypts `private_key` under `mnemonic` into a fresh [`KeyFile`].
///
/// A new random KDF salt and nonce are drawn for every call.
pub(crate) fn seal_key_file(
    mnemonic: &Mnemonic,
    private_key: &PrivateKey,
    params: &Argon2Params,
) -> Result<KeyFile> {
    let context = KdfContext::random();
    let key = derive(mnemonic, &context, params)?;

    let mut key_file = KeyFile {
        argon2_params: *params,
        salt: *context.salt(),
        nonce: generate_aead_nonce(),
        public_key: private_key.public_key(),
        ciphertext: Vec::new(),
    };

    let aad = key_file.header_bytes()?;
    let encrypted = encrypt_xchacha20(
        key.as_bytes(),
        &key_file.nonce,
        private_key.to_bytes().as_slice(),
        &aad,
    )?;
    key_file.ciphertext = encrypted.ciphertext;

    tracing::debug!(
        fingerprint = %fingerprint(&key_file.public_key),
        m_cost = params.m_cost,
        t_cost = params.t_cost,
        p_cost = params.p_cost,
        "private key encrypted"
    );
    Ok(key_file)
}

/// Decrypts a [`KeyFile`] and checks the recovered key against the
/// stored public key.
///
/// Any failure after key derivation is reported as
/// [`XmnError::AuthenticationFailed`].
pub(crate) fn open_key_file(key_file: &KeyFile, mnemonic: &Mnemonic) -> Result<PrivateKey> {
    let context = KdfContext::new(key_file.salt);
    let key = derive(mnemonic, &context, &key_file.argon2_params)?;

    let aad = key_file.header_bytes()?;
    let plaintext = decrypt_xchacha20(key.as_bytes(), &key_file.nonce, &key_file.ciphertext, &aad)
        .inspect_err(|_| {
            tracing::debug!(
                fingerprint = %fingerprint(&key_file.public_key),
                "key file authentication failed"
            );
        })?;

    let private_key =
        PrivateKey::from_bytes(&plaintext).map_err(|_| XmnError::AuthenticationFailed)?;
    if private_key.public_key() != key_file.public_key {
        return Err(XmnError::AuthenticationFailed);
    }

    Ok(private_key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
