//! Binary `key.xmn` file format: serialization, validation and atomic
//! persistence.
//!
//! # File layout (version 1)
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//!   0       4   Magic bytes: b"XMNK"
//!   4       1   Version: 0x01
//!   5     100   Header body (bincode, little-endian):
//!                 m_cost    : u32 (4B)
//!                 t_cost    : u32 (4B)
//!                 p_cost    : u32 (4B)
//!                 salt      : [u8; 32]
//!                 nonce     : [u8; 24]
//!                 public_key: [u8; 32]
//! 105      48   Ciphertext: 32-byte private key + 16-byte Poly1305 tag
//! ```
//!
//! Bytes `0..105` are the associated data of the encryption, so any
//! header change fails authentication. Length, magic, version and the
//! Argon2 parameter bounds are verified before any cryptographic work.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use xmnwallet_crypto::aead::{AeadNonce, TAG_LEN};
use xmnwallet_crypto::kdf::{Argon2Params, SALT_LEN};
use xmnwallet_crypto::signing::{PrivateKey, PublicKey};
use xmnwallet_types::{Result, XmnError};

pub use xmnwallet_types::config::DEFAULT_KEY_FILE_NAME as KEY_FILE_NAME;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes identifying an XMN key file.
pub const KEY_FILE_MAGIC: [u8; 4] = *b"XMNK";

/// Current key file format version.
pub const KEY_FILE_VERSION: u8 = 1;

/// Bincode-serialized size of [`HeaderBody`]:
/// 3 × u32 (12) + [u8; 32] (32) + [u8; 24] (24) + [u8; 32] (32) = 100.
const HEADER_BODY_SIZE: usize = 12 + SALT_LEN + AeadNonce::LEN + PublicKey::LEN;

/// Header size: magic (4) + version (1) + body (100) = 105.
pub const HEADER_SIZE: usize = 4 + 1 + HEADER_BODY_SIZE;

/// Encrypted private key plus tag.
pub const CIPHERTEXT_SIZE: usize = PrivateKey::LEN + TAG_LEN;

/// Exact size of a version 1 key file.
pub const KEY_FILE_SIZE: usize = HEADER_SIZE + CIPHERTEXT_SIZE;

// ---------------------------------------------------------------------------
// KeyFile
// ---------------------------------------------------------------------------

/// In-memory form of a key file.
///
/// Holds no secret: the private key is only present encrypted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyFile {
    /// Argon2id parameters used to derive the encryption key.
    pub argon2_params: Argon2Params,
    /// Per-file random KDF salt.
    pub salt: [u8; SALT_LEN],
    /// XChaCha20-Poly1305 nonce.
    pub nonce: AeadNonce,
    /// Public key matching the encrypted private key.
    pub public_key: PublicKey,
    /// Encrypted private key with the tag appended.
    pub ciphertext: Vec<u8>,
}

/// Internal bincode-serializable representation of the header body.
#[derive(Serialize, Deserialize)]
struct HeaderBody {
    m_cost: u32,
    t_cost: u32,
    p_cost: u32,
    salt: [u8; 32],
    nonce: [u8; 24],
    public_key: [u8; 32],
}

impl From<&KeyFile> for HeaderBody {
    fn from(k: &KeyFile) -> Self {
        Self {
            m_cost: k.argon2_params.m_cost,
            t_cost: k.argon2_params.t_cost,
            p_cost: k.argon2_params.p_cost,
            salt: k.salt,
            nonce: *k.nonce.as_bytes(),
            public_key: *k.public_key.as_bytes(),
        }
    }
}

impl KeyFile {
    /// Format version of this file.
    pub fn version(&self) -> u8 {
        KEY_FILE_VERSION
    }

    /// Serializes magic, version and header body.
    ///
    /// These bytes are the associated data bound into the ciphertext.
    pub fn header_bytes(&self) -> Result<Vec<u8>> {
        let body = bincode::serialize(&HeaderBody::from(self)).map_err(|e| {
            XmnError::MalformedFile {
                reason: format!("failed to serialize key file header: {e}"),
            }
        })?;

        let mut header = Vec::with_capacity(HEADER_SIZE);
        header.extend_from_slice(&KEY_FILE_MAGIC);
        header.push(KEY_FILE_VERSION);
        header.extend_from_slice(&body);
        Ok(header)
    }
}

// ---------------------------------------------------------------------------
// Serialize / deserialize
// ---------------------------------------------------------------------------

/// Encodes a key file to its exact on-disk bytes.
///
/// # Errors
///
/// Returns [`XmnError::MalformedFile`] if the ciphertext is not
/// [`CIPHERTEXT_SIZE`] bytes long.
pub fn serialize(key_file: &KeyFile) -> Result<Vec<u8>> {
    if key_file.ciphertext.len() != CIPHERTEXT_SIZE {
        return Err(XmnError::MalformedFile {
            reason: format!(
                "ciphertext must be {CIPHERTEXT_SIZE} bytes, got {}",
                key_file.ciphertext.len()
            ),
        });
    }

    let mut data = key_file.header_bytes()?;
    data.extend_from_slice(&key_file.ciphertext);
    Ok(data)
}

/// Decodes and structurally validates key file bytes.
///
/// # Validation order
///
/// 1. Total length is exactly [`KEY_FILE_SIZE`].
/// 2. Magic bytes match `b"XMNK"`.
/// 3. Version byte is supported.
/// 4. Header body decodes.
/// 5. Argon2 parameters are within bounds.
///
/// # Errors
///
/// Returns [`XmnError::MalformedFile`] on the first failed check.
pub fn deserialize(data: &[u8]) -> Result<KeyFile> {
    if data.len() != KEY_FILE_SIZE {
        return Err(XmnError::MalformedFile {
            reason: format!("expected {KEY_FILE_SIZE} bytes, got {}", data.len()),
        });
    }

    if data[0..4] != KEY_FILE_MAGIC {
        return Err(XmnError::MalformedFile {
            reason: "magic mismatch: not an XMN key file".into(),
        });
    }

    let version = data[4];
    if version != KEY_FILE_VERSION {
        return Err(XmnError::MalformedFile {
            reason: format!("unsupported version {version} (expected {KEY_FILE_VERSION})"),
        });
    }

    let body: HeaderBody =
        bincode::deserialize(&data[5..HEADER_SIZE]).map_err(|e| XmnError::MalformedFile {
            reason: format!("failed to decode header: {e}"),
        })?;

    let argon2_params = Argon2Params {
        m_cost: body.m_cost,
        t_cost: body.t_cost,
        p_cost: body.p_cost,
    };
    argon2_params
        .validate()
        .map_err(|e| XmnError::MalformedFile {
            reason: format!("KDF parameters out of range: {e}"),
        })?;

    Ok(KeyFile {
        argon2_params,
        salt: body.salt,
        nonce: AeadNonce::from_bytes(body.nonce),
        public_key: PublicKey::from_bytes(body.public_key),
        ciphertext: data[HEADER_SIZE..].to_vec(),
    })
}

// ---------------------------------------------------------------------------
// Read / write
// ---------------------------------------------------------------------------

/// Writes a key file atomically, replacing any existing file.
///
/// The bytes go to `<path>.tmp` first, are fsynced, then renamed over
/// `path`, and the directory entry is synced. A reader therefore sees
/// either the old file or the complete new one. The temporary file is
/// removed if any step fails.
///
/// # Errors
///
/// - [`XmnError::MalformedFile`] if `key_file` cannot be serialized.
/// - [`XmnError::StorageError`] for any I/O failure.
pub fn write_key_file(path: &Path, key_file: &KeyFile) -> Result<()> {
    persist(path, key_file, Publish::Replace)
}

/// Writes a new key file atomically, never replacing an existing one.
///
/// Same as [`write_key_file`], except the temporary file is published
/// with a hard link, which fails if `path` already exists. The check and
/// the publish are one filesystem operation.
///
/// # Errors
///
/// - [`XmnError::StorageError`] if `path` already exists, or for any
///   other I/O failure.
/// - [`XmnError::MalformedFile`] if `key_file` cannot be serialized.
pub fn create_key_file(path: &Path, key_file: &KeyFile) -> Result<()> {
    persist(path, key_file, Publish::NoClobber)
}

#[derive(Clone, Copy)]
enum Publish {
    Replace,
    NoClobber,
}

fn persist(path: &Path, key_file: &KeyFile, publish: Publish) -> Result<()> {
    let data = serialize(key_file)?;
    let tmp_path = tmp_path_for(path);

    let result = write_and_sync(&tmp_path, &data).and_then(|()| match publish {
        Publish::Replace => fs::rename(&tmp_path, path).map_err(|e| XmnError::StorageError {
            reason: format!("failed to rename key file into place: {e}"),
        }),
        Publish::NoClobber => {
            let linked = fs::hard_link(&tmp_path, path).map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => XmnError::StorageError {
                    reason: format!("key file already exists at {}", path.display()),
                },
                _ => XmnError::StorageError {
                    reason: format!("failed to link key file into place: {e}"),
                },
            });
            // The temporary name is redundant once linked.
            let _ = fs::remove_file(&tmp_path);
            linked
        }
    });

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
        return result;
    }
    sync_parent_dir(path)?;

    tracing::info!(path = %path.display(), "key file saved");
    Ok(())
}

/// Reads and validates a key file from disk.
///
/// # Errors
///
/// - [`XmnError::StorageError`] if the file cannot be read.
/// - [`XmnError::MalformedFile`] from [`deserialize`].
pub fn read_key_file(path: &Path) -> Result<KeyFile> {
    let data = fs::read(path).map_err(|e| XmnError::StorageError {
        reason: format!("failed to read key file {}: {e}", path.display()),
    })?;

    let key_file = deserialize(&data)?;
    tracing::debug!(path = %path.display(), "key file loaded");
    Ok(key_file)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Flushes the directory entry created by a rename or link.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    File::open(parent)
        .and_then(|dir| dir.sync_all())
        .map_err(|e| XmnError::StorageError {
            reason: format!("failed to sync directory {}: {e}", parent.display()),
        })
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}

fn write_and_sync(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| XmnError::StorageError {
        reason: format!("failed to create {}: {e}", path.display()),
    })?;
    file.write_all(data).map_err(|e| XmnError::StorageError {
        reason: format!("failed to write key file: {e}"),
    })?;
    file.sync_all().map_err(|e| XmnError::StorageError {
        reason: format!("failed to sync key file: {e}"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
