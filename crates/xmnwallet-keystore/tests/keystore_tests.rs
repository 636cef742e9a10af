//! Integration tests for xmnwallet-keystore.
//!
//! Mnemonics come from fixed entropy so assertions are deterministic;
//! only the per-file salt and nonce are random, which does not affect
//! any expected result.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use rand::{CryptoRng, RngCore};
use unicode_normalization::UnicodeNormalization;
use xmnwallet_crypto::kdf::Argon2Params;
use xmnwallet_crypto::mnemonic::{entropy_to_mnemonic, generate_with_rng};
use xmnwallet_crypto::signing::verify;
use xmnwallet_crypto::wordlist::wordlist;
use xmnwallet_keystore::account::{create_account, inspect_key_file, load_account, AccountContext};
use xmnwallet_keystore::backup::BackupFlow;
use xmnwallet_keystore::key_file::{
    create_key_file, deserialize, read_key_file, write_key_file, KEY_FILE_SIZE,
    KEY_FILE_VERSION,
};
use xmnwallet_keystore::{
    decrypt_private_key, encrypt_private_key_with, generate_mnemonic, validate_mnemonic,
};
use xmnwallet_types::{Language, WordCount, XmnError};

// ---------------------------------------------------------------------------
// Test constants
// ---------------------------------------------------------------------------

/// Mnemonic from all-0x7F 128-bit entropy.
const GOLDEN_WORDS: [&str; 12] = [
    "legal", "winner", "thank", "year", "wave", "sausage", "worth", "useful", "legal", "winner",
    "thank", "yellow",
];

/// Mnemonic from all-0x80 128-bit entropy.
const OTHER_WORDS: [&str; 12] = [
    "letter", "advice", "cage", "absurd", "amount", "doctor", "acoustic", "avoid", "letter",
    "advice", "cage", "above",
];

/// Known 32-byte test private key: 0x01, 0x02, ..., 0x20.
fn test_private_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    for (i, byte) in key.iter_mut().enumerate() {
        *byte = i as u8 + 1;
    }
    key
}

fn test_params() -> Argon2Params {
    Argon2Params {
        m_cost: 256,
        t_cost: 1,
        p_cost: 1,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// RAII guard that removes a temporary directory on drop.
struct TempDir(PathBuf);

impl TempDir {
    fn new(name: &str) -> Self {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "xmn_keystore_test_{name}_{}_{id}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&path);
        Self(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }

    fn file(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// Deterministic "RNG" repeating a single byte.
struct FixedRng(u8);

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        u32::from_ne_bytes([self.0; 4])
    }

    fn next_u64(&mut self) -> u64 {
        u64::from_ne_bytes([self.0; 8])
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(self.0);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for FixedRng {}

fn test_context(dir: &TempDir) -> AccountContext {
    let mut context = AccountContext::new(dir.path());
    context.kdf = test_params();
    context
}

// ---------------------------------------------------------------------------
// 1. The four operations
// ---------------------------------------------------------------------------

#[test]
fn golden_generate_encrypt_decrypt() -> std::result::Result<(), XmnError> {
    let mnemonic = generate_with_rng(&mut FixedRng(0x7F), Language::English, WordCount::Twelve)?;
    assert_eq!(mnemonic.words(), GOLDEN_WORDS.as_slice());

    let private_key = test_private_key();
    let blob = encrypt_private_key_with(mnemonic.words(), &private_key, &test_params())?;
    assert_eq!(blob.len(), KEY_FILE_SIZE);

    let recovered = decrypt_private_key(&blob, &GOLDEN_WORDS)?;
    assert_eq!(recovered.as_slice(), &private_key);
    Ok(())
}

#[test]
fn generated_words_encrypt_and_decrypt() -> std::result::Result<(), XmnError> {
    let words = generate_mnemonic("en", 12)?;
    assert!(validate_mnemonic(words.as_slice())?);

    let blob = encrypt_private_key_with(words.as_slice(), &test_private_key(), &test_params())?;
    let recovered = decrypt_private_key(&blob, words.as_slice())?;
    assert_eq!(recovered.as_slice(), &test_private_key());
    Ok(())
}

#[test]
fn other_mnemonic_fails_authentication() -> std::result::Result<(), XmnError> {
    let blob = encrypt_private_key_with(&GOLDEN_WORDS, &test_private_key(), &test_params())?;
    let result = decrypt_private_key(&blob, &OTHER_WORDS);
    assert!(matches!(result, Err(XmnError::AuthenticationFailed)));
    Ok(())
}

#[test]
fn one_changed_valid_word_fails_authentication() -> std::result::Result<(), XmnError> {
    let blob = encrypt_private_key_with(&GOLDEN_WORDS, &test_private_key(), &test_params())?;

    // Swap the first word for another list word that keeps the checksum
    // valid, so the failure has to come from decryption.
    let mut changed: Vec<&str> = GOLDEN_WORDS.to_vec();
    let mut found = false;
    for candidate in wordlist(Language::English).iter() {
        if *candidate == GOLDEN_WORDS[0] {
            continue;
        }
        changed[0] = *candidate;
        if validate_mnemonic(&changed)? {
            found = true;
            break;
        }
    }
    assert!(found, "no checksum-preserving substitute found");

    let result = decrypt_private_key(&blob, &changed);
    assert!(matches!(result, Err(XmnError::AuthenticationFailed)));

    // The original words still work afterwards.
    assert_eq!(
        decrypt_private_key(&blob, &GOLDEN_WORDS)?.as_slice(),
        &test_private_key()
    );
    Ok(())
}

#[test]
fn mistyped_word_is_checksum_error() -> std::result::Result<(), XmnError> {
    let blob = encrypt_private_key_with(&GOLDEN_WORDS, &test_private_key(), &test_params())?;
    let mut words = GOLDEN_WORDS;
    words[0] = "abandon";
    assert!(matches!(
        decrypt_private_key(&blob, &words),
        Err(XmnError::ChecksumMismatch)
    ));
    Ok(())
}

#[test]
fn every_single_byte_mutation_is_detected() -> std::result::Result<(), XmnError> {
    let blob = encrypt_private_key_with(&GOLDEN_WORDS, &test_private_key(), &test_params())?;

    for i in 0..blob.len() {
        let mut tampered = blob.clone();
        tampered[i] ^= 0x01;
        match decrypt_private_key(&tampered, &GOLDEN_WORDS) {
            Err(XmnError::MalformedFile { .. }) | Err(XmnError::AuthenticationFailed) => {}
            Err(other) => panic!("byte {i}: unexpected error {other}"),
            Ok(_) => panic!("byte {i}: tampered file decrypted"),
        }
    }
    Ok(())
}

#[test]
fn validate_detects_altered_checksum_word() -> std::result::Result<(), XmnError> {
    assert!(validate_mnemonic(&GOLDEN_WORDS)?);

    let mut words = GOLDEN_WORDS;
    words[11] = "zoo";
    assert!(!validate_mnemonic(&words)?);
    Ok(())
}

#[test]
fn validate_accepts_other_languages() -> std::result::Result<(), XmnError> {
    let korean = entropy_to_mnemonic(&[0x42; 20], Language::Korean)?;
    assert!(validate_mnemonic(korean.words())?);

    let blob = encrypt_private_key_with(korean.words(), &test_private_key(), &test_params())?;
    assert_eq!(
        decrypt_private_key(&blob, korean.words())?.as_slice(),
        &test_private_key()
    );
    Ok(())
}

/// Re-types words the way a keyboard or IME would: precomposed (NFC).
fn typed(words: &[String]) -> Vec<String> {
    words.iter().map(|w| w.nfc().collect()).collect()
}

#[test]
fn precomposed_spanish_words_decrypt() -> std::result::Result<(), XmnError> {
    let spanish = entropy_to_mnemonic(&[0x00; 16], Language::Spanish)?;
    let blob = encrypt_private_key_with(spanish.words(), &test_private_key(), &test_params())?;

    let entered = typed(spanish.words());
    assert_eq!(entered[0], "\u{e1}baco");
    assert!(validate_mnemonic(entered.as_slice())?);
    assert_eq!(
        decrypt_private_key(&blob, entered.as_slice())?.as_slice(),
        &test_private_key()
    );
    Ok(())
}

#[test]
fn precomposed_japanese_words_decrypt() -> std::result::Result<(), XmnError> {
    let japanese = (0..=u8::MAX)
        .map(|byte| generate_with_rng(&mut FixedRng(byte), Language::Japanese, WordCount::Twelve))
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .find(|m| typed(m.words()).as_slice() != m.words());
    let Some(japanese) = japanese else {
        panic!("no fixed entropy produced a word with a voiced mark");
    };

    let blob = encrypt_private_key_with(japanese.words(), &test_private_key(), &test_params())?;
    let entered = typed(japanese.words());
    assert_eq!(
        decrypt_private_key(&blob, entered.as_slice())?.as_slice(),
        &test_private_key()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// 2. Key file persistence
// ---------------------------------------------------------------------------

#[test]
fn key_file_write_read_roundtrip() -> std::result::Result<(), XmnError> {
    let dir = TempDir::new("roundtrip");
    std::fs::create_dir_all(dir.path()).map_err(|e| XmnError::StorageError {
        reason: e.to_string(),
    })?;
    let path = dir.file("key.xmn");

    let blob = encrypt_private_key_with(&GOLDEN_WORDS, &test_private_key(), &test_params())?;
    let key_file = deserialize(&blob)?;
    write_key_file(&path, &key_file)?;

    let on_disk = std::fs::read(&path).map_err(|e| XmnError::StorageError {
        reason: e.to_string(),
    })?;
    assert_eq!(on_disk, blob);
    assert_eq!(read_key_file(&path)?, key_file);
    assert!(!dir.file("key.xmn.tmp").exists());
    Ok(())
}

#[test]
fn key_file_overwrite_replaces_content() -> std::result::Result<(), XmnError> {
    let dir = TempDir::new("overwrite");
    std::fs::create_dir_all(dir.path()).map_err(|e| XmnError::StorageError {
        reason: e.to_string(),
    })?;
    let path = dir.file("key.xmn");

    let first = deserialize(&encrypt_private_key_with(
        &GOLDEN_WORDS,
        &test_private_key(),
        &test_params(),
    )?)?;
    let second = deserialize(&encrypt_private_key_with(
        &OTHER_WORDS,
        &test_private_key(),
        &test_params(),
    )?)?;

    write_key_file(&path, &first)?;
    write_key_file(&path, &second)?;
    assert_eq!(read_key_file(&path)?, second);
    Ok(())
}

#[test]
fn create_key_file_never_replaces() -> std::result::Result<(), XmnError> {
    let dir = TempDir::new("no_clobber");
    std::fs::create_dir_all(dir.path()).map_err(|e| XmnError::StorageError {
        reason: e.to_string(),
    })?;
    let path = dir.file("key.xmn");

    let first = deserialize(&encrypt_private_key_with(
        &GOLDEN_WORDS,
        &test_private_key(),
        &test_params(),
    )?)?;
    let second = deserialize(&encrypt_private_key_with(
        &OTHER_WORDS,
        &test_private_key(),
        &test_params(),
    )?)?;

    create_key_file(&path, &first)?;
    assert!(!dir.file("key.xmn.tmp").exists());

    let result = create_key_file(&path, &second);
    assert!(matches!(result, Err(XmnError::StorageError { .. })));
    assert_eq!(read_key_file(&path)?, first);
    assert!(!dir.file("key.xmn.tmp").exists());
    Ok(())
}

#[test]
fn create_key_file_refuses_foreign_file() -> std::result::Result<(), XmnError> {
    let dir = TempDir::new("foreign");
    std::fs::create_dir_all(dir.path()).map_err(|e| XmnError::StorageError {
        reason: e.to_string(),
    })?;
    let path = dir.file("key.xmn");
    std::fs::write(&path, b"not a key file").map_err(|e| XmnError::StorageError {
        reason: e.to_string(),
    })?;

    let key_file = deserialize(&encrypt_private_key_with(
        &GOLDEN_WORDS,
        &test_private_key(),
        &test_params(),
    )?)?;
    let result = create_key_file(&path, &key_file);
    match result {
        Err(XmnError::StorageError { reason }) => assert!(reason.contains("already exists")),
        other => panic!("expected StorageError, got {other:?}"),
    }

    let untouched = std::fs::read(&path).map_err(|e| XmnError::StorageError {
        reason: e.to_string(),
    })?;
    assert_eq!(untouched, b"not a key file");
    Ok(())
}

#[test]
fn failed_write_leaves_nothing_behind() {
    let dir = TempDir::new("missing_dir");
    let path = dir.file("key.xmn");
    let key_file = match encrypt_private_key_with(&GOLDEN_WORDS, &test_private_key(), &test_params())
        .and_then(|blob| deserialize(&blob))
    {
        Ok(k) => k,
        Err(e) => panic!("setup failed: {e}"),
    };

    // Parent directory does not exist.
    let result = write_key_file(&path, &key_file);
    assert!(matches!(result, Err(XmnError::StorageError { .. })));
    assert!(!path.exists());
    assert!(!dir.file("key.xmn.tmp").exists());
}

#[test]
fn missing_file_is_storage_error() {
    let dir = TempDir::new("missing_file");
    assert!(matches!(
        read_key_file(&dir.file("key.xmn")),
        Err(XmnError::StorageError { .. })
    ));
}

#[test]
fn truncated_file_is_malformed() -> std::result::Result<(), XmnError> {
    let dir = TempDir::new("truncated");
    std::fs::create_dir_all(dir.path()).map_err(|e| XmnError::StorageError {
        reason: e.to_string(),
    })?;
    let path = dir.file("key.xmn");

    let blob = encrypt_private_key_with(&GOLDEN_WORDS, &test_private_key(), &test_params())?;
    std::fs::write(&path, &blob[..100]).map_err(|e| XmnError::StorageError {
        reason: e.to_string(),
    })?;
    assert!(matches!(read_key_file(&path), Err(XmnError::MalformedFile { .. })));
    Ok(())
}

// ---------------------------------------------------------------------------
// 3. Accounts
// ---------------------------------------------------------------------------

#[test]
fn create_load_sign_cycle() -> std::result::Result<(), XmnError> {
    let dir = TempDir::new("account");
    let context = test_context(&dir);
    let mnemonic = entropy_to_mnemonic(&[0x7F; 16], Language::English)?;

    let created = create_account(&context, &mnemonic)?;
    assert_eq!(created.path(), context.key_file_path());

    let loaded = load_account(&context.key_file_path(), &GOLDEN_WORDS)?;
    assert_eq!(loaded.public_key(), created.public_key());
    assert_eq!(loaded.fingerprint(), created.fingerprint());
    assert_eq!(*loaded.private_key_bytes(), *created.private_key_bytes());

    let sig = loaded.sign(b"transfer 10 XMN");
    verify(&created.public_key(), b"transfer 10 XMN", &sig)?;
    Ok(())
}

#[test]
fn create_refuses_to_overwrite() -> std::result::Result<(), XmnError> {
    let dir = TempDir::new("no_overwrite");
    let context = test_context(&dir);
    let mnemonic = entropy_to_mnemonic(&[0x7F; 16], Language::English)?;

    let first = create_account(&context, &mnemonic)?;
    let second = create_account(&context, &mnemonic);
    assert!(matches!(second, Err(XmnError::StorageError { .. })));

    // Original file untouched.
    let loaded = load_account(&context.key_file_path(), &GOLDEN_WORDS)?;
    assert_eq!(loaded.public_key(), first.public_key());
    Ok(())
}

#[test]
fn load_with_wrong_words_fails() -> std::result::Result<(), XmnError> {
    let dir = TempDir::new("wrong_words");
    let context = test_context(&dir);
    create_account(&context, &entropy_to_mnemonic(&[0x7F; 16], Language::English)?)?;

    let result = load_account(&context.key_file_path(), &OTHER_WORDS);
    assert!(matches!(result, Err(XmnError::AuthenticationFailed)));
    Ok(())
}

#[test]
fn inspect_reports_public_metadata() -> std::result::Result<(), XmnError> {
    let dir = TempDir::new("inspect");
    let context = test_context(&dir);
    let account = create_account(&context, &entropy_to_mnemonic(&[0x7F; 16], Language::English)?)?;

    let info = inspect_key_file(&context.key_file_path())?;
    assert_eq!(info.version, KEY_FILE_VERSION);
    assert_eq!(info.public_key, account.public_key().to_string());
    assert_eq!(info.fingerprint, account.fingerprint());
    assert_eq!((info.m_cost, info.t_cost, info.p_cost), (256, 1, 1));
    Ok(())
}

#[test]
fn backup_flow_then_create() -> std::result::Result<(), XmnError> {
    let dir = TempDir::new("backup");
    let context = test_context(&dir);

    let mut flow = BackupFlow::generate(context.language, context.word_count)?;
    let written_down: Vec<String> = flow.words()?.to_vec();
    flow.acknowledge_shown()?;
    flow.confirm(&written_down)?;
    let mnemonic = flow.into_mnemonic()?;

    let account = create_account(&context, &mnemonic)?;
    let loaded = load_account(&context.key_file_path(), &written_down)?;
    assert_eq!(loaded.public_key(), account.public_key());
    Ok(())
}
