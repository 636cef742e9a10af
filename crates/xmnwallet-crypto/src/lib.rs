//! Cryptographic primitives for the XMN key core.
//!
//! This crate is the only place in the workspace that touches raw
//! cryptography. The keystore crate composes these pieces into the
//! `key.xmn` file operations.
//!
//! # Modules
//!
//! - [`wordlist`]: registered 2048-word lists and index lookup
//! - [`mnemonic`]: entropy ↔ mnemonic mapping with checksum validation
//! - [`kdf`]: Argon2id derivation of the file encryption key from seed words
//! - [`aead`]: XChaCha20-Poly1305 authenticated encryption/decryption
//! - [`signing`]: Ed25519 private key material, signing and verification
//! - [`hash`]: SHA3-256 hashing

pub mod aead;
pub mod hash;
pub mod kdf;
pub mod mnemonic;
pub mod signing;
pub mod wordlist;
