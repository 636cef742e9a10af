//! Mnemonic-protected private key storage for XMN accounts.
//!
//! - **Operations**: generate, validate, encrypt under and decrypt with
//!   seed words ([`keystore`])
//! - **File format**: the `key.xmn` layout and atomic persistence
//!   ([`key_file`])
//! - **Accounts**: create/load an account directory ([`account`])
//! - **Backup**: show-then-confirm flow for new seed words ([`backup`])

pub mod account;
pub mod backup;
pub mod key_file;
pub mod keystore;

pub use keystore::{
    decrypt_private_key, encrypt_private_key, encrypt_private_key_with, generate_mnemonic,
    validate_mnemonic,
};
