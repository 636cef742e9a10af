//! `sign` and `verify`.

use std::path::PathBuf;

use clap::Args;

use xmnwallet_crypto::signing::{self, PublicKey, Signature};
use xmnwallet_keystore::account::load_account;

use crate::commands::split_words;
use crate::{output, GlobalOpts};

#[derive(Args)]
pub struct SignArgs {
    /// Key file holding the signing key.
    #[arg(long)]
    pub file: PathBuf,

    /// Seed words protecting the key file.
    #[arg(long, required = true, num_args = 1..)]
    pub words: Vec<String>,

    /// Message to sign (UTF-8).
    #[arg(long)]
    pub message: String,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Signer public key (64 hex chars).
    #[arg(long)]
    pub public_key: String,

    /// Signed message (UTF-8).
    #[arg(long)]
    pub message: String,

    /// Signature (128 hex chars).
    #[arg(long)]
    pub signature: String,
}

pub fn sign(args: SignArgs, opts: &GlobalOpts) -> std::result::Result<(), String> {
    let words = split_words(&args.words);
    let account = load_account(&args.file, words.as_slice()).map_err(|e| e.to_string())?;
    let signature = account.sign(args.message.as_bytes());

    if opts.json {
        output::print_value(
            &serde_json::json!({
                "public_key": account.public_key().to_string(),
                "signature": signature.to_string(),
            }),
            true,
        );
    } else {
        output::print_kv("public key", &account.public_key().to_string(), false);
        output::print_kv("signature", &signature.to_string(), false);
    }
    Ok(())
}

pub fn verify(args: VerifyArgs, opts: &GlobalOpts) -> std::result::Result<(), String> {
    let public_key = args
        .public_key
        .parse::<PublicKey>()
        .map_err(|e| e.to_string())?;
    let signature = args
        .signature
        .parse::<Signature>()
        .map_err(|e| e.to_string())?;

    signing::verify(&public_key, args.message.as_bytes(), &signature).map_err(|e| e.to_string())?;

    if opts.json {
        output::print_value(&serde_json::json!({ "valid": true }), true);
    } else {
        output::print_success("signature is valid", false);
    }
    Ok(())
}
