//! `create`, `decrypt` and `inspect`.

use std::io::BufRead;
use std::path::PathBuf;

use clap::Args;
use zeroize::Zeroizing;

use xmnwallet_crypto::mnemonic::{self, Mnemonic};
use xmnwallet_keystore::account::{create_account, inspect_key_file, load_account, AccountContext};
use xmnwallet_keystore::backup::BackupFlow;

use crate::commands::split_words;
use crate::{config, output, GlobalOpts};

#[derive(Args)]
pub struct CreateArgs {
    /// Account directory; the key file is written inside it.
    #[arg(long)]
    pub dir: PathBuf,

    /// Existing seed words to protect the new key with. Generated when omitted.
    #[arg(long, num_args = 1..)]
    pub words: Option<Vec<String>>,

    /// Wordlist language for generated words.
    #[arg(long)]
    pub language: Option<String>,

    /// Number of generated words.
    #[arg(long)]
    pub count: Option<usize>,

    /// Show generated words first and require them to be re-entered on
    /// stdin before the key file is written.
    #[arg(long, conflicts_with = "words")]
    pub confirm: bool,
}

#[derive(Args)]
pub struct DecryptArgs {
    /// Key file to unlock.
    #[arg(long)]
    pub file: PathBuf,

    /// Seed words protecting the key file.
    #[arg(long, required = true, num_args = 1..)]
    pub words: Vec<String>,

    /// Also print the raw private key as hex.
    #[arg(long)]
    pub show_private: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Key file to read.
    #[arg(long)]
    pub file: PathBuf,
}

pub fn create(args: CreateArgs, opts: &GlobalOpts) -> std::result::Result<(), String> {
    let base = config::load(opts.config.as_deref())?;
    let config = config::merge(base, args.language.as_deref(), args.count)?;
    let context = AccountContext::from_config(&args.dir, &config).map_err(|e| e.to_string())?;

    let (mnemonic, show_words) = match args.words {
        Some(raw) => {
            let words = split_words(&raw);
            (Mnemonic::parse(words.as_slice()).map_err(|e| e.to_string())?, false)
        }
        None => {
            let generated = mnemonic::generate(context.language, context.word_count)
                .map_err(|e| e.to_string())?;
            if args.confirm {
                (confirm_backup(generated, opts.json)?, false)
            } else {
                (generated, true)
            }
        }
    };

    let account = create_account(&context, &mnemonic).map_err(|e| e.to_string())?;

    if opts.json {
        let mut obj = serde_json::json!({
            "path": account.path().display().to_string(),
            "public_key": account.public_key().to_string(),
            "fingerprint": account.fingerprint(),
        });
        if show_words {
            obj["words"] = serde_json::json!(mnemonic.words());
        }
        output::print_value(&obj, true);
        return Ok(());
    }

    output::print_success(
        &format!("key file written to {}", account.path().display()),
        false,
    );
    output::print_kv("public key", &account.public_key().to_string(), false);
    output::print_kv("fingerprint", &account.fingerprint(), false);
    if show_words {
        println!();
        output::print_words(mnemonic.words(), false);
        output::print_warning(
            "write these words down; they are the only way to unlock the key file",
            false,
        );
    }
    Ok(())
}

/// Shows the words, then reads one line from stdin and checks it against
/// them. Nothing is written unless the words match.
fn confirm_backup(mnemonic: Mnemonic, json: bool) -> std::result::Result<Mnemonic, String> {
    let mut flow = BackupFlow::new(mnemonic);

    output::print_words(flow.words().map_err(|e| e.to_string())?, json);
    output::print_warning(
        "write these words down; they are the only way to unlock the key file",
        json,
    );
    flow.acknowledge_shown().map_err(|e| e.to_string())?;

    if !json {
        eprintln!("re-enter the words to confirm:");
    }
    let mut line = Zeroizing::new(String::new());
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| format!("failed to read confirmation words: {e}"))?;
    let entered = split_words(std::slice::from_ref(&*line));

    flow.confirm(entered.as_slice()).map_err(|e| e.to_string())?;
    flow.into_mnemonic().map_err(|e| e.to_string())
}

pub fn decrypt(args: DecryptArgs, opts: &GlobalOpts) -> std::result::Result<(), String> {
    let words = split_words(&args.words);
    let account = load_account(&args.file, words.as_slice()).map_err(|e| e.to_string())?;

    let private_hex = if args.show_private {
        let bytes = account.private_key_bytes();
        Some(Zeroizing::new(hex::encode(&bytes[..])))
    } else {
        None
    };

    if opts.json {
        let mut obj = serde_json::json!({
            "public_key": account.public_key().to_string(),
            "fingerprint": account.fingerprint(),
        });
        if let Some(secret) = &private_hex {
            obj["private_key"] = serde_json::json!(secret.as_str());
        }
        output::print_value(&obj, true);
        return Ok(());
    }

    output::print_success("key file unlocked", false);
    output::print_kv("public key", &account.public_key().to_string(), false);
    output::print_kv("fingerprint", &account.fingerprint(), false);
    if let Some(secret) = &private_hex {
        output::print_kv("private key", secret, false);
    }
    Ok(())
}

pub fn inspect(args: InspectArgs, opts: &GlobalOpts) -> std::result::Result<(), String> {
    let info = inspect_key_file(&args.file).map_err(|e| e.to_string())?;

    if opts.json {
        output::print_value(&info, true);
        return Ok(());
    }

    output::print_kv("version", &info.version.to_string(), false);
    output::print_kv("public key", &info.public_key, false);
    output::print_kv("fingerprint", &info.fingerprint, false);
    output::print_kv(
        "argon2id",
        &format!("m={} KiB, t={}, p={}", info.m_cost, info.t_cost, info.p_cost),
        false,
    );
    Ok(())
}
