//! `generate` and `validate`.

use clap::Args;

use crate::commands::split_words;
use crate::{config, output, GlobalOpts};

#[derive(Args)]
pub struct GenerateArgs {
    /// Wordlist language tag (en, es, fr, it, pt, ja, ko, cs, zh-hans, zh-hant).
    #[arg(long)]
    pub language: Option<String>,

    /// Number of words (12, 15, 18, 21 or 24).
    #[arg(long = "words")]
    pub count: Option<usize>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Seed words, separate arguments or one quoted string.
    #[arg(required = true, num_args = 1..)]
    pub words: Vec<String>,
}

pub fn generate(args: GenerateArgs, opts: &GlobalOpts) -> std::result::Result<(), String> {
    let base = config::load(opts.config.as_deref())?;
    let config = config::merge(base, args.language.as_deref(), args.count)?;

    let words = xmnwallet_keystore::generate_mnemonic(config.language.tag(), config.word_count)
        .map_err(|e| e.to_string())?;

    output::print_words(&words, opts.json);
    output::print_warning(
        "write these words down; they are the only way to unlock the key file",
        opts.json,
    );
    Ok(())
}

pub fn validate(args: ValidateArgs, opts: &GlobalOpts) -> std::result::Result<(), String> {
    let words = split_words(&args.words);
    let valid = xmnwallet_keystore::validate_mnemonic(words.as_slice())
        .map_err(|e| e.to_string())?;

    if opts.json {
        output::print_value(&serde_json::json!({ "valid": valid }), true);
    }
    if !valid {
        return Err("mnemonic checksum does not match".into());
    }
    if !opts.json {
        output::print_success("mnemonic is valid", false);
    }
    Ok(())
}
