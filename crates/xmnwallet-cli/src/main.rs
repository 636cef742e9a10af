//! XMN wallet key tool.
//!
//! Generates seed words, creates and unlocks `key.xmn` files, and signs
//! with the protected key. All cryptography lives in the library crates;
//! this binary only parses arguments and formats results.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// XMN wallet: mnemonic-protected key files.
#[derive(Parser)]
#[command(name = "xmnwallet", version, about)]
struct Cli {
    /// Output in JSON format (no colors, machine-readable).
    #[arg(long, global = true)]
    json: bool,

    /// Path to a JSON keystore configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate new seed words.
    Generate(commands::mnemonic::GenerateArgs),
    /// Check the checksum of seed words.
    Validate(commands::mnemonic::ValidateArgs),
    /// Create a new account directory with an encrypted key file.
    Create(commands::key::CreateArgs),
    /// Decrypt a key file and show its public key.
    Decrypt(commands::key::DecryptArgs),
    /// Show the public header of a key file.
    Inspect(commands::key::InspectArgs),
    /// Sign a message with the key in a key file.
    Sign(commands::sign::SignArgs),
    /// Verify a signature against a public key.
    Verify(commands::sign::VerifyArgs),
}

// ---------------------------------------------------------------------------
// Global options passed to every command handler
// ---------------------------------------------------------------------------

/// Shared options threaded into command handlers.
pub struct GlobalOpts {
    pub json: bool,
    pub config: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let opts = GlobalOpts {
        json: cli.json,
        config: cli.config,
    };

    if let Err(e) = dispatch(&opts, cli.command) {
        output::print_error(&e, opts.json);
        std::process::exit(1);
    }
}

fn dispatch(opts: &GlobalOpts, cmd: Commands) -> std::result::Result<(), String> {
    match cmd {
        Commands::Generate(args) => commands::mnemonic::generate(args, opts),
        Commands::Validate(args) => commands::mnemonic::validate(args, opts),
        Commands::Create(args) => commands::key::create(args, opts),
        Commands::Decrypt(args) => commands::key::decrypt(args, opts),
        Commands::Inspect(args) => commands::key::inspect(args, opts),
        Commands::Sign(args) => commands::sign::sign(args, opts),
        Commands::Verify(args) => commands::sign::verify(args, opts),
    }
}
