//! # bastion CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bastion_cli::password::{run_hash_password, HashPasswordArgs};
use bastion_cli::secret::{run_gen_secret, GenSecretArgs};
use bastion_cli::token::{run_token, TokenArgs};

/// Bastion perimeter operator tooling.
#[derive(Parser, Debug)]
#[command(name = "bastion", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// bcrypt-hash a password read from stdin.
    HashPassword(HashPasswordArgs),

    /// Generate a random signing secret.
    GenSecret(GenSecretArgs),

    /// Mint or inspect bearer tokens.
    Token(TokenArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::HashPassword(args) => run_hash_password(args),
        Commands::GenSecret(args) => run_gen_secret(args),
        Commands::Token(args) => run_token(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
