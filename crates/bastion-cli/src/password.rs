//! # Password Hashing Subcommand

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use bastion_crypto::{BcryptHasher, PasswordHasher};
use clap::Args;
use zeroize::Zeroizing;

/// Arguments for `bastion hash-password`.
#[derive(Args, Debug)]
pub struct HashPasswordArgs {
    /// bcrypt work factor (4..=31).
    #[arg(long, default_value_t = BcryptHasher::DEFAULT_COST)]
    pub cost: u32,
}

/// Read one line from stdin and print its bcrypt hash.
pub fn run_hash_password(args: &HashPasswordArgs) -> Result<u8> {
    let stdin = std::io::stdin();
    let mut line = Zeroizing::new(String::new());
    stdin
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    cmd_hash(&line, args.cost, &mut std::io::stdout())
}

fn cmd_hash(input: &str, cost: u32, out: &mut impl Write) -> Result<u8> {
    let password = input.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("password must be non-empty");
    }
    let hasher = BcryptHasher::new(cost)?;
    let hash = hasher.hash(password)?;
    writeln!(out, "{}", hash.as_str())?;
    Ok(0)
}
