//! # Secret Generation Subcommand

use std::io::Write;

use anyhow::{bail, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use clap::Args;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

/// Smallest secret the CLI will generate.
const MIN_BYTES: usize = 32;

/// Arguments for `bastion gen-secret`.
#[derive(Args, Debug)]
pub struct GenSecretArgs {
    /// Number of random bytes before encoding.
    #[arg(long, default_value_t = 48)]
    pub bytes: usize,
}

/// Print a random base64url signing secret.
pub fn run_gen_secret(args: &GenSecretArgs) -> Result<u8> {
    cmd_gen_secret(args.bytes, &mut std::io::stdout())
}

fn cmd_gen_secret(bytes: usize, out: &mut impl Write) -> Result<u8> {
    if !(MIN_BYTES..=1024).contains(&bytes) {
        bail!("--bytes must be between {MIN_BYTES} and 1024, got {bytes}");
    }
    let mut raw = Zeroizing::new(vec![0u8; bytes]);
    OsRng.fill_bytes(raw.as_mut_slice());
    writeln!(out, "{}", URL_SAFE_NO_PAD.encode(raw.as_slice()))?;
    Ok(0)
}
