//! # Token Subcommand
//!
//! Mint and inspect bearer tokens. Both read the shared secret from
//! `BASTION_JWT_SECRET` so it never appears on the command line.

use std::io::Write;

use anyhow::{Context, Result};
use bastion_crypto::{TokenCodec, TokenError, TokenTtl};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde_json::json;

use crate::SECRET_ENV;

/// Arguments for `bastion token`.
#[derive(Args, Debug)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands.
#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Mint a token for a subject.
    Mint {
        /// Username to embed as the subject.
        #[arg(long)]
        subject: String,
        /// Token lifetime in seconds.
        #[arg(long, default_value_t = TokenTtl::DEFAULT_SECS)]
        ttl_secs: u64,
    },

    /// Verify a token and print its claims. Exits 1 if it does not verify.
    Inspect {
        /// The compact token (without the `Bearer ` prefix).
        #[arg(value_name = "TOKEN")]
        token: String,
    },
}

/// Execute the token subcommand.
pub fn run_token(args: &TokenArgs) -> Result<u8> {
    let secret = std::env::var(SECRET_ENV)
        .with_context(|| format!("{SECRET_ENV} must be set to mint or inspect tokens"))?;
    let codec = TokenCodec::new(secret.as_bytes())?;
    let mut out = std::io::stdout();
    match &args.command {
        TokenCommand::Mint { subject, ttl_secs } => {
            cmd_mint(&codec, subject, *ttl_secs, Utc::now(), &mut out)
        }
        TokenCommand::Inspect { token } => cmd_inspect(&codec, token, Utc::now(), &mut out),
    }
}

fn cmd_mint(
    codec: &TokenCodec,
    subject: &str,
    ttl_secs: u64,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<u8> {
    let ttl = TokenTtl::from_secs(ttl_secs)?;
    let token = codec.mint(subject, now, ttl)?;
    tracing::info!(subject, ttl_secs, "minted token");
    writeln!(out, "{token}")?;
    Ok(0)
}

fn cmd_inspect(
    codec: &TokenCodec,
    token: &str,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<u8> {
    let token = token.trim().trim_start_matches("Bearer ");
    let claims = match codec.parse(token) {
        Ok(claims) => claims,
        Err(e) => {
            writeln!(out, "INVALID: {e}")?;
            return Ok(1);
        }
    };
    let expired = matches!(codec.verify(token, now), Err(TokenError::Expired { .. }));
    let report = json!({
        "sub": claims.subject(),
        "iat": claims.issued_at().to_rfc3339(),
        "exp": claims.expires_at().to_rfc3339(),
        "expired": expired,
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(if expired { 1 } else { 0 })
}
