//! # bastion-cli — Operator Tooling for the Bastion Perimeter
//!
//! ## Subcommands
//!
//! - `bastion hash-password` — bcrypt-hash a password read from stdin, for
//!   provisioning credential stores.
//! - `bastion gen-secret` — generate a random signing secret.
//! - `bastion token mint` / `bastion token inspect` — mint and verify bearer
//!   tokens with the secret in `BASTION_JWT_SECRET`.
//!
//! Each `run_*` function returns the process exit code.

pub mod password;
pub mod secret;
pub mod token;

/// Environment variable holding the shared signing secret.
pub const SECRET_ENV: &str = "BASTION_JWT_SECRET";
