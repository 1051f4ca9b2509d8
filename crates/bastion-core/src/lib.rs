#![deny(missing_docs)]

//! # bastion-core — Foundational Types for the Bastion Perimeter
//!
//! Every other crate in the workspace depends on this one. It has no internal
//! crate dependencies — only `serde`, `serde_json`, `thiserror`, and `uuid`.
//!
//! ## Design Principles
//!
//! 1. **Validated newtypes for identity primitives.** A [`Username`] can only be
//!    constructed through validation, so every value that reaches the token
//!    codec or the `X-User-Name` header is already known to be header-safe.
//!
//! 2. **Password material is opaque.** [`PasswordHash`] never exposes itself
//!    through `Debug`, and no type in this crate carries plaintext passwords.
//!
//! 3. **One response envelope.** [`ApiResult`] is the single JSON shape used
//!    by the login endpoint and by every error the perimeter emits.
//!
//! 4. **[`BastionError`] hierarchy.** Structured errors with `thiserror`, no
//!    `.unwrap()` outside tests.

pub mod envelope;
pub mod error;
pub mod identity;
pub mod role;
pub mod user;

pub use envelope::ApiResult;
pub use error::{BastionError, ValidationError};
pub use identity::{AuthenticatedIdentity, Email, UserId, Username, USER_NAME_HEADER};
pub use role::Role;
pub use user::{PasswordHash, User};
