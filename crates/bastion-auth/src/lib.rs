//! # bastion-auth — Credentials and Login
//!
//! The two halves of the perimeter that deal with passwords:
//!
//! - [`CredentialStore`]: the repository of [`bastion_core::User`] records.
//!   Lookups return `Option`, never an error, for an unknown username.
//! - [`Authenticator`]: checks a username/password pair against the store and
//!   mints a bearer token through [`bastion_crypto::TokenCodec`].
//!
//! Collaborators are passed in explicitly as `Arc<dyn Trait>`; nothing here
//! reaches for a global.

pub mod authenticator;
pub mod error;
pub mod seed;
pub mod store;

pub use authenticator::{Authenticator, IssuedToken};
pub use error::{AuthFailure, StoreError};
pub use seed::seed_default_users;
pub use store::{CredentialStore, MemoryCredentialStore, UserDraft};
