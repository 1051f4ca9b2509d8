//! # bastion-crypto — Cryptographic Primitives for the Perimeter
//!
//! - **Password hashing** through the [`PasswordHasher`] trait, with a bcrypt
//!   implementation producing `$2a$` hashes.
//! - **Token codec** minting and verifying stateless HS256 bearer tokens
//!   (JWT compact serialization). Any process holding the shared secret can
//!   verify a token minted by any other process; nothing is stored.
//!
//! ## Security Invariants
//!
//! - MAC comparison is constant-time (`subtle`).
//! - The shared secret is zeroized on drop and never appears in `Debug`.
//! - Verification never panics on attacker-controlled input.

pub mod error;
pub mod password;
pub mod token;

pub use error::{CryptoError, TokenError, VerificationError};
pub use password::{BcryptHasher, PasswordHasher, MAX_PASSWORD_BYTES};
pub use token::{Claims, TokenCodec, TokenTtl};
