//! # Password Hashing
//!
//! One-way adaptive hashing for stored credentials. The credential store asks
//! [`PasswordHasher::is_hash`] whether an incoming password is already in
//! stored-hash format, so a hash is never hashed a second time.
//!
//! bcrypt only reads the first 72 bytes of its input. Longer passwords are
//! refused by [`BcryptHasher::hash`] and never verify, so two passwords that
//! share a 72-byte prefix cannot stand in for each other.

use bastion_core::PasswordHash;

use crate::error::CryptoError;

/// Longest plaintext bcrypt hashes in full.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes and verifies passwords.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password.
    fn hash(&self, plaintext: &str) -> Result<PasswordHash, CryptoError>;

    /// Check a plaintext password against a stored hash in constant time.
    ///
    /// A stored value that is not in this hasher's format verifies as `false`.
    fn verify(&self, plaintext: &str, hash: &PasswordHash) -> Result<bool, CryptoError>;

    /// Whether `candidate` already has the stored-hash format.
    fn is_hash(&self, candidate: &str) -> bool;
}

/// bcrypt hasher emitting the `$2a$` variant.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Work factor used when none is configured.
    pub const DEFAULT_COST: u32 = 10;

    /// Create a hasher with the given work factor.
    pub fn new(cost: u32) -> Result<Self, CryptoError> {
        if !(4..=31).contains(&cost) {
            return Err(CryptoError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    /// The configured work factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self {
            cost: Self::DEFAULT_COST,
        }
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> Result<PasswordHash, CryptoError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(CryptoError::PasswordTooLong);
        }
        let parts = bcrypt::hash_with_result(plaintext, self.cost)
            .map_err(|e| CryptoError::Hash(e.to_string()))?;
        Ok(PasswordHash::from_stored(
            parts.format_for_version(bcrypt::Version::TwoA),
        ))
    }

    fn verify(&self, plaintext: &str, hash: &PasswordHash) -> Result<bool, CryptoError> {
        if !self.is_hash(hash.as_str()) {
            tracing::warn!("stored password does not look like a bcrypt hash");
            return Ok(false);
        }
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }
        bcrypt::verify(plaintext, hash.as_str()).map_err(|e| CryptoError::Hash(e.to_string()))
    }

    fn is_hash(&self, candidate: &str) -> bool {
        let bytes = candidate.as_bytes();
        bytes.len() == 60
            && matches!(&bytes[..4], b"$2a$" | b"$2b$" | b"$2y$")
            && bytes[4].is_ascii_digit()
            && bytes[5].is_ascii_digit()
            && bytes[6] == b'$'
    }
}
