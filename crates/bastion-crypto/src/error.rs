//! # Cryptographic Error Types
//!
//! Structured errors for hashing, token minting, and token verification.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from hashing and key handling.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The password hash function failed.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Plaintext longer than bcrypt can hash without truncating.
    #[error("password exceeds {max} bytes", max = crate::password::MAX_PASSWORD_BYTES)]
    PasswordTooLong,

    /// bcrypt cost outside the supported range.
    #[error("invalid bcrypt cost {0}: expected 4..=31")]
    InvalidCost(u32),

    /// The token signing secret is unusable.
    #[error("invalid signing key: {0}")]
    Key(String),

    /// Token lifetime outside the supported range.
    #[error("invalid token ttl {0}s: expected 1..={max}s", max = crate::token::TokenTtl::MAX_SECS)]
    InvalidTtl(u64),

    /// Claims could not be serialized.
    #[error("token encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<CryptoError> for bastion_core::BastionError {
    fn from(err: CryptoError) -> Self {
        Self::Cryptographic(err.to_string())
    }
}

/// Why a presented token failed structural or signature verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// The token is not a well-formed HS256 compact token, or its payload
    /// does not decode into valid claims.
    #[error("malformed token: {0}")]
    Malformed(&'static str),

    /// The MAC does not match the header and payload under the configured secret.
    #[error("token signature mismatch")]
    BadSignature,
}

/// Outcome of full token validation (signature plus expiry).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signature or structure check failed.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// Signature is valid but the token is past its expiry.
    #[error("token expired at {expired_at}")]
    Expired {
        /// The embedded expiry instant.
        expired_at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_error_display() {
        assert_eq!(
            VerificationError::Malformed("bad base64").to_string(),
            "malformed token: bad base64"
        );
        assert_eq!(
            VerificationError::BadSignature.to_string(),
            "token signature mismatch"
        );
    }

    #[test]
    fn token_error_wraps_verification_transparently() {
        let err: TokenError = VerificationError::BadSignature.into();
        assert_eq!(err.to_string(), "token signature mismatch");
    }

    #[test]
    fn invalid_ttl_mentions_bounds() {
        let msg = CryptoError::InvalidTtl(0).to_string();
        assert!(msg.contains("0s"));
        assert!(msg.contains("1..="));
    }

    #[test]
    fn crypto_error_converts_to_core() {
        let core: bastion_core::BastionError = CryptoError::InvalidCost(2).into();
        assert!(core.to_string().contains("invalid bcrypt cost 2"));
    }
}
