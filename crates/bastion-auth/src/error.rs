//! # Store and Login Errors

use bastion_core::{BastionError, Email, Username, ValidationError};
use bastion_crypto::CryptoError;
use thiserror::Error;

/// Errors from [`crate::CredentialStore::save`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// A new user was saved without a password.
    #[error("user \"{0}\" cannot be created without a password")]
    MissingPassword(Username),

    /// An empty string was supplied as the password.
    #[error("password for user \"{0}\" must be non-empty")]
    EmptyPassword(Username),

    /// The email address already belongs to a different user.
    #[error("email \"{0}\" is already registered to another user")]
    DuplicateEmail(Email),

    /// The draft failed domain validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Hashing the supplied password failed.
    #[error("could not hash password: {0}")]
    Hash(#[from] CryptoError),
}

impl From<StoreError> for BastionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(v) => Self::Validation(v),
            other => Self::Store(other.to_string()),
        }
    }
}

/// Why a login attempt did not produce a token.
///
/// `InvalidCredentials` and `AccountDisabled` are distinct for logging only;
/// callers see the same [`AuthFailure::public_message`] for both.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// Unknown username or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password matched but the account is disabled.
    #[error("account disabled")]
    AccountDisabled,

    /// Hashing, token minting, or task execution failed.
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

/// Text returned to the caller for both credential failures.
pub const BAD_CREDENTIALS_MESSAGE: &str = "invalid username or password";

impl AuthFailure {
    /// HTTP status the failure maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials | Self::AccountDisabled => 401,
            Self::Unexpected(_) => 500,
        }
    }

    /// Caller-visible message.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidCredentials | Self::AccountDisabled => BAD_CREDENTIALS_MESSAGE.to_string(),
            Self::Unexpected(detail) => format!("login failed: {detail}"),
        }
    }
}

impl From<CryptoError> for AuthFailure {
    fn from(err: CryptoError) -> Self {
        Self::Unexpected(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_look_identical() {
        let a = AuthFailure::InvalidCredentials;
        let b = AuthFailure::AccountDisabled;
        assert_eq!(a.status_code(), b.status_code());
        assert_eq!(a.public_message(), b.public_message());
        assert_eq!(a.status_code(), 401);
    }

    #[test]
    fn unexpected_is_500_with_detail() {
        let err = AuthFailure::Unexpected("hasher offline".into());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.public_message(), "login failed: hasher offline");
    }

    #[test]
    fn store_validation_maps_to_core_validation() {
        let err: BastionError = StoreError::Validation(ValidationError::EmptyRole).into();
        assert!(matches!(err, BastionError::Validation(_)));
        let err: BastionError =
            StoreError::MissingPassword(Username::new("dave").unwrap()).into();
        assert!(matches!(err, BastionError::Store(_)));
    }
}
