//! # Error Hierarchy
//!
//! Structured error types shared across the perimeter, built with `thiserror`.
//! Subsystem crates define their own error enums (crypto, store, gateway) and
//! convert into [`BastionError`] where a single top-level type is convenient.

use thiserror::Error;

/// Top-level error type for the Bastion workspace.
#[derive(Error, Debug)]
pub enum BastionError {
    /// Domain primitive validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Cryptographic operation failure (hashing, MAC computation).
    #[error("cryptographic error: {0}")]
    Cryptographic(String),

    /// Credential store failure.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors for domain primitive newtypes.
///
/// Each variant carries the rejected input (never a password) so operators
/// can diagnose bad seed data or malformed requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Username is empty.
    #[error("username must be non-empty")]
    EmptyUsername,

    /// Username exceeds the maximum length.
    #[error("username \"{value}\" is {len} bytes, maximum is {max}")]
    UsernameTooLong {
        /// The rejected username.
        value: String,
        /// Its length in bytes.
        len: usize,
        /// The maximum permitted length.
        max: usize,
    },

    /// Username contains whitespace, control, or non-visible-ASCII characters.
    #[error("username \"{0}\" contains characters that are not visible ASCII")]
    UsernameCharset(String),

    /// Role label is empty after trimming.
    #[error("role label must be non-empty")]
    EmptyRole,

    /// Email address is not of the form local@domain.
    #[error("invalid email address: \"{0}\"")]
    InvalidEmail(String),

    /// A user must carry at least one role.
    #[error("user \"{0}\" must have at least one role")]
    NoRoles(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_converts_into_top_level() {
        let err: BastionError = ValidationError::EmptyUsername.into();
        assert!(matches!(err, BastionError::Validation(_)));
        assert!(format!("{err}").contains("username must be non-empty"));
    }

    #[test]
    fn username_too_long_reports_lengths() {
        let err = ValidationError::UsernameTooLong {
            value: "x".repeat(70),
            len: 70,
            max: 64,
        };
        let msg = format!("{err}");
        assert!(msg.contains("70 bytes"));
        assert!(msg.contains("maximum is 64"));
    }

    #[test]
    fn cryptographic_display() {
        let err = BastionError::Cryptographic("bad cost".to_string());
        assert_eq!(format!("{err}"), "cryptographic error: bad cost");
    }

    #[test]
    fn json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BastionError = json_err.into();
        assert!(format!("{err}").starts_with("JSON error"));
    }
}
