//! # Identity Newtypes
//!
//! Validated wrappers for the identifiers the perimeter passes around.
//! You cannot hand an unchecked `String` to the credential store or put one
//! into the identity header: it has to become a [`Username`] first.
//!
//! ## Security Invariant
//!
//! A [`Username`] consists only of visible ASCII (`0x21..=0x7E`). Every
//! username is therefore a valid HTTP header value, and the edge can inject
//! it as `X-User-Name` without any escaping or lossy conversion.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Name of the header the edge injects to carry the authenticated principal.
///
/// Lowercase because HTTP/2 header names are lowercase on the wire; header
/// lookups are case-insensitive either way.
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Maximum username length in bytes.
const MAX_USERNAME_LEN: usize = 64;

/// Unique, immutable login name of a user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and wrap a username.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::EmptyUsername);
        }
        if value.len() > MAX_USERNAME_LEN {
            return Err(ValidationError::UsernameTooLong {
                len: value.len(),
                value,
                max: MAX_USERNAME_LEN,
            });
        }
        if !value.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(ValidationError::UsernameCharset(value));
        }
        Ok(Self(value))
    }

    /// Borrow the username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the newtype and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl std::str::FromStr for Username {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Surrogate identifier assigned by the credential store on first insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

/// Contact address of a user. Only used for uniqueness checks during onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and wrap an email address.
    ///
    /// Accepts `local@domain` with exactly one `@`, both parts non-empty, and
    /// no whitespace. Comparison is case-insensitive, so the value is stored
    /// lowercased.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        let mut parts = trimmed.split('@');
        let valid = match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !trimmed.chars().any(char::is_whitespace)
            }
            _ => false,
        };
        if !valid {
            return Err(ValidationError::InvalidEmail(value));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Borrow the email as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The principal established by the edge after a token verified.
///
/// Downstream services receive this through the `X-User-Name` header and
/// treat it as authoritative. They never re-verify the token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthenticatedIdentity {
    username: Username,
}

impl AuthenticatedIdentity {
    /// Wrap a verified username.
    pub fn new(username: Username) -> Self {
        Self { username }
    }

    /// The authenticated username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Header value to inject into forwarded requests.
    pub fn header_value(&self) -> &str {
        self.username.as_str()
    }
}

impl fmt::Display for AuthenticatedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.username.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn username_accepts_simple_names() {
        let name = Username::new("alice").unwrap();
        assert_eq!(name.as_str(), "alice");
        assert_eq!(name.to_string(), "alice");
    }

    #[test]
    fn username_rejects_empty() {
        assert_eq!(Username::new(""), Err(ValidationError::EmptyUsername));
    }

    #[test]
    fn username_rejects_whitespace_and_control() {
        assert!(matches!(
            Username::new("al ice"),
            Err(ValidationError::UsernameCharset(_))
        ));
        assert!(matches!(
            Username::new("bob\r\nX-User-Name: root"),
            Err(ValidationError::UsernameCharset(_))
        ));
        assert!(matches!(
            Username::new("zoë"),
            Err(ValidationError::UsernameCharset(_))
        ));
    }

    #[test]
    fn username_rejects_overlong() {
        let long = "a".repeat(65);
        assert!(matches!(
            Username::new(long),
            Err(ValidationError::UsernameTooLong { len: 65, max: 64, .. })
        ));
        assert!(Username::new("a".repeat(64)).is_ok());
    }

    #[test]
    fn username_is_case_sensitive() {
        assert_ne!(Username::new("Alice").unwrap(), Username::new("alice").unwrap());
    }

    #[test]
    fn username_serde_validates() {
        let ok: Username = serde_json::from_str("\"carol\"").unwrap();
        assert_eq!(ok.as_str(), "carol");
        assert!(serde_json::from_str::<Username>("\"\"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"carol\"");
    }

    #[test]
    fn email_normalises_case() {
        let email = Email::new("User@Example.COM").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[test]
    fn email_rejects_malformed() {
        for bad in ["", "plain", "@example.com", "user@", "a@b@c", "a b@c.d"] {
            assert!(Email::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn user_id_display_has_prefix() {
        let id = UserId::new();
        assert!(id.to_string().starts_with("user:"));
    }

    #[test]
    fn identity_header_value_is_username() {
        let identity = AuthenticatedIdentity::new(Username::new("dave").unwrap());
        assert_eq!(identity.header_value(), "dave");
        assert_eq!(identity.username().as_str(), "dave");
    }

    proptest! {
        #[test]
        fn every_valid_username_is_header_safe(name in "[!-~]{1,64}") {
            let username = Username::new(name.clone()).unwrap();
            prop_assert_eq!(username.as_str(), name.as_str());
            prop_assert!(username.as_str().bytes().all(|b| (0x21..=0x7e).contains(&b)));
        }
    }
}
