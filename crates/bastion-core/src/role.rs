//! # Role Labels
//!
//! Free-form role labels attached to a user. Order is irrelevant, so users
//! hold them in a `BTreeSet<Role>`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const AUTHORITY_PREFIX: &str = "ROLE_";

/// A non-empty role label such as `USER` or `ADMIN`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Role(String);

impl Role {
    /// Validate and wrap a role label. Surrounding whitespace is trimmed.
    pub fn new(label: impl AsRef<str>) -> Result<Self, ValidationError> {
        let label = label.as_ref().trim();
        if label.is_empty() {
            return Err(ValidationError::EmptyRole);
        }
        Ok(Self(label.to_string()))
    }

    /// The role label as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Granted-authority form, `ROLE_<label>`.
    ///
    /// A label that already carries the prefix is returned unchanged.
    pub fn authority(&self) -> String {
        if self.0.starts_with(AUTHORITY_PREFIX) {
            self.0.clone()
        } else {
            format!("{AUTHORITY_PREFIX}{}", self.0)
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_adds_prefix() {
        assert_eq!(Role::new("USER").unwrap().authority(), "ROLE_USER");
    }

    #[test]
    fn authority_keeps_existing_prefix() {
        assert_eq!(Role::new("ROLE_ADMIN").unwrap().authority(), "ROLE_ADMIN");
    }

    #[test]
    fn empty_and_blank_rejected() {
        assert_eq!(Role::new(""), Err(ValidationError::EmptyRole));
        assert_eq!(Role::new("   "), Err(ValidationError::EmptyRole));
    }

    #[test]
    fn label_is_trimmed() {
        assert_eq!(Role::new("  ops ").unwrap().as_str(), "ops");
    }
}
