//! Auth service configuration.
//!
//! Read once from the environment at startup and immutable afterwards.
//! Custom `Debug` redacts the signing secret.

use bastion_crypto::{BcryptHasher, TokenTtl};
use zeroize::Zeroizing;

/// Default listen port of the auth service.
pub const DEFAULT_PORT: u16 = 8081;

/// Runtime configuration of the auth service.
#[derive(Clone)]
pub struct AppConfig {
    /// TCP port to listen on.
    pub port: u16,
    /// Shared HMAC signing secret.
    pub jwt_secret: Zeroizing<String>,
    /// Lifetime of issued tokens.
    pub token_ttl: TokenTtl,
    /// bcrypt work factor for newly hashed passwords.
    pub bcrypt_cost: u32,
    /// Provision the default accounts when the store is empty.
    pub seed_users: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl.as_secs())
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("seed_users", &self.seed_users)
            .finish()
    }
}

impl AppConfig {
    /// Configuration with defaults for everything except the secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            port: DEFAULT_PORT,
            jwt_secret: Zeroizing::new(jwt_secret.into()),
            token_ttl: TokenTtl::default(),
            bcrypt_cost: BcryptHasher::DEFAULT_COST,
            seed_users: true,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `BASTION_JWT_SECRET` (required)
    /// - `BASTION_JWT_EXPIRATION` token TTL in seconds (default: 86400)
    /// - `PORT` (default: 8081)
    /// - `BASTION_BCRYPT_COST` (default: 10)
    /// - `BASTION_SEED_USERS` (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup("BASTION_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;
        let mut config = Self::new(secret);

        if let Some(raw) = lookup("BASTION_JWT_EXPIRATION") {
            let secs = parse_var::<u64>("BASTION_JWT_EXPIRATION", &raw)?;
            config.token_ttl = TokenTtl::from_secs(secs)
                .map_err(|e| ConfigError::invalid("BASTION_JWT_EXPIRATION", &raw, e))?;
        }
        if let Some(raw) = lookup("PORT") {
            config.port = parse_var("PORT", &raw)?;
        }
        if let Some(raw) = lookup("BASTION_BCRYPT_COST") {
            let cost = parse_var("BASTION_BCRYPT_COST", &raw)?;
            BcryptHasher::new(cost)
                .map_err(|e| ConfigError::invalid("BASTION_BCRYPT_COST", &raw, e))?;
            config.bcrypt_cost = cost;
        }
        if let Some(raw) = lookup("BASTION_SEED_USERS") {
            config.seed_users = parse_bool("BASTION_SEED_USERS", &raw)?;
        }
        Ok(config)
    }
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ConfigError::invalid(var, raw, e))
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(var, raw, "expected a boolean")),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BASTION_JWT_SECRET environment variable is required")]
    MissingSecret,
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &str, value: &str, reason: impl std::fmt::Display) -> Self {
        Self::Invalid {
            var: var.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply() {
        let cfg = AppConfig::from_lookup(lookup(&[("BASTION_JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.token_ttl.as_secs(), 86_400);
        assert_eq!(cfg.bcrypt_cost, 10);
        assert!(cfg.seed_users);
        assert_eq!(cfg.jwt_secret.as_str(), "s3cret");
    }

    #[test]
    fn secret_required() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingSecret)
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("BASTION_JWT_SECRET", "")])),
            Err(ConfigError::MissingSecret)
        ));
    }

    #[test]
    fn overrides_parse() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("BASTION_JWT_SECRET", "s3cret"),
            ("BASTION_JWT_EXPIRATION", "3600"),
            ("PORT", "9000"),
            ("BASTION_BCRYPT_COST", "4"),
            ("BASTION_SEED_USERS", "false"),
        ]))
        .unwrap();
        assert_eq!(cfg.token_ttl.as_secs(), 3600);
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.bcrypt_cost, 4);
        assert!(!cfg.seed_users);
    }

    #[test]
    fn invalid_values_rejected() {
        for (var, value) in [
            ("BASTION_JWT_EXPIRATION", "0"),
            ("BASTION_JWT_EXPIRATION", "soon"),
            ("PORT", "99999"),
            ("BASTION_BCRYPT_COST", "2"),
            ("BASTION_SEED_USERS", "maybe"),
        ] {
            let err = AppConfig::from_lookup(lookup(&[("BASTION_JWT_SECRET", "s"), (var, value)]))
                .unwrap_err();
            assert!(err.to_string().contains(var), "{var}={value}: {err}");
        }
    }

    #[test]
    fn debug_redacts_secret() {
        let cfg = AppConfig::new("super-secret-value");
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("super-secret-value"));
    }
}
