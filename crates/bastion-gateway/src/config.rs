//! # Gateway Configuration
//!
//! Optional YAML file (path in `BASTION_GATEWAY_CONFIG`) overlaid with
//! environment variables. Loaded once at startup.
//!
//! ```yaml
//! port: 8080
//! upstream_timeout_secs: 30
//! whitelist:
//!   - /auth/login
//!   - /actuator/**
//! routes:
//!   - prefix: /auth
//!     upstream: http://auth-service:8081
//!   - prefix: /orders
//!     upstream: http://order-service:8082
//! ```
//!
//! Environment overrides: `BASTION_JWT_SECRET`, `PORT`, `BASTION_WHITELIST`
//! (comma-separated patterns).

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use zeroize::Zeroizing;

use crate::error::ConfigError;
use crate::proxy::{RouteConfig, RouteTable};
use crate::whitelist::Whitelist;

/// Default listen port of the gateway.
pub const DEFAULT_PORT: u16 = 8080;

/// Default upstream request timeout.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    port: Option<u16>,
    jwt_secret: Option<String>,
    whitelist: Option<Vec<String>>,
    #[serde(default)]
    routes: Vec<RouteConfig>,
    upstream_timeout_secs: Option<u64>,
}

/// Runtime configuration of the gateway. Custom `Debug` redacts the secret.
#[derive(Clone)]
pub struct GatewayConfig {
    /// TCP port to listen on.
    pub port: u16,
    /// Shared HMAC signing secret (same as the auth service's).
    pub jwt_secret: Zeroizing<String>,
    /// Token-exempt paths.
    pub whitelist: Whitelist,
    /// Upstream routes.
    pub routes: RouteTable,
    /// Per-request upstream timeout.
    pub upstream_timeout: Duration,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("whitelist", &self.whitelist)
            .field("routes", &self.routes)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

impl GatewayConfig {
    /// Defaults: port 8080, default whitelist, no routes.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            port: DEFAULT_PORT,
            jwt_secret: Zeroizing::new(jwt_secret.into()),
            whitelist: Whitelist::default(),
            routes: RouteTable::default(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }

    /// Load from `BASTION_GATEWAY_CONFIG` (if set) and the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var("BASTION_GATEWAY_CONFIG") {
            Ok(path) => load_file(Path::new(&path)),
            Err(_) => Self::from_sources(None, |var| std::env::var(var).ok()),
        }
    }

    /// Combine an optional YAML document with a variable lookup. Variables win.
    pub fn from_sources(
        yaml: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: FileConfig = match yaml {
            Some(text) => serde_yaml::from_str(text)?,
            None => FileConfig::default(),
        };

        let secret = lookup("BASTION_JWT_SECRET")
            .or(file.jwt_secret)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;
        let mut config = Self::new(secret);

        if let Some(port) = file.port {
            config.port = port;
        }
        if let Some(raw) = lookup("PORT") {
            config.port = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    var: "PORT".into(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(patterns) = file.whitelist {
            config.whitelist = Whitelist::parse(patterns)?;
        }
        if let Some(raw) = lookup("BASTION_WHITELIST") {
            config.whitelist = Whitelist::parse(raw.split(',').filter(|p| !p.trim().is_empty()))?;
        }

        config.routes = RouteTable::new(file.routes)?;

        if let Some(secs) = file.upstream_timeout_secs {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "upstream_timeout_secs".into(),
                    value: "0".into(),
                    reason: "must be positive".into(),
                });
            }
            config.upstream_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load a YAML config file from disk, with variables from the environment.
pub fn load_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let yaml = read_file(path)?;
    GatewayConfig::from_sources(Some(&yaml), |var| std::env::var(var).ok())
}
