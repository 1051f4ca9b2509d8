//! # Path Whitelist
//!
//! Paths the edge admits without a token. Two pattern forms:
//!
//! - `/auth/login`: exact match.
//! - `/actuator/**`: `/actuator/` followed by anything, including nothing.
//!
//! `**` is accepted only as the final segment. A path never matches if it
//! contains a `.` or `..` segment, a backslash, or a percent-encoded dot,
//! slash or backslash, because an upstream that normalises the path could
//! otherwise resolve a whitelisted prefix to a protected resource.

use crate::error::ConfigError;

/// Patterns whitelisted when none are configured.
pub const DEFAULT_PATTERNS: [&str; 2] = ["/auth/login", "/actuator/**"];

/// One whitelist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhitelistPattern {
    /// Matches exactly this path.
    Exact(String),
    /// Matches this prefix (ending in `/`) followed by any suffix.
    Prefix(String),
}

impl WhitelistPattern {
    /// Parse a pattern string.
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let invalid = |reason| ConfigError::Whitelist {
            pattern: pattern.to_string(),
            reason,
        };
        if !pattern.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        match pattern.strip_suffix("**") {
            Some(prefix) => {
                if !prefix.ends_with('/') {
                    return Err(invalid("'**' must be a whole trailing segment"));
                }
                if prefix.contains('*') {
                    return Err(invalid("'*' is only allowed in a trailing '/**'"));
                }
                Ok(Self::Prefix(prefix.to_string()))
            }
            None if pattern.contains('*') => {
                Err(invalid("'*' is only allowed in a trailing '/**'"))
            }
            None => Ok(Self::Exact(pattern.to_string())),
        }
    }

    /// Whether `path` matches this pattern. No traversal checks.
    fn matches_raw(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact,
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

impl std::fmt::Display for WhitelistPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(p) => f.write_str(p),
            Self::Prefix(p) => write!(f, "{p}**"),
        }
    }
}

/// The set of token-exempt paths. Immutable after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Whitelist {
    patterns: Vec<WhitelistPattern>,
}

impl Whitelist {
    /// Build from already-parsed patterns.
    pub fn new(patterns: Vec<WhitelistPattern>) -> Self {
        Self { patterns }
    }

    /// Parse every pattern; the first invalid one fails the whole list.
    pub fn parse<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| WhitelistPattern::parse(p.as_ref().trim()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether `path` is exempt from token enforcement.
    pub fn matches(&self, path: &str) -> bool {
        if is_ambiguous(path) {
            return false;
        }
        self.patterns.iter().any(|p| p.matches_raw(path))
    }

    /// The configured patterns.
    pub fn patterns(&self) -> &[WhitelistPattern] {
        &self.patterns
    }
}

impl Default for Whitelist {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS
                .iter()
                .filter_map(|p| WhitelistPattern::parse(p).ok())
                .collect(),
        }
    }
}

fn is_ambiguous(path: &str) -> bool {
    if path.contains('\\') {
        return true;
    }
    let lower = path.to_ascii_lowercase();
    if ["%2e", "%2f", "%5c"].iter().any(|enc| lower.contains(enc)) {
        return true;
    }
    path.split('/').any(|seg| seg == "." || seg == "..")
}
