//! # Bearer Token Codec
//!
//! Mints and verifies stateless bearer tokens in JWT compact form:
//!
//! ```text
//! base64url({"alg":"HS256","typ":"JWT"}) . base64url({"sub","iat","exp"}) . base64url(HMAC-SHA256)
//! ```
//!
//! The MAC covers the first two segments exactly as received. Nothing about
//! an issued token is stored: validity is recomputed from the token and the
//! shared secret on every call.
//!
//! ## Time Resolution
//!
//! `iat` and `exp` are whole Unix seconds. `iat` is `now` truncated and
//! `exp = iat + ttl`, so a token never outlives `now + ttl`. A token is
//! valid strictly before `exp`.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{CryptoError, TokenError, VerificationError};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

/// Secrets shorter than this are accepted but logged as weak.
const RECOMMENDED_SECRET_LEN: usize = 32;

// ── TokenTtl ────────────────────────────────────────────────────────────────

/// Lifetime given to newly minted tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtl(u64);

impl TokenTtl {
    /// Default lifetime: one day.
    pub const DEFAULT_SECS: u64 = 86_400;
    /// Upper bound: ten years.
    pub const MAX_SECS: u64 = 315_360_000;

    /// Build a TTL from whole seconds.
    pub fn from_secs(secs: u64) -> Result<Self, CryptoError> {
        if secs == 0 || secs > Self::MAX_SECS {
            return Err(CryptoError::InvalidTtl(secs));
        }
        Ok(Self(secs))
    }

    /// Lifetime in seconds.
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Lifetime as a `Duration`.
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for TokenTtl {
    fn default() -> Self {
        Self(Self::DEFAULT_SECS)
    }
}

// ── Claims ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// The verified contents of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username the token was minted for.
    pub sub: String,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expires-at, Unix seconds. The token is valid strictly before this instant.
    pub exp: i64,
}

impl Claims {
    /// The subject (username).
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Issued-at as a UTC timestamp.
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Expires-at as a UTC timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether the token is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    fn check(&self) -> Result<(), VerificationError> {
        if self.sub.is_empty() {
            return Err(VerificationError::Malformed("empty subject"));
        }
        if DateTime::from_timestamp(self.iat, 0).is_none()
            || DateTime::from_timestamp(self.exp, 0).is_none()
        {
            return Err(VerificationError::Malformed("timestamp out of range"));
        }
        if self.exp < self.iat {
            return Err(VerificationError::Malformed("expiry precedes issue time"));
        }
        Ok(())
    }
}

// ── TokenCodec ──────────────────────────────────────────────────────────────

/// Mints and verifies HS256 bearer tokens under one shared secret.
///
/// Cheap to share behind an `Arc`; all methods take `&self` and touch no
/// mutable state.
pub struct TokenCodec {
    secret: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenCodec {
    /// Create a codec from the shared secret bytes.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, CryptoError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(CryptoError::Key("signing secret must be non-empty".into()));
        }
        if secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                len = secret.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "token signing secret is shorter than recommended"
            );
        }
        Ok(Self {
            secret: Zeroizing::new(secret.to_vec()),
        })
    }

    /// Mint a token for `subject`, issued at `now`, living for `ttl`.
    pub fn mint(
        &self,
        subject: &str,
        now: DateTime<Utc>,
        ttl: TokenTtl,
    ) -> Result<String, CryptoError> {
        if subject.is_empty() {
            return Err(CryptoError::Key("token subject must be non-empty".into()));
        }
        let iat = now.timestamp();
        // ttl is bounded by MAX_SECS, so the cast and the sum cannot overflow
        // for any timestamp chrono can represent.
        let exp = iat + ttl.as_secs() as i64;

        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: Some(TOKEN_TYPE.to_string()),
        };
        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp,
        };

        let mut token = encode_segment(&header)?;
        token.push('.');
        token.push_str(&encode_segment(&claims)?);
        let signature = self.sign(token.as_bytes());
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(signature));
        Ok(token)
    }

    /// Check the token's structure and signature and return its claims.
    ///
    /// Does not look at expiry; see [`TokenCodec::verify`].
    pub fn parse(&self, token: &str) -> Result<Claims, VerificationError> {
        let mut segments = token.split('.');
        let (header_b64, claims_b64, signature_b64) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(h), Some(c), Some(s), None) if !h.is_empty() && !c.is_empty() => (h, c, s),
                _ => {
                    return Err(VerificationError::Malformed(
                        "expected three dot-separated segments",
                    ))
                }
            };

        let provided = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| VerificationError::Malformed("signature is not base64url"))?;

        let signing_input = &token[..header_b64.len() + 1 + claims_b64.len()];
        let expected = self.sign(signing_input.as_bytes());
        if !constant_time_mac_eq(&provided, &expected) {
            return Err(VerificationError::BadSignature);
        }

        let header: Header = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(VerificationError::Malformed("unsupported algorithm"));
        }
        let claims: Claims = decode_segment(claims_b64)?;
        claims.check()?;
        Ok(claims)
    }

    /// Whether the token is expired at `now`.
    ///
    /// Never fails: a token that does not parse counts as expired.
    pub fn is_expired(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.parse(token)
            .map(|claims| claims.is_expired_at(now))
            .unwrap_or(true)
    }

    /// Full validation: signature, structure, and expiry at `now`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = self.parse(token)?;
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired {
                expired_at: claims.expires_at(),
            });
        }
        Ok(claims)
    }

    fn sign(&self, input: &[u8]) -> [u8; 32] {
        // HMAC accepts keys of any length; new_from_slice cannot fail here.
        let mut mac = match HmacSha256::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC-SHA256 accepts keys of any length"),
        };
        mac.update(input);
        let mut out = [0u8; 32];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }
}

/// Constant-time MAC comparison.
///
/// When lengths differ, a dummy comparison keeps the timing independent of
/// how far the provided value got.
fn constant_time_mac_eq(provided: &[u8], expected: &[u8; 32]) -> bool {
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, CryptoError> {
    Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(value)?))
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, VerificationError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| VerificationError::Malformed("segment is not base64url"))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| VerificationError::Malformed("segment is not valid JSON claims"))
}
