//! # Edge Enforcer
//!
//! Pure, per-request decision: admit or reject, and with which identity.
//!
//! ```text
//! path whitelisted? ── yes ──────────────────────────────► Forward { identity: None }
//!        │ no
//! Authorization: Bearer <token>? ── missing / malformed ─► Reject
//!        │
//! token verifies and is unexpired? ── no ────────────────► Reject
//!        │
//! subject is a valid username? ── no ────────────────────► Reject
//!        │
//!        └──────────────────────────────────────────────► Forward { identity: Some(subject) }
//! ```
//!
//! No I/O and no shared mutable state: the whitelist and codec are fixed at
//! startup. The HTTP wiring lives in [`crate::middleware`].

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use bastion_core::{AuthenticatedIdentity, Username};
use bastion_crypto::{TokenCodec, TokenError, VerificationError};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::whitelist::Whitelist;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a request was rejected. For logs and metrics only; the caller always
/// sees the same generic 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// No `Authorization` header.
    #[error("missing authorization header")]
    MissingHeader,
    /// Header present but not a single `Bearer <token>` value.
    #[error("malformed authorization header")]
    MalformedHeader,
    /// Structure or signature check failed.
    #[error("invalid token: {0}")]
    InvalidToken(VerificationError),
    /// Signature valid, token past its expiry.
    #[error("token expired")]
    Expired,
    /// Signature valid, but the subject cannot be used as an identity header.
    #[error("token subject is not a valid username")]
    InvalidSubject,
    /// Evaluation failed unexpectedly.
    #[error("internal enforcement failure")]
    Internal,
}

impl RejectReason {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::MalformedHeader => "malformed_header",
            Self::InvalidToken(VerificationError::BadSignature) => "bad_signature",
            Self::InvalidToken(VerificationError::Malformed(_)) => "malformed_token",
            Self::Expired => "expired",
            Self::InvalidSubject => "invalid_subject",
            Self::Internal => "internal",
        }
    }
}

/// Outcome of [`EdgeEnforcer::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Admit the request. `identity` is `None` for whitelisted paths.
    Forward {
        /// Principal to inject as `X-User-Name`.
        identity: Option<AuthenticatedIdentity>,
    },
    /// Refuse the request with 401.
    Reject(RejectReason),
}

/// Whitelist plus token codec.
#[derive(Debug)]
pub struct EdgeEnforcer {
    whitelist: Whitelist,
    codec: Arc<TokenCodec>,
}

impl EdgeEnforcer {
    /// Create an enforcer.
    pub fn new(whitelist: Whitelist, codec: Arc<TokenCodec>) -> Self {
        Self { whitelist, codec }
    }

    /// The configured whitelist.
    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Decide what to do with a request for `path` carrying `headers`.
    pub fn evaluate(&self, path: &str, headers: &HeaderMap, now: DateTime<Utc>) -> Verdict {
        if self.whitelist.matches(path) {
            return Verdict::Forward { identity: None };
        }
        let token = match bearer_token(headers) {
            Ok(token) => token,
            Err(reason) => return Verdict::Reject(reason),
        };
        let claims = match self.codec.verify(token, now) {
            Ok(claims) => claims,
            Err(TokenError::Expired { .. }) => return Verdict::Reject(RejectReason::Expired),
            Err(TokenError::Verification(e)) => {
                return Verdict::Reject(RejectReason::InvalidToken(e))
            }
        };
        match Username::new(claims.sub) {
            Ok(username) => Verdict::Forward {
                identity: Some(AuthenticatedIdentity::new(username)),
            },
            Err(_) => Verdict::Reject(RejectReason::InvalidSubject),
        }
    }
}

/// Extract the token from exactly one `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, RejectReason> {
    let mut values = headers.get_all(header::AUTHORIZATION).iter();
    let value = values.next().ok_or(RejectReason::MissingHeader)?;
    if values.next().is_some() {
        return Err(RejectReason::MalformedHeader);
    }
    let value = value.to_str().map_err(|_| RejectReason::MalformedHeader)?;
    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(RejectReason::MalformedHeader),
    }
}
