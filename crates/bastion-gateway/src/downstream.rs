//! # Downstream Identity Extractor
//!
//! For services that sit behind the gateway. [`TrustedIdentity`] reads the
//! `X-User-Name` header the edge injected and hands the handler a validated
//! [`Username`]. It performs no token verification: the gateway is assumed
//! to be the only network path to the service.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bastion_core::{AuthenticatedIdentity, Username, USER_NAME_HEADER};

use crate::error::GatewayError;

/// The authenticated caller, as asserted by the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedIdentity(pub AuthenticatedIdentity);

impl TrustedIdentity {
    /// The caller's username.
    pub fn username(&self) -> &Username {
        self.0.username()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for TrustedIdentity {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(GatewayError::Unauthorized)?;
        let username = Username::new(value).map_err(|_| GatewayError::Unauthorized)?;
        Ok(Self(AuthenticatedIdentity::new(username)))
    }
}
