//! # Gateway Error Types
//!
//! Every response the gateway produces on its own (as opposed to relaying an
//! upstream response) uses the standard `{code, message}` envelope.
//!
//! Rejections at the edge carry no detail: the caller learns only that the
//! request was unauthorized, never whether the header was missing, the
//! signature wrong, or the token expired.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bastion_core::ApiResult;
use thiserror::Error;

/// Message of every edge rejection.
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";

/// Errors the gateway answers with directly.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Request failed edge enforcement (401).
    #[error("unauthorized")]
    Unauthorized,

    /// No route prefix matches the request path (404).
    #[error("no route for {0}")]
    NoRoute(String),

    /// Request body over the proxy limit or unreadable (413).
    #[error("request body too large")]
    PayloadTooLarge,

    /// Upstream could not be reached or returned an unreadable response (502).
    #[error("upstream {upstream} unavailable: {detail}")]
    BadGateway {
        /// Upstream base URL.
        upstream: String,
        /// Transport error, logged only.
        detail: String,
    },

    /// Upstream did not answer within the configured timeout (504).
    #[error("upstream {0} timed out")]
    GatewayTimeout(String),

    /// No metrics recorder is installed (503).
    #[error("metrics exporter not installed")]
    MetricsUnavailable,
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NoRoute(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            Self::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::MetricsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            Self::BadGateway { .. } => "upstream unavailable".to_string(),
            Self::GatewayTimeout(_) => "upstream timed out".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "gateway error");
        }
        let body: ApiResult<()> = ApiResult::fail(status.as_u16(), self.public_message());
        let mut response = (status, Json(body)).into_response();
        if matches!(self, Self::Unauthorized) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BASTION_JWT_SECRET is required (environment or config file)")]
    MissingSecret,
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid whitelist pattern {pattern:?}: {reason}")]
    Whitelist {
        pattern: String,
        reason: &'static str,
    },
    #[error("invalid route prefix {0:?}: must start with '/'")]
    RoutePrefix(String),
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
    #[error("cannot build upstream HTTP client: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unauthorized_is_bare_envelope_with_challenge() {
        let response = GatewayError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({"code": 401, "message": "unauthorized"}));
    }

    #[tokio::test]
    async fn bad_gateway_hides_transport_detail() {
        let response = GatewayError::BadGateway {
            upstream: "http://orders:8080/".into(),
            detail: "connection refused".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["code"], 502);
        assert!(!body["message"].as_str().unwrap().contains("refused"));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(GatewayError::NoRoute("/x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(GatewayError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            GatewayError::GatewayTimeout("u".into()).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            GatewayError::MetricsUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
