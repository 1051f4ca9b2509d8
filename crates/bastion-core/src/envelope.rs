//! # Response Envelope
//!
//! `{code, message, data}` — the JSON body shape every perimeter endpoint
//! answers with. `code` mirrors the HTTP status; `data` is omitted when absent.

use serde::{Deserialize, Serialize};

/// Message attached to every successful response.
pub const SUCCESS_MESSAGE: &str = "operation succeeded";

/// Uniform JSON response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResult<T> {
    /// Status code, equal to the HTTP status of the response.
    pub code: u16,
    /// Human-readable message.
    pub message: String,
    /// Payload, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResult<T> {
    /// A 200 result carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: SUCCESS_MESSAGE.to_string(),
            data: Some(data),
        }
    }

    /// A failure result with no payload.
    pub fn fail(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Whether this result reports success.
    pub fn is_success(&self) -> bool {
        self.code == 200
    }
}
