//! Gateway-local operational endpoints. Whitelisted by default through
//! `/actuator/**`.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::error::GatewayError;
use crate::state::GatewayState;

/// GET /actuator/health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}

/// GET /actuator/prometheus — text exposition of the gateway's metrics.
pub async fn prometheus(State(state): State<GatewayState>) -> Response {
    match &state.prometheus {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => GatewayError::MetricsUnavailable.into_response(),
    }
}
