//! Operational endpoints under `/actuator`. Whitelisted at the edge.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

/// Health check body.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    /// Always `"UP"` while the process is serving.
    pub status: String,
}

/// Build the actuator router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/actuator/health", get(health))
        .route("/actuator/prometheus", get(prometheus))
}

/// GET /actuator/health — liveness check.
#[utoipa::path(
    get,
    path = "/actuator/health",
    responses((status = 200, description = "Service is up", body = HealthStatus)),
    tag = "actuator"
)]
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "UP".to_string(),
    })
}

/// GET /actuator/prometheus — login counters in Prometheus text format.
pub async fn prometheus(State(state): State<AppState>) -> Response {
    match &state.prometheus {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => AppError::MetricsUnavailable.into_response(),
    }
}
