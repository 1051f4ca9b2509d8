//! # bastion-api — Auth Service
//!
//! The login endpoint of the Bastion perimeter. It is the only place where
//! passwords are checked and tokens are minted; every other service relies
//! on the edge gateway to verify those tokens.
//!
//! ## API Surface
//!
//! | Route                   | Module                 | Purpose                  |
//! |-------------------------|------------------------|--------------------------|
//! | `POST /auth/login`      | [`routes::auth`]       | Credentials → token      |
//! | `GET /actuator/health`  | [`routes::actuator`]   | Liveness check           |
//! | `GET /actuator/prometheus` | [`routes::actuator`] | Login counters           |
//! | `GET /openapi.json`     | [`openapi`]            | Generated OpenAPI 3.1    |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → RequestBodyLimit (64 KiB) → Handler
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::auth::router())
        .merge(routes::actuator::router())
        .merge(openapi::router())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
