//! # bastion-gateway — Edge Gateway
//!
//! The single entry point of the mesh. Every inbound request passes the
//! [`enforcer::EdgeEnforcer`] before anything else runs:
//!
//! - whitelisted paths (login, actuator) are admitted as-is;
//! - everything else needs `Authorization: Bearer <token>` with a token
//!   minted by the auth service under the shared secret;
//! - admitted requests carry the verified subject downstream in
//!   `X-User-Name`. Clients can never supply that header themselves.
//!
//! Rejections are always the same 401: the `{code:401,message:"unauthorized"}`
//! envelope with `WWW-Authenticate: Bearer`. The reason is logged and
//! counted, never returned.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! enforce → TraceLayer → { /actuator/health, /actuator/prometheus, proxy fallback }
//! ```

pub mod actuator;
pub mod config;
pub mod downstream;
pub mod enforcer;
pub mod error;
pub mod middleware;
pub mod proxy;
pub mod state;
pub mod whitelist;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::GatewayState;

/// Assemble the gateway router. The enforcement layer wraps everything,
/// including the fallback, so no request reaches a handler unchecked.
pub fn app(state: GatewayState) -> Router {
    let enforcer = Arc::clone(&state.enforcer);
    Router::new()
        .route("/actuator/health", get(actuator::health))
        .route("/actuator/prometheus", get(actuator::prometheus))
        .fallback(proxy::forward)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .layer(axum::middleware::from_fn_with_state(
            enforcer,
            middleware::enforce,
        ))
}
