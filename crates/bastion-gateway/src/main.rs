//! # bastion-gateway — Binary Entry Point
//!
//! Starts the edge gateway. Binds to `PORT` (default 8080).

use std::sync::Arc;

use bastion_crypto::TokenCodec;
use bastion_gateway::config::GatewayConfig;
use bastion_gateway::enforcer::EdgeEnforcer;
use bastion_gateway::proxy::Proxy;
use bastion_gateway::state::GatewayState;
use metrics_exporter_prometheus::PrometheusBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = GatewayConfig::from_env().map_err(|e| {
        tracing::error!("configuration error: {e}");
        e
    })?;
    tracing::info!(?config, "loaded configuration");
    if config.routes.is_empty() {
        tracing::warn!("no upstream routes configured; admitted requests will get 404");
    }

    let prometheus = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed");
            None
        }
    };

    let codec = Arc::new(TokenCodec::new(config.jwt_secret.as_bytes())?);
    let enforcer = EdgeEnforcer::new(config.whitelist.clone(), codec);
    let proxy = Proxy::new(config.routes.clone(), config.upstream_timeout)?;
    let app = bastion_gateway::app(GatewayState::new(enforcer, proxy, prometheus));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Bastion gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Structured logging; JSON lines when `BASTION_LOG_FORMAT=json`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("BASTION_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
