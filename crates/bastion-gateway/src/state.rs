//! Shared gateway state. Read-only after startup.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::enforcer::EdgeEnforcer;
use crate::proxy::Proxy;

/// Handler state of the gateway.
#[derive(Clone)]
pub struct GatewayState {
    /// Whitelist and token verification.
    pub enforcer: Arc<EdgeEnforcer>,
    /// Route table and upstream client.
    pub proxy: Arc<Proxy>,
    /// Render handle of the installed Prometheus recorder, if any.
    pub prometheus: Option<PrometheusHandle>,
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("enforcer", &self.enforcer)
            .field("routes", &self.proxy.routes().len())
            .field("prometheus", &self.prometheus.is_some())
            .finish()
    }
}

impl GatewayState {
    /// Assemble state. Pass `None` for `prometheus` when no recorder is installed.
    pub fn new(enforcer: EdgeEnforcer, proxy: Proxy, prometheus: Option<PrometheusHandle>) -> Self {
        Self {
            enforcer: Arc::new(enforcer),
            proxy: Arc::new(proxy),
            prometheus,
        }
    }
}
