//! # Application State
//!
//! Shared state passed to handlers via the `State` extractor. Everything
//! behind it is read-only after startup, so clones are cheap `Arc` copies.

use std::sync::Arc;

use bastion_auth::{Authenticator, CredentialStore};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler state of the auth service.
#[derive(Clone)]
pub struct AppState {
    /// Login orchestration.
    pub authenticator: Arc<Authenticator>,
    /// Backing credential store.
    pub store: Arc<dyn CredentialStore>,
    /// Render handle of the installed Prometheus recorder, if any.
    pub prometheus: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("authenticator", &self.authenticator)
            .field("users", &self.store.count())
            .field("prometheus", &self.prometheus.is_some())
            .finish()
    }
}

impl AppState {
    /// Assemble state from already-wired collaborators.
    pub fn new(authenticator: Arc<Authenticator>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            authenticator,
            store,
            prometheus: None,
        }
    }

    /// Expose `handle` at `/actuator/prometheus`.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
