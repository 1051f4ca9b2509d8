//! # Reverse Proxy
//!
//! Relays admitted requests to internal services. The route whose prefix is
//! the longest segment-aligned match for the request path wins; the full
//! original path and query are appended to its upstream base URL.
//!
//! Hop-by-hop headers and `Host` are not forwarded in either direction.
//! Request bodies are buffered up to [`MAX_PROXY_BODY_BYTES`].

use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderName};
use axum::response::Response;
use serde::Deserialize;
use url::Url;

use crate::error::{ConfigError, GatewayError};
use crate::state::GatewayState;

/// Largest request body relayed upstream.
pub const MAX_PROXY_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Headers meaningful only for a single transport hop (RFC 9110 §7.6.1).
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// A path prefix and the service that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteConfig {
    /// Path prefix, e.g. `/orders`. `/` routes everything.
    pub prefix: String,
    /// Base URL of the upstream service.
    pub upstream: Url,
}

impl RouteConfig {
    /// Build and validate a route.
    pub fn new(prefix: impl Into<String>, upstream: Url) -> Result<Self, ConfigError> {
        let route = Self {
            prefix: prefix.into(),
            upstream,
        };
        route.validate()?;
        Ok(route)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.prefix.starts_with('/') {
            return Err(ConfigError::RoutePrefix(self.prefix.clone()));
        }
        Ok(())
    }

    fn normalized_prefix(&self) -> &str {
        match self.prefix.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        }
    }

    /// Whether this route owns `path`, on segment boundaries.
    pub fn matches(&self, path: &str) -> bool {
        let prefix = self.normalized_prefix();
        if prefix == "/" {
            return true;
        }
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Upstream URL for `path` and `query`.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.upstream.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base}{path}"));
        url.set_query(query);
        url
    }
}

/// Routes ordered for longest-prefix matching.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteConfig>,
}

impl RouteTable {
    /// Validate and order the routes.
    pub fn new(mut routes: Vec<RouteConfig>) -> Result<Self, ConfigError> {
        for route in &routes {
            route.validate()?;
        }
        routes.sort_by_key(|r| std::cmp::Reverse(r.normalized_prefix().len()));
        Ok(Self { routes })
    }

    /// The route owning `path`, if any.
    pub fn resolve(&self, path: &str) -> Option<&RouteConfig> {
        self.routes.iter().find(|r| r.matches(path))
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are configured.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Route table plus the shared upstream HTTP client.
#[derive(Debug, Clone)]
pub struct Proxy {
    routes: RouteTable,
    client: reqwest::Client,
}

impl Proxy {
    /// Build the proxy with a per-request upstream timeout.
    pub fn new(routes: RouteTable, timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { routes, client })
    }

    /// The route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}

/// Fallback handler: relay the request to its upstream.
pub async fn forward(
    State(state): State<GatewayState>,
    request: Request,
) -> Result<Response, GatewayError> {
    let proxy = &state.proxy;
    let (parts, body) = request.into_parts();
    let path = parts.uri.path();
    let route = proxy
        .routes
        .resolve(path)
        .ok_or_else(|| GatewayError::NoRoute(path.to_string()))?;
    let target = route.target_url(path, parts.uri.query());

    let body = axum::body::to_bytes(body, MAX_PROXY_BODY_BYTES)
        .await
        .map_err(|_| GatewayError::PayloadTooLarge)?;

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    tracing::debug!(method = %parts.method, %target, "forwarding upstream");
    let upstream = proxy
        .client
        .request(parts.method, target)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| upstream_error(route, e))?;

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    strip_hop_by_hop(&mut response_headers);
    response_headers.remove(header::CONTENT_LENGTH);
    let bytes = upstream.bytes().await.map_err(|e| upstream_error(route, e))?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}

fn upstream_error(route: &RouteConfig, err: reqwest::Error) -> GatewayError {
    let upstream = route.upstream.to_string();
    metrics::counter!("gateway_upstream_errors_total", "upstream" => upstream.clone()).increment(1);
    if err.is_timeout() {
        GatewayError::GatewayTimeout(upstream)
    } else {
        GatewayError::BadGateway {
            upstream,
            detail: err.to_string(),
        }
    }
}

/// Remove hop-by-hop headers, including any named in `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn route(prefix: &str, upstream: &str) -> RouteConfig {
        RouteConfig::new(prefix, Url::parse(upstream).unwrap()).unwrap()
    }

    #[test]
    fn segment_aligned_matching() {
        let r = route("/orders", "http://orders:8080");
        assert!(r.matches("/orders"));
        assert!(r.matches("/orders/42"));
        assert!(!r.matches("/ordersx"));
        assert!(!r.matches("/user/orders"));
        assert!(route("/orders/", "http://orders:8080").matches("/orders/42"));
    }

    #[test]
    fn longest_prefix_wins() {
        let table = RouteTable::new(vec![
            route("/", "http://default:1"),
            route("/users", "http://users:1"),
            route("/users/admin", "http://admin:1"),
        ])
        .unwrap();
        assert_eq!(table.resolve("/users/admin/x").unwrap().upstream.host_str(), Some("admin"));
        assert_eq!(table.resolve("/users/7").unwrap().upstream.host_str(), Some("users"));
        assert_eq!(table.resolve("/orders").unwrap().upstream.host_str(), Some("default"));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn no_route_without_catch_all() {
        let table = RouteTable::new(vec![route("/orders", "http://orders:1")]).unwrap();
        assert!(table.resolve("/users").is_none());
        assert!(RouteTable::default().is_empty());
    }

    #[test]
    fn target_url_keeps_path_and_query() {
        let r = route("/orders", "http://orders:8080");
        assert_eq!(
            r.target_url("/orders/42", Some("expand=items")).as_str(),
            "http://orders:8080/orders/42?expand=items"
        );
        let r = route("/orders", "http://svc:8080/api/");
        assert_eq!(r.target_url("/orders", None).as_str(), "http://svc:8080/api/orders");
    }

    #[test]
    fn prefix_must_be_absolute() {
        assert!(matches!(
            RouteConfig::new("orders", Url::parse("http://x").unwrap()),
            Err(ConfigError::RoutePrefix(_))
        ));
    }

    #[test]
    fn hop_by_hop_headers_removed() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-custom-hop"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-custom-hop", HeaderValue::from_static("1"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        headers.insert("x-user-name", HeaderValue::from_static("alice"));
        strip_hop_by_hop(&mut headers);
        assert_eq!(headers.len(), 2);
        assert!(headers.contains_key(header::AUTHORIZATION));
        assert!(headers.contains_key("x-user-name"));
    }
}
