//! # Integration Tests for bastion-api
//!
//! Drives the router with `oneshot`: login outcomes, envelope shape,
//! malformed bodies, health check, and OpenAPI generation.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use bastion_api::bootstrap::bootstrap;
use metrics_exporter_prometheus::PrometheusBuilder;
use bastion_api::config::AppConfig;
use bastion_crypto::TokenCodec;

const SECRET: &str = "login-tests-secret-login-tests-secret";

/// Helper: seeded app with a fast bcrypt cost.
fn test_app() -> axum::Router {
    let mut config = AppConfig::new(SECRET);
    config.bcrypt_cost = 4;
    bastion_api::app(bootstrap(&config).unwrap())
}

fn login_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_login_success_returns_verifiable_token() {
    let response = test_app()
        .oneshot(login_request(r#"{"username":"user","password":"password"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["code"], 200);
    assert_eq!(body["message"], "operation succeeded");

    let token = body["data"]["token"].as_str().unwrap();
    let now = chrono::Utc::now();
    let claims = TokenCodec::new(SECRET).unwrap().verify(token, now).unwrap();
    assert_eq!(claims.subject(), "user");
    assert_eq!(claims.exp - claims.iat, 86_400);
    assert!(claims.exp <= now.timestamp() + 86_400);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_identical() {
    let app = test_app();
    let wrong = app
        .clone()
        .oneshot(login_request(r#"{"username":"user","password":"wrongpass"}"#))
        .await
        .unwrap();
    let unknown = app
        .oneshot(login_request(r#"{"username":"nouser","password":"x"}"#))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    let wrong = body_json(wrong).await;
    let unknown = body_json(unknown).await;
    assert_eq!(wrong, unknown);
    assert_eq!(wrong["code"], 401);
    assert!(wrong.get("data").is_none());
}

#[tokio::test]
async fn test_malformed_json_is_400_envelope() {
    let response = test_app().oneshot(login_request("{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 400);
    assert!(body["message"].as_str().unwrap().starts_with("bad request"));
}

#[tokio::test]
async fn test_missing_field_is_400() {
    let response = test_app()
        .oneshot(login_request(r#"{"username":"user"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversize_body_rejected() {
    let padding = "a".repeat(bastion_api::MAX_BODY_BYTES + 1);
    let body = format!(r#"{{"username":"user","password":"{padding}"}}"#);
    let response = test_app().oneshot(login_request(&body)).await.unwrap();
    assert!(response.status().is_client_error());
    assert_ne!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_check() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/actuator/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "UP");
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_prometheus_without_recorder_is_503() {
    let response = test_app().oneshot(get("/actuator/prometheus")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], 503);
}

#[tokio::test]
async fn test_prometheus_renders_login_counters() {
    let recorder = PrometheusBuilder::new().build_recorder();
    metrics::with_local_recorder(&recorder, || {
        metrics::counter!("auth_login_total", "outcome" => "account_disabled").increment(3);
    });

    let mut config = AppConfig::new(SECRET);
    config.bcrypt_cost = 4;
    let state = bootstrap(&config).unwrap().with_prometheus(recorder.handle());
    let response = bastion_api::app(state)
        .oneshot(get("/actuator/prometheus"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains(r#"auth_login_total{outcome="account_disabled"} 3"#));
}

#[tokio::test]
async fn test_openapi_spec() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert!(spec["paths"]["/auth/login"]["post"].is_object());
}
