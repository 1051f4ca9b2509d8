//! # OpenAPI Specification
//!
//! utoipa-generated document for the auth service, served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bastion Auth Service",
        version = "0.1.0",
        description = "Credential verification and bearer-token issuance for the Bastion perimeter."
    ),
    paths(crate::routes::auth::login, crate::routes::actuator::health),
    components(schemas(
        crate::routes::auth::LoginRequest,
        crate::routes::auth::LoginResponse,
        crate::routes::actuator::HealthStatus,
    )),
    tags(
        (name = "auth", description = "Login and token issuance"),
        (name = "actuator", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
