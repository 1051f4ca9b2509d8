//! # Login Route
//!
//! `POST /auth/login` exchanges a username and password for a bearer token.
//!
//! | Outcome               | HTTP | Envelope                                   |
//! |-----------------------|------|--------------------------------------------|
//! | success               | 200  | `{code:200, message, data:{token}}`        |
//! | malformed body        | 400  | `{code:400, message}`                      |
//! | bad credentials       | 401  | `{code:401, message}` (same for all causes)|
//! | unexpected failure    | 500  | `{code:500, message}`                      |

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use bastion_auth::{AuthFailure, IssuedToken};
use bastion_core::ApiResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Login request body.
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Account name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Payload of a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// POST /auth/login — verify credentials and issue a token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (
            status = 200,
            description = "Token issued; body is `{code, message, data: LoginResponse}`",
            body = LoginResponse
        ),
        (status = 400, description = "Malformed request body"),
        (status = 401, description = "Invalid username or password"),
        (status = 500, description = "Unexpected failure"),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResult<LoginResponse>>, AppError> {
    let req = extract_json(body)?;
    let authenticator = state.authenticator.clone();

    // bcrypt blocks; run it on the blocking pool.
    let outcome =
        tokio::task::spawn_blocking(move || authenticator.login(&req.username, &req.password))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "login task failed");
                AppError::Internal(format!("login failed: {e}"))
            })?;

    record_outcome(&outcome);

    let issued = outcome?;
    Ok(Json(ApiResult::success(LoginResponse {
        token: issued.token,
    })))
}

/// Count the attempt under `auth_login_total{outcome}`. The two 401 causes
/// are only told apart here and in the logs.
fn record_outcome(outcome: &Result<IssuedToken, AuthFailure>) {
    let label = match outcome {
        Ok(_) => "success",
        Err(AuthFailure::InvalidCredentials) => "invalid_credentials",
        Err(AuthFailure::AccountDisabled) => "account_disabled",
        Err(AuthFailure::Unexpected(_)) => "error",
    };
    metrics::counter!("auth_login_total", "outcome" => label).increment(1);
}
