//! # Enforcement Middleware
//!
//! Wraps [`EdgeEnforcer::evaluate`] around every request that reaches the
//! gateway. Must be the outermost layer of the router.
//!
//! On every request, whatever the verdict:
//! - any client-supplied `X-User-Name` is removed before evaluation;
//! - a panic inside evaluation is caught and becomes a rejection, so the
//!   edge fails closed with 401 and never with 5xx.
//!
//! On `Forward` with an identity, `X-User-Name` is injected, the
//! [`AuthenticatedIdentity`] is placed in the request extensions, and the
//! original `Authorization` header is left in place.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bastion_core::{AuthenticatedIdentity, USER_NAME_HEADER};
use chrono::Utc;

use crate::enforcer::{EdgeEnforcer, RejectReason, Verdict};
use crate::error::GatewayError;

/// Axum middleware applying the edge enforcement decision.
pub async fn enforce(
    State(enforcer): State<Arc<EdgeEnforcer>>,
    request: Request,
    next: Next,
) -> Response {
    let now = Utc::now();
    apply(request, next, |request| {
        enforcer.evaluate(request.uri().path(), request.headers(), now)
    })
    .await
}

/// Run `evaluate`, with any panic turned into [`RejectReason::Internal`].
fn guarded(evaluate: impl FnOnce() -> Verdict) -> Verdict {
    catch_unwind(AssertUnwindSafe(evaluate)).unwrap_or(Verdict::Reject(RejectReason::Internal))
}

async fn apply(
    mut request: Request,
    next: Next,
    evaluate: impl FnOnce(&Request) -> Verdict,
) -> Response {
    if request.headers_mut().remove(USER_NAME_HEADER).is_some() {
        tracing::warn!(path = %request.uri().path(), "dropped client-supplied identity header");
    }

    let verdict = guarded(|| evaluate(&request));

    match verdict {
        Verdict::Forward { identity: None } => {
            metrics::counter!("gateway_requests_total", "outcome" => "whitelisted").increment(1);
            next.run(request).await
        }
        Verdict::Forward {
            identity: Some(identity),
        } => match attach_identity(&mut request, identity) {
            Ok(()) => {
                metrics::counter!("gateway_requests_total", "outcome" => "authenticated")
                    .increment(1);
                next.run(request).await
            }
            Err(reason) => reject(&request, reason),
        },
        Verdict::Reject(reason) => reject(&request, reason),
    }
}

fn attach_identity(
    request: &mut Request,
    identity: AuthenticatedIdentity,
) -> Result<(), RejectReason> {
    let value =
        HeaderValue::from_str(identity.header_value()).map_err(|_| RejectReason::InvalidSubject)?;
    tracing::debug!(user = %identity, path = %request.uri().path(), "request authenticated");
    request.headers_mut().insert(USER_NAME_HEADER, value);
    request.extensions_mut().insert(identity);
    Ok(())
}

fn reject(request: &Request, reason: RejectReason) -> Response {
    tracing::warn!(
        method = %request.method(),
        path = %request.uri().path(),
        reason = %reason,
        "request rejected at edge"
    );
    metrics::counter!("gateway_requests_total", "outcome" => "rejected").increment(1);
    metrics::counter!("gateway_rejections_total", "reason" => reason.label()).increment(1);
    GatewayError::Unauthorized.into_response()
}
