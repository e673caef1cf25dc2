use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use sellerdesk_auth::{AuthError, AuthenticationProvider};
use sellerdesk_infra::SellerDirectory;

use crate::app::errors::json_error;
use crate::context::CallerContext;

#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<dyn AuthenticationProvider>,
    pub sellers: Arc<dyn SellerDirectory>,
}

/// Resolve the bearer credential into a [`CallerContext`] before any handler runs.
///
/// The seller's display profile is refreshed in the directory on every request
/// so reports can show it; a failure there is logged and does not block the call.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).map_err(unauthenticated)?;

    let identity = state
        .authenticator
        .authenticate(token, Utc::now())
        .map_err(|e| {
            tracing::debug!(error = %e, "authentication failed");
            unauthenticated(e)
        })?;

    if let Err(e) = state.sellers.record(identity.profile()).await {
        tracing::warn!(seller_id = %identity.seller_id(), error = %e, "failed to record seller profile");
    }

    req.extensions_mut().insert(CallerContext::new(identity));

    Ok(next.run(req).await)
}

fn unauthenticated(err: AuthError) -> Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?;

    let header = header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("authorization header is not ASCII".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("expected a Bearer credential".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    Ok(token)
}
