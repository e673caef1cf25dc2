//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage backend selection and service construction
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and their mapping to domain inputs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use sellerdesk_auth::{AuthenticationProvider, Hs256Authenticator};

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router from configuration (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let authenticator =
        Arc::new(Hs256Authenticator::new(config.jwt_secret.as_bytes()).with_leeway(config.token_leeway));
    let services = Arc::new(services::build_services(config).await?);
    Ok(router(authenticator, services))
}

/// Router over already-built services.
pub fn router(authenticator: Arc<dyn AuthenticationProvider>, services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        authenticator,
        sellers: services.sellers.clone(),
    };

    // Protected routes: require an authenticated seller.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
