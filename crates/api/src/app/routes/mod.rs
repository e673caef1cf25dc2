use axum::{routing::get, Router};

pub mod clients;
pub mod common;
pub mod orders;
pub mod products;
pub mod reports;
pub mod system;

/// Router for all authenticated (seller-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/products", products::router())
        .nest("/clients", clients::router())
        .nest("/orders", orders::router())
        .nest("/reports", reports::router())
}
