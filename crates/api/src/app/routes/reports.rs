use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};

use crate::app::routes::common::respond_items;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/top-clients", get(top_clients))
        .route("/top-sellers", get(top_sellers))
}

pub async fn top_clients(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    respond_items(services.reports.top_clients().await)
}

pub async fn top_sellers(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    respond_items(services.reports.top_sellers().await)
}
