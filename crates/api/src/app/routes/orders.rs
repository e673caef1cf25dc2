use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use sellerdesk_core::OrderId;

use crate::app::routes::common::{no_content, respond, respond_items};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/mine", get(list_my_orders))
        .route(
            "/:id",
            get(get_order).patch(update_order).delete(delete_order),
        )
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let input = match body.into_domain() {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    respond(
        StatusCode::CREATED,
        services.orders.place(caller.seller_id(), input).await,
    )
}

/// Every order, across sellers.
pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    respond_items(services.orders.list_all().await)
}

/// The caller's orders; `?state=` narrows to one state.
pub async fn list_my_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<dto::StateQuery>,
) -> axum::response::Response {
    let state = match query.state.as_deref().map(dto::parse_state).transpose() {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    respond_items(services.orders.list_mine(caller.seller_id(), state).await)
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match errors::parse_id(&id, "order") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    respond(StatusCode::OK, services.orders.get(caller.seller_id(), id).await)
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateOrderRequest>,
) -> axum::response::Response {
    let id: OrderId = match errors::parse_id(&id, "order") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch = match body.into_domain() {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    respond(
        StatusCode::OK,
        services.orders.update(caller.seller_id(), id, patch).await,
    )
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match errors::parse_id(&id, "order") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    no_content(services.orders.delete(caller.seller_id(), id).await)
}
