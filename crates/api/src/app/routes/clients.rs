use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use sellerdesk_core::ClientId;

use crate::app::routes::common::{no_content, respond, respond_items};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/mine", get(list_my_clients))
        .route(
            "/:id",
            get(get_client).patch(update_client).delete(delete_client),
        )
}

pub async fn create_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::CreateClientRequest>,
) -> axum::response::Response {
    respond(
        StatusCode::CREATED,
        services.clients.create(caller.seller_id(), body.into()).await,
    )
}

/// Every client in the registry.
pub async fn list_clients(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    respond_items(services.clients.list_all().await)
}

pub async fn list_my_clients(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    respond_items(services.clients.list_mine(caller.seller_id()).await)
}

pub async fn get_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ClientId = match errors::parse_id(&id, "client") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    respond(StatusCode::OK, services.clients.get(caller.seller_id(), id).await)
}

pub async fn update_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateClientRequest>,
) -> axum::response::Response {
    let id: ClientId = match errors::parse_id(&id, "client") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    respond(
        StatusCode::OK,
        services
            .clients
            .update(caller.seller_id(), id, body.into())
            .await,
    )
}

pub async fn delete_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ClientId = match errors::parse_id(&id, "client") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    no_content(services.clients.delete(caller.seller_id(), id).await)
}
