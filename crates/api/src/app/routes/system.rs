use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::CallerContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(caller): Extension<CallerContext>) -> impl IntoResponse {
    let identity = caller.identity();
    Json(serde_json::json!({
        "id": identity.seller_id.to_string(),
        "name": identity.name,
        "last_name": identity.last_name,
        "email": identity.email,
    }))
}
