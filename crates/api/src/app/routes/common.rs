use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use sellerdesk_infra::ServiceResult;

use crate::app::errors;

/// Serialize a successful result with `status`, or map the error.
pub fn respond<T: Serialize>(status: StatusCode, result: ServiceResult<T>) -> axum::response::Response {
    match result {
        Ok(value) => (status, Json(value)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Wrap a listing as `{"items": [...]}`.
pub fn respond_items<T: Serialize>(result: ServiceResult<Vec<T>>) -> axum::response::Response {
    match result {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub fn no_content(result: ServiceResult<()>) -> axum::response::Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
