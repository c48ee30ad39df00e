//! API route definitions.

use axum::response::{IntoResponse, Response};
use axum::{Json, Router, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::AppState;
use utang_core::collection::CollectionError;
use utang_shared::AppError;

pub mod collections;
pub mod health;
pub mod payments;
pub mod wallets;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(wallets::routes())
        .merge(collections::routes())
        .merge(payments::routes())
}

/// Maps a collection error to an HTTP response.
///
/// Database details are logged, never surfaced to the caller; every other
/// rejection carries its human-readable reason verbatim.
pub(crate) fn collection_error_response(e: &CollectionError) -> Response {
    if let CollectionError::Database(_) = e {
        error!(error = %e, "collection operation failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response();
    }

    let status = StatusCode::from_u16(e.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.to_string()
        })),
    )
        .into_response()
}

/// Maps a shared application error to an HTTP response.
pub(crate) fn app_error_response(e: &AppError) -> Response {
    if e.status_code() >= 500 {
        error!(error = %e, "operation failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response();
    }

    let status = StatusCode::from_u16(e.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.to_string()
        })),
    )
        .into_response()
}
