//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use patungan_core::ledger::LedgerError;
use patungan_core::membership::MembershipError;
use patungan_shared::AppError;

use crate::AppState;

pub mod expenses;
pub mod health;
pub mod invitations;
pub mod members;
pub mod statistics;
pub mod trips;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(trips::routes())
        .merge(members::routes())
        .merge(expenses::routes())
        .merge(statistics::routes())
        .merge(invitations::routes())
}

// ============================================================================
// Error mapping
// ============================================================================

fn error_response(status: u16, code: &str, message: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(code, %message, "request failed");
        return (
            status,
            Json(json!({
                "error": code,
                "message": "An internal error occurred"
            })),
        )
            .into_response();
    }
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

/// Maps a membership error to a JSON error response.
pub(crate) fn membership_error(e: &MembershipError) -> Response {
    error_response(e.http_status_code(), e.error_code(), e.to_string())
}

/// Maps a ledger error to a JSON error response.
pub(crate) fn ledger_error(e: &LedgerError) -> Response {
    error_response(e.http_status_code(), e.error_code(), e.to_string())
}

/// Maps a shared application error to a JSON error response.
pub(crate) fn app_error(e: &AppError) -> Response {
    error_response(e.status_code(), e.error_code(), e.to_string())
}

/// Maps an infrastructure error to a 500 response.
pub(crate) fn internal_error(e: &sea_orm::DbErr) -> Response {
    app_error(&AppError::Database(e.to_string()))
}

/// A plain 404 for missing resources.
pub(crate) fn not_found(what: &str) -> Response {
    app_error(&AppError::NotFound(what.to_string()))
}

/// A plain 403 for callers outside the trip.
pub(crate) fn forbidden_not_member() -> Response {
    app_error(&AppError::Forbidden(
        "You are not an active member of this trip".to_string(),
    ))
}
