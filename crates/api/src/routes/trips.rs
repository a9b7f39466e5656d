//! Trip management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use patungan_db::TripRepository;
use patungan_db::entities::trips;

use crate::{AppState, middleware::AuthUser};

use super::{forbidden_not_member, internal_error, not_found};

/// Creates the trip routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trips", post(create_trip))
        .route("/trips/{trip_id}", get(get_trip))
}

/// Request body for creating a trip.
#[derive(Debug, serde::Deserialize)]
pub struct CreateTripRequest {
    /// Trip name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Response for a trip.
#[derive(Debug, serde::Serialize)]
pub struct TripResponse {
    /// Trip ID.
    pub id: Uuid,
    /// Trip name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// The user who created the trip.
    pub owner_id: Uuid,
    /// Whether the trip is active.
    pub is_active: bool,
    /// Created at timestamp.
    pub created_at: String,
}

impl From<trips::Model> for TripResponse {
    fn from(model: trips::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            owner_id: model.owner_id,
            is_active: model.is_active,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// Creates a trip; the creator becomes its admin member.
async fn create_trip(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateTripRequest>,
) -> impl IntoResponse {
    if body.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "VALIDATION_ERROR",
                "message": "Trip name must not be empty"
            })),
        )
            .into_response();
    }

    let repo = TripRepository::new(state.db.as_ref().clone());
    match repo
        .create_with_owner(body.name.trim(), body.description.as_deref(), user.user_id())
        .await
    {
        Ok((trip, _owner_member)) => {
            (StatusCode::CREATED, Json(TripResponse::from(trip))).into_response()
        }
        Err(e) => internal_error(&e),
    }
}

/// Fetches a trip. Visible only to its active members.
async fn get_trip(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trip_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = TripRepository::new(state.db.as_ref().clone());

    let trip = match repo.find_by_id(trip_id).await {
        Ok(Some(trip)) => trip,
        Ok(None) => return not_found("Trip"),
        Err(e) => return internal_error(&e),
    };

    match repo.is_active_member(trip_id, user.user_id()).await {
        Ok(true) => Json(TripResponse::from(trip)).into_response(),
        Ok(false) => forbidden_not_member(),
        Err(e) => internal_error(&e),
    }
}
