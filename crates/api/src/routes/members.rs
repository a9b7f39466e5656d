//! Member management routes: listing, virtual members, contributions,
//! roles, and soft removal.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use uuid::Uuid;

use patungan_core::membership::types::MemberRole;
use patungan_db::entities::trip_members;
use patungan_db::{MemberRepository, TripRepository};

use crate::{AppState, middleware::AuthUser};

use super::{forbidden_not_member, internal_error, membership_error};

/// Creates the member routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trips/{trip_id}/members", get(list_members))
        .route("/trips/{trip_id}/members/virtual", post(add_virtual_member))
        .route(
            "/trips/{trip_id}/members/contributions",
            put(batch_update_contributions),
        )
        .route(
            "/trips/{trip_id}/members/{member_id}/contribution",
            put(update_contribution),
        )
        .route("/trips/{trip_id}/members/{member_id}/role", put(change_role))
        .route("/trips/{trip_id}/members/{member_id}", delete(remove_member))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for adding a virtual member.
#[derive(Debug, serde::Deserialize)]
pub struct AddVirtualMemberRequest {
    /// Placeholder display name.
    pub display_name: String,
    /// Initial fund-pool contribution.
    #[serde(default)]
    pub contribution: Decimal,
}

/// Request body for updating a contribution.
#[derive(Debug, serde::Deserialize)]
pub struct UpdateContributionRequest {
    /// The new contribution amount.
    pub amount: Decimal,
}

/// One entry of a batch contribution update.
#[derive(Debug, serde::Deserialize)]
pub struct ContributionUpdate {
    /// The member to update.
    pub member_id: Uuid,
    /// The new contribution amount.
    pub amount: Decimal,
}

/// Request body for a batch contribution update.
#[derive(Debug, serde::Deserialize)]
pub struct BatchContributionsRequest {
    /// The updates to apply atomically.
    pub updates: Vec<ContributionUpdate>,
}

/// Request body for changing a member's role.
#[derive(Debug, serde::Deserialize)]
pub struct ChangeRoleRequest {
    /// The new role: "admin" or "member".
    pub role: String,
}

/// Response for a trip member.
#[derive(Debug, serde::Serialize)]
pub struct MemberResponse {
    /// Member ID.
    pub id: Uuid,
    /// Trip ID.
    pub trip_id: Uuid,
    /// Linked user, if any.
    pub user_id: Option<Uuid>,
    /// Whether this is a virtual placeholder.
    pub is_virtual: bool,
    /// Placeholder name for virtual members.
    pub display_name: Option<String>,
    /// Role within the trip.
    pub role: String,
    /// Fund-pool contribution.
    pub contribution: Decimal,
    /// Whether the member is active.
    pub is_active: bool,
}

impl From<trip_members::Model> for MemberResponse {
    fn from(model: trip_members::Model) -> Self {
        use patungan_db::entities::sea_orm_active_enums::MemberRole as DbRole;
        Self {
            id: model.id,
            trip_id: model.trip_id,
            user_id: model.user_id,
            is_virtual: model.is_virtual,
            display_name: model.display_name,
            role: match model.role {
                DbRole::Admin => "admin".to_string(),
                DbRole::Member => "member".to_string(),
            },
            contribution: model.contribution,
            is_active: model.is_active,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Lists the active members of a trip.
async fn list_members(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trip_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_membership(&state, trip_id, user.user_id()).await {
        return response;
    }

    let repo = MemberRepository::new(state.db.as_ref().clone());
    match repo.list_active(trip_id).await {
        Ok(members) => Json(
            members
                .into_iter()
                .map(MemberResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => membership_error(&e),
    }
}

/// Adds a virtual placeholder member.
async fn add_virtual_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trip_id): Path<Uuid>,
    Json(body): Json<AddVirtualMemberRequest>,
) -> impl IntoResponse {
    let repo = MemberRepository::new(state.db.as_ref().clone());
    match repo
        .add_virtual(trip_id, user.user_id(), &body.display_name, body.contribution)
        .await
    {
        Ok(member) => (StatusCode::CREATED, Json(MemberResponse::from(member))).into_response(),
        Err(e) => membership_error(&e),
    }
}

/// Updates one member's fund-pool contribution.
async fn update_contribution(
    State(state): State<AppState>,
    user: AuthUser,
    Path((trip_id, member_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateContributionRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_membership(&state, trip_id, user.user_id()).await {
        return response;
    }

    let repo = MemberRepository::new(state.db.as_ref().clone());
    match repo.update_contribution(member_id, body.amount).await {
        Ok(member) => Json(MemberResponse::from(member)).into_response(),
        Err(e) => membership_error(&e),
    }
}

/// Applies several contribution updates in one transaction.
async fn batch_update_contributions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trip_id): Path<Uuid>,
    Json(body): Json<BatchContributionsRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_membership(&state, trip_id, user.user_id()).await {
        return response;
    }

    let updates: Vec<(Uuid, Decimal)> = body
        .updates
        .iter()
        .map(|u| (u.member_id, u.amount))
        .collect();

    let repo = MemberRepository::new(state.db.as_ref().clone());
    match repo.batch_update_contributions(&updates).await {
        Ok(members) => Json(
            members
                .into_iter()
                .map(MemberResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => membership_error(&e),
    }
}

/// Changes a member's role (admin only; the last admin stays protected).
async fn change_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path((trip_id, member_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<ChangeRoleRequest>,
) -> impl IntoResponse {
    let Some(role) = MemberRole::parse(&body.role) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "VALIDATION_ERROR",
                "message": format!("Unknown role: {}", body.role)
            })),
        )
            .into_response();
    };

    let repo = MemberRepository::new(state.db.as_ref().clone());
    match repo
        .change_role(trip_id, user.user_id(), member_id, role)
        .await
    {
        Ok(member) => Json(MemberResponse::from(member)).into_response(),
        Err(e) => membership_error(&e),
    }
}

/// Soft-removes a member (admin only; never the last admin, never self).
async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((trip_id, member_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = MemberRepository::new(state.db.as_ref().clone());
    match repo.deactivate(trip_id, user.user_id(), member_id).await {
        Ok(member) => Json(MemberResponse::from(member)).into_response(),
        Err(e) => membership_error(&e),
    }
}

/// Checks the caller is an active member of the trip.
pub(crate) async fn require_membership(
    state: &AppState,
    trip_id: Uuid,
    user_id: Uuid,
) -> Result<(), axum::response::Response> {
    let repo = TripRepository::new(state.db.as_ref().clone());
    match repo.is_active_member(trip_id, user_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(forbidden_not_member()),
        Err(e) => Err(internal_error(&e)),
    }
}
