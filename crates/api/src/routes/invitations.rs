//! Invitation lifecycle routes.
//!
//! Notifications fire after the repository call returns, hence after the
//! underlying transaction has committed; a failed dispatch is the
//! notifier's problem and never affects the membership change.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use patungan_core::membership::types::InviteType;
use patungan_db::entities::{sea_orm_active_enums, trip_invitations};
use patungan_db::repositories::invitation::{CreateInvitationInput, InvitationRepository};
use patungan_db::MemberRepository;
use patungan_shared::NotificationEvent;
use patungan_shared::types::{InvitationId, MemberId, TripId, UserId};

use crate::{AppState, middleware::AuthUser};

use super::membership_error;

/// Creates the invitation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trips/{trip_id}/invitations", post(create_invitation))
        .route("/invitations", get(list_my_invitations))
        .route("/invitations/{invitation_id}/accept", post(accept_invitation))
        .route("/invitations/{invitation_id}/reject", post(reject_invitation))
        .route("/invitations/{invitation_id}/cancel", post(cancel_invitation))
        .route("/invitations/sweep-expired", post(sweep_expired))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an invitation.
#[derive(Debug, serde::Deserialize)]
pub struct CreateInvitationRequest {
    /// The user to invite.
    pub invited_user_id: Uuid,
    /// "add" or "replace".
    pub invite_type: String,
    /// The virtual member to replace (REPLACE only).
    pub target_member_id: Option<Uuid>,
    /// Optional message shown to the invited user.
    pub message: Option<String>,
}

/// Response for an invitation.
#[derive(Debug, serde::Serialize)]
pub struct InvitationResponse {
    /// Invitation ID.
    pub id: Uuid,
    /// Trip ID.
    pub trip_id: Uuid,
    /// The invited user.
    pub invited_user_id: Uuid,
    /// "add" or "replace".
    pub invite_type: String,
    /// The replace target, if any.
    pub target_member_id: Option<Uuid>,
    /// Current status.
    pub status: String,
    /// Optional message.
    pub message: Option<String>,
    /// The inviting user.
    pub created_by: Uuid,
    /// Expiry timestamp.
    pub expires_at: String,
    /// Response timestamp, once terminal.
    pub responded_at: Option<String>,
}

impl From<trip_invitations::Model> for InvitationResponse {
    fn from(model: trip_invitations::Model) -> Self {
        Self {
            id: model.id,
            trip_id: model.trip_id,
            invited_user_id: model.invited_user_id,
            invite_type: match model.invite_type {
                sea_orm_active_enums::InviteType::Add => "add".to_string(),
                sea_orm_active_enums::InviteType::Replace => "replace".to_string(),
            },
            target_member_id: model.target_member_id,
            status: match model.status {
                sea_orm_active_enums::InvitationStatus::Pending => "pending".to_string(),
                sea_orm_active_enums::InvitationStatus::Accepted => "accepted".to_string(),
                sea_orm_active_enums::InvitationStatus::Rejected => "rejected".to_string(),
                sea_orm_active_enums::InvitationStatus::Expired => "expired".to_string(),
                sea_orm_active_enums::InvitationStatus::Cancelled => "cancelled".to_string(),
            },
            message: model.message,
            created_by: model.created_by,
            expires_at: model.expires_at.to_rfc3339(),
            responded_at: model.responded_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Response for an expiry sweep.
#[derive(Debug, serde::Serialize)]
pub struct SweepResponse {
    /// Number of invitations flipped to EXPIRED by this sweep.
    pub expired_count: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Invites a user to a trip.
async fn create_invitation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trip_id): Path<Uuid>,
    Json(body): Json<CreateInvitationRequest>,
) -> impl IntoResponse {
    let invite_type = match body.invite_type.to_lowercase().as_str() {
        "add" => InviteType::Add,
        "replace" => InviteType::Replace,
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "VALIDATION_ERROR",
                    "message": format!("Unknown invite type: {other}")
                })),
            )
                .into_response();
        }
    };

    let repo = InvitationRepository::new(state.db.as_ref().clone());
    let input = CreateInvitationInput {
        trip_id,
        created_by: user.user_id(),
        invited_user_id: body.invited_user_id,
        invite_type,
        target_member_id: body.target_member_id,
        message: body.message,
    };

    match repo.create(input).await {
        Ok(invitation) => {
            state
                .notifier
                .notify(
                    NotificationEvent::InvitationCreated {
                        invitation_id: InvitationId::from_uuid(invitation.id),
                        trip_id: TripId::from_uuid(invitation.trip_id),
                        invited_user_id: UserId::from_uuid(invitation.invited_user_id),
                    },
                    &[UserId::from_uuid(invitation.invited_user_id)],
                )
                .await;
            (
                StatusCode::CREATED,
                Json(InvitationResponse::from(invitation)),
            )
                .into_response()
        }
        Err(e) => membership_error(&e),
    }
}

/// Lists the caller's pending invitations.
async fn list_my_invitations(
    State(state): State<AppState>,
    user: AuthUser,
) -> impl IntoResponse {
    let repo = InvitationRepository::new(state.db.as_ref().clone());
    match repo.list_pending_for_user(user.user_id()).await {
        Ok(invitations) => Json(
            invitations
                .into_iter()
                .map(InvitationResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => membership_error(&e),
    }
}

/// Accepts an invitation, joining (or claiming a placeholder in) the trip.
async fn accept_invitation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(invitation_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvitationRepository::new(state.db.as_ref().clone());
    let outcome = match repo.accept(invitation_id, user.user_id()).await {
        Ok(outcome) => outcome,
        Err(e) => return membership_error(&e),
    };

    // Post-commit notifications: the inviter hears about the acceptance,
    // the rest of the trip hears about the new member.
    state
        .notifier
        .notify(
            NotificationEvent::InvitationAccepted {
                invitation_id: InvitationId::from_uuid(outcome.invitation.id),
                trip_id: TripId::from_uuid(outcome.invitation.trip_id),
                accepted_by: UserId::from_uuid(user.user_id()),
            },
            &[UserId::from_uuid(outcome.invitation.created_by)],
        )
        .await;

    let member_repo = MemberRepository::new(state.db.as_ref().clone());
    if let Ok(members) = member_repo.list_active(outcome.invitation.trip_id).await {
        let recipients: Vec<UserId> = members
            .iter()
            .filter_map(|m| m.user_id)
            .filter(|&id| id != user.user_id())
            .map(UserId::from_uuid)
            .collect();
        state
            .notifier
            .notify(
                NotificationEvent::MemberJoined {
                    trip_id: TripId::from_uuid(outcome.invitation.trip_id),
                    member_id: MemberId::from_uuid(outcome.member.id),
                },
                &recipients,
            )
            .await;
    }

    Json(serde_json::json!({
        "invitation": InvitationResponse::from(outcome.invitation),
        "member": super::members::MemberResponse::from(outcome.member),
    }))
    .into_response()
}

/// Rejects an invitation.
async fn reject_invitation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(invitation_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvitationRepository::new(state.db.as_ref().clone());
    match repo.reject(invitation_id, user.user_id()).await {
        Ok(invitation) => {
            state
                .notifier
                .notify(
                    NotificationEvent::InvitationRejected {
                        invitation_id: InvitationId::from_uuid(invitation.id),
                        trip_id: TripId::from_uuid(invitation.trip_id),
                    },
                    &[UserId::from_uuid(invitation.created_by)],
                )
                .await;
            Json(InvitationResponse::from(invitation)).into_response()
        }
        Err(e) => membership_error(&e),
    }
}

/// Cancels an invitation (creator only).
async fn cancel_invitation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(invitation_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvitationRepository::new(state.db.as_ref().clone());
    match repo.cancel(invitation_id, user.user_id()).await {
        Ok(invitation) => Json(InvitationResponse::from(invitation)).into_response(),
        Err(e) => membership_error(&e),
    }
}

/// Expires all overdue pending invitations.
async fn sweep_expired(State(state): State<AppState>) -> impl IntoResponse {
    let repo = InvitationRepository::new(state.db.as_ref().clone());
    match repo.sweep_expired().await {
        Ok(expired_count) => Json(SweepResponse { expired_count }).into_response(),
        Err(e) => membership_error(&e),
    }
}
