//! Membership error types.

use thiserror::Error;

use patungan_shared::types::{InvitationId, MemberId, TripId, UserId};

use super::types::InvitationStatus;

/// Errors that can occur during membership operations.
#[derive(Debug, Error)]
pub enum MembershipError {
    // ========== Not Found ==========
    /// Trip not found.
    #[error("Trip not found: {0}")]
    TripNotFound(TripId),

    /// Invitation not found.
    #[error("Invitation not found: {0}")]
    InvitationNotFound(InvitationId),

    /// Member not found.
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    // ========== Authorization ==========
    /// The invitation is addressed to a different user.
    #[error("Invitation is addressed to another user")]
    NotInvited,

    /// Only the invitation's creator may cancel it.
    #[error("Only the invitation's creator may cancel it")]
    NotCreator,

    /// The acting user is not an active member of the trip.
    #[error("User {0} is not an active member of the trip")]
    NotMember(UserId),

    /// The acting user is not an admin of the trip.
    #[error("User {0} is not an admin of the trip")]
    NotAdmin(UserId),

    // ========== Invitation Conflicts ==========
    /// The invitation is no longer pending.
    #[error("Invitation is {status}, not pending")]
    NotPending {
        /// The state the invitation is actually in.
        status: InvitationStatus,
    },

    /// The invitation's acceptance window has passed.
    #[error("Invitation has expired")]
    InvitationExpired,

    /// The invited user is already an active member of the trip.
    #[error("User {0} is already an active member of the trip")]
    AlreadyMember(UserId),

    /// The invited user already has a pending invitation to the trip.
    #[error("User {0} already has a pending invitation to the trip")]
    DuplicatePendingInvitation(UserId),

    // ========== Replace Validation ==========
    /// REPLACE invitations must name a target member.
    #[error("Replace invitations must name a target member")]
    ReplaceTargetRequired,

    /// The replace target is not a virtual member.
    #[error("Member {0} is not a virtual member")]
    TargetNotVirtual(MemberId),

    /// The replace target has been removed from the trip.
    #[error("Member {0} is no longer active")]
    TargetInactive(MemberId),

    /// The replace target belongs to a different trip.
    #[error("Member {0} belongs to a different trip")]
    TargetTripMismatch(MemberId),

    // ========== Admin Management ==========
    /// A trip must always retain at least one active admin.
    #[error("Cannot remove or demote the last admin of the trip")]
    LastAdmin,

    /// Admins cannot remove or demote themselves through member management.
    #[error("Cannot remove or demote yourself")]
    SelfAdminAction,

    // ========== Member Input ==========
    /// Virtual members need a non-empty display name.
    #[error("Virtual members need a non-empty display name")]
    InvalidDisplayName,

    // ========== Contributions ==========
    /// Contributions are non-negative.
    #[error("Contribution cannot be negative")]
    NegativeContribution,

    // ========== Database ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl MembershipError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::TripNotFound(_) => "TRIP_NOT_FOUND",
            Self::InvitationNotFound(_) => "INVITATION_NOT_FOUND",
            Self::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::NotInvited => "NOT_INVITED",
            Self::NotCreator => "NOT_CREATOR",
            Self::NotMember(_) => "NOT_MEMBER",
            Self::NotAdmin(_) => "NOT_ADMIN",
            Self::NotPending { .. } => "INVITATION_NOT_PENDING",
            Self::InvitationExpired => "INVITATION_EXPIRED",
            Self::AlreadyMember(_) => "ALREADY_MEMBER",
            Self::DuplicatePendingInvitation(_) => "DUPLICATE_PENDING_INVITATION",
            Self::ReplaceTargetRequired => "REPLACE_TARGET_REQUIRED",
            Self::TargetNotVirtual(_) => "TARGET_NOT_VIRTUAL",
            Self::TargetInactive(_) => "TARGET_INACTIVE",
            Self::TargetTripMismatch(_) => "TARGET_TRIP_MISMATCH",
            Self::LastAdmin => "LAST_ADMIN",
            Self::SelfAdminAction => "SELF_ADMIN_ACTION",
            Self::InvalidDisplayName => "INVALID_DISPLAY_NAME",
            Self::NegativeContribution => "NEGATIVE_CONTRIBUTION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::ReplaceTargetRequired
            | Self::TargetNotVirtual(_)
            | Self::TargetInactive(_)
            | Self::TargetTripMismatch(_)
            | Self::InvalidDisplayName
            | Self::NegativeContribution => 400,

            // 403 Forbidden - actor mismatch
            Self::NotInvited | Self::NotCreator | Self::NotMember(_) | Self::NotAdmin(_) => 403,

            // 404 Not Found
            Self::TripNotFound(_)
            | Self::InvitationNotFound(_)
            | Self::MemberNotFound(_)
            | Self::UserNotFound(_) => 404,

            // 409 Conflict - state conflicts
            Self::NotPending { .. }
            | Self::AlreadyMember(_)
            | Self::DuplicatePendingInvitation(_)
            | Self::LastAdmin
            | Self::SelfAdminAction => 409,

            // 410 Gone - expiry
            Self::InvitationExpired => 410,

            // 500 Internal Server Error
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(MembershipError::LastAdmin.error_code(), "LAST_ADMIN");
        assert_eq!(
            MembershipError::InvitationExpired.error_code(),
            "INVITATION_EXPIRED"
        );
        assert_eq!(
            MembershipError::NotPending {
                status: InvitationStatus::Accepted
            }
            .error_code(),
            "INVITATION_NOT_PENDING"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(MembershipError::ReplaceTargetRequired.http_status_code(), 400);
        assert_eq!(MembershipError::NotInvited.http_status_code(), 403);
        assert_eq!(
            MembershipError::InvitationNotFound(InvitationId::new()).http_status_code(),
            404
        );
        assert_eq!(MembershipError::LastAdmin.http_status_code(), 409);
        assert_eq!(MembershipError::InvitationExpired.http_status_code(), 410);
        assert_eq!(
            MembershipError::Database("boom".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_not_pending_display() {
        let err = MembershipError::NotPending {
            status: InvitationStatus::Cancelled,
        };
        assert_eq!(err.to_string(), "Invitation is cancelled, not pending");
    }
}
