//! Invitation state transition validation.
//!
//! Stateless service in the validate-then-execute shape: every method
//! checks a snapshot of the invitation row and returns the action to
//! apply. The repository executes the action inside a transaction and
//! re-validates racy preconditions (current status, membership) under
//! row locks.

use chrono::{DateTime, Duration, Utc};

use patungan_shared::types::{MemberId, TripId, UserId};

use super::error::MembershipError;
use super::types::{
    InvitationAction, InvitationSnapshot, InvitationStatus, InviteType, INVITATION_TTL_DAYS,
};

/// The fields of a REPLACE target row needed for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceTarget {
    /// The member row to be claimed.
    pub member_id: MemberId,
    /// The trip the member belongs to.
    pub trip_id: TripId,
    /// Placeholder flag; only virtual members can be replaced.
    pub is_virtual: bool,
    /// Soft-removal flag.
    pub is_active: bool,
}

/// Stateless service for invitation lifecycle transitions.
pub struct InvitationService;

impl InvitationService {
    /// Returns the expiry timestamp for an invitation created at `now`.
    #[must_use]
    pub fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(INVITATION_TTL_DAYS)
    }

    /// Validates the shape of a new invitation.
    ///
    /// ADD invitations must not name a target; REPLACE invitations must
    /// name an active virtual member of the same trip. Membership and
    /// duplicate-invitation conflicts are database checks and stay with
    /// the repository.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the target does not fit the invite
    /// type.
    pub fn validate_create(
        trip_id: TripId,
        invite_type: InviteType,
        target: Option<&ReplaceTarget>,
    ) -> Result<(), MembershipError> {
        match invite_type {
            InviteType::Add => Ok(()),
            InviteType::Replace => {
                let target = target.ok_or(MembershipError::ReplaceTargetRequired)?;
                if target.trip_id != trip_id {
                    return Err(MembershipError::TargetTripMismatch(target.member_id));
                }
                if !target.is_active {
                    return Err(MembershipError::TargetInactive(target.member_id));
                }
                if !target.is_virtual {
                    return Err(MembershipError::TargetNotVirtual(target.member_id));
                }
                Ok(())
            }
        }
    }

    /// Validates acceptance of an invitation.
    ///
    /// # Errors
    ///
    /// - `NotInvited` if `user_id` is not the invited user
    /// - `InvitationExpired` if the invitation already sits in EXPIRED,
    ///   or is PENDING but past its expiry (the repository then flips the
    ///   row to EXPIRED in the same transaction, making repeat calls
    ///   deterministic no-ops)
    /// - `NotPending` for any other terminal state
    pub fn accept(
        invitation: &InvitationSnapshot,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<InvitationAction, MembershipError> {
        if invitation.invited_user_id != user_id {
            return Err(MembershipError::NotInvited);
        }
        match invitation.status {
            InvitationStatus::Pending => {}
            InvitationStatus::Expired => return Err(MembershipError::InvitationExpired),
            status => return Err(MembershipError::NotPending { status }),
        }
        if now > invitation.expires_at {
            return Err(MembershipError::InvitationExpired);
        }

        Ok(InvitationAction::Accept { responded_at: now })
    }

    /// Validates rejection of an invitation. Only the invited user may
    /// reject, and only while the invitation is PENDING.
    ///
    /// # Errors
    ///
    /// Returns `NotInvited` on actor mismatch, `NotPending` otherwise.
    pub fn reject(
        invitation: &InvitationSnapshot,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<InvitationAction, MembershipError> {
        if invitation.invited_user_id != user_id {
            return Err(MembershipError::NotInvited);
        }
        if invitation.status != InvitationStatus::Pending {
            return Err(MembershipError::NotPending {
                status: invitation.status,
            });
        }

        Ok(InvitationAction::Reject { responded_at: now })
    }

    /// Validates cancellation of an invitation. Only its creator may
    /// cancel, and only while the invitation is PENDING.
    ///
    /// # Errors
    ///
    /// Returns `NotCreator` on actor mismatch, `NotPending` otherwise.
    pub fn cancel(
        invitation: &InvitationSnapshot,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<InvitationAction, MembershipError> {
        if invitation.created_by != user_id {
            return Err(MembershipError::NotCreator);
        }
        if invitation.status != InvitationStatus::Pending {
            return Err(MembershipError::NotPending {
                status: invitation.status,
            });
        }

        Ok(InvitationAction::Cancel { responded_at: now })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patungan_shared::types::InvitationId;

    fn snapshot(status: InvitationStatus) -> InvitationSnapshot {
        InvitationSnapshot {
            id: InvitationId::new(),
            trip_id: TripId::new(),
            invited_user_id: UserId::new(),
            invite_type: InviteType::Add,
            target_member_id: None,
            status,
            created_by: UserId::new(),
            expires_at: Utc::now() + Duration::days(INVITATION_TTL_DAYS),
        }
    }

    #[test]
    fn test_expiry_horizon_is_seven_days() {
        let now = Utc::now();
        assert_eq!(InvitationService::expiry_from(now), now + Duration::days(7));
    }

    #[test]
    fn test_accept_pending() {
        let inv = snapshot(InvitationStatus::Pending);
        let now = Utc::now();
        let action = InvitationService::accept(&inv, inv.invited_user_id, now).unwrap();
        assert_eq!(action, InvitationAction::Accept { responded_at: now });
    }

    #[test]
    fn test_accept_wrong_user() {
        let inv = snapshot(InvitationStatus::Pending);
        let result = InvitationService::accept(&inv, UserId::new(), Utc::now());
        assert!(matches!(result, Err(MembershipError::NotInvited)));
    }

    #[test]
    fn test_accept_past_expiry() {
        let mut inv = snapshot(InvitationStatus::Pending);
        inv.expires_at = Utc::now() - Duration::hours(1);
        let result = InvitationService::accept(&inv, inv.invited_user_id, Utc::now());
        assert!(matches!(result, Err(MembershipError::InvitationExpired)));
    }

    #[test]
    fn test_accept_already_expired_is_idempotent_failure() {
        // After the repository flips the row to EXPIRED, repeat accepts
        // keep returning the same failure.
        let inv = snapshot(InvitationStatus::Expired);
        for _ in 0..3 {
            let result = InvitationService::accept(&inv, inv.invited_user_id, Utc::now());
            assert!(matches!(result, Err(MembershipError::InvitationExpired)));
        }
    }

    #[test]
    fn test_accept_terminal_states_conflict() {
        for status in [
            InvitationStatus::Accepted,
            InvitationStatus::Rejected,
            InvitationStatus::Cancelled,
        ] {
            let inv = snapshot(status);
            let result = InvitationService::accept(&inv, inv.invited_user_id, Utc::now());
            assert!(matches!(result, Err(MembershipError::NotPending { .. })));
        }
    }

    #[test]
    fn test_reject_pending() {
        let inv = snapshot(InvitationStatus::Pending);
        let now = Utc::now();
        let action = InvitationService::reject(&inv, inv.invited_user_id, now).unwrap();
        assert_eq!(action, InvitationAction::Reject { responded_at: now });
    }

    #[test]
    fn test_reject_requires_invited_user() {
        let inv = snapshot(InvitationStatus::Pending);
        let result = InvitationService::reject(&inv, inv.created_by, Utc::now());
        assert!(matches!(result, Err(MembershipError::NotInvited)));
    }

    #[test]
    fn test_cancel_requires_creator() {
        let inv = snapshot(InvitationStatus::Pending);
        let result = InvitationService::cancel(&inv, inv.invited_user_id, Utc::now());
        assert!(matches!(result, Err(MembershipError::NotCreator)));

        let action = InvitationService::cancel(&inv, inv.created_by, Utc::now()).unwrap();
        assert!(matches!(action, InvitationAction::Cancel { .. }));
    }

    #[test]
    fn test_cancel_terminal_state_conflicts() {
        let inv = snapshot(InvitationStatus::Rejected);
        let result = InvitationService::cancel(&inv, inv.created_by, Utc::now());
        assert!(matches!(
            result,
            Err(MembershipError::NotPending {
                status: InvitationStatus::Rejected
            })
        ));
    }

    #[test]
    fn test_validate_create_add_ignores_target() {
        assert!(InvitationService::validate_create(TripId::new(), InviteType::Add, None).is_ok());
    }

    #[test]
    fn test_validate_create_replace_requires_target() {
        let result = InvitationService::validate_create(TripId::new(), InviteType::Replace, None);
        assert!(matches!(
            result,
            Err(MembershipError::ReplaceTargetRequired)
        ));
    }

    #[test]
    fn test_validate_create_replace_target_checks() {
        let trip_id = TripId::new();
        let target = ReplaceTarget {
            member_id: MemberId::new(),
            trip_id,
            is_virtual: true,
            is_active: true,
        };
        assert!(
            InvitationService::validate_create(trip_id, InviteType::Replace, Some(&target)).is_ok()
        );

        let real = ReplaceTarget {
            is_virtual: false,
            ..target
        };
        assert!(matches!(
            InvitationService::validate_create(trip_id, InviteType::Replace, Some(&real)),
            Err(MembershipError::TargetNotVirtual(_))
        ));

        let removed = ReplaceTarget {
            is_active: false,
            ..target
        };
        assert!(matches!(
            InvitationService::validate_create(trip_id, InviteType::Replace, Some(&removed)),
            Err(MembershipError::TargetInactive(_))
        ));

        let elsewhere = ReplaceTarget {
            trip_id: TripId::new(),
            ..target
        };
        assert!(matches!(
            InvitationService::validate_create(trip_id, InviteType::Replace, Some(&elsewhere)),
            Err(MembershipError::TargetTripMismatch(_))
        ));
    }
}
