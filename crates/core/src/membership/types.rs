//! Membership domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use patungan_shared::types::{InvitationId, MemberId, TripId, UserId};

/// How long a new invitation stays open before it expires.
pub const INVITATION_TTL_DAYS: i64 = 7;

/// Role of a member within a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Can record expenses and view the ledger.
    Member = 0,
    /// Can additionally manage members, roles, and invitations.
    Admin = 1,
}

impl MemberRole {
    /// Parse a role from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }
}

/// State of a trip invitation.
///
/// `Pending` is the only non-terminal state; a terminal state is never
/// revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    /// Awaiting a response from the invited user.
    Pending,
    /// Accepted; the user became (or replaced) a member.
    Accepted,
    /// Declined by the invited user.
    Rejected,
    /// Timed out without a response.
    Expired,
    /// Withdrawn by its creator.
    Cancelled,
}

impl InvitationStatus {
    /// Returns true for states that can never transition again.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an invitation adds a new member or replaces a virtual one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteType {
    /// Accepting inserts a brand-new member row.
    Add,
    /// Accepting claims an existing virtual member row in place.
    Replace,
}

impl InviteType {
    /// Returns the string representation of the invite type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Replace => "replace",
        }
    }
}

/// The fields of an invitation row the state machine needs to validate
/// a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationSnapshot {
    /// The invitation.
    pub id: InvitationId,
    /// The trip it belongs to.
    pub trip_id: TripId,
    /// The user being invited.
    pub invited_user_id: UserId,
    /// Add or replace.
    pub invite_type: InviteType,
    /// The virtual member being replaced (REPLACE only).
    pub target_member_id: Option<MemberId>,
    /// Current state.
    pub status: InvitationStatus,
    /// The user who created the invitation.
    pub created_by: UserId,
    /// Point in time past which the invitation can no longer be accepted.
    pub expires_at: DateTime<Utc>,
}

/// A validated state transition, ready for the repository to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationAction {
    /// Move to ACCEPTED and mutate membership.
    Accept {
        /// Response timestamp to record.
        responded_at: DateTime<Utc>,
    },
    /// Move to REJECTED.
    Reject {
        /// Response timestamp to record.
        responded_at: DateTime<Utc>,
    },
    /// Move to CANCELLED.
    Cancel {
        /// Response timestamp to record.
        responded_at: DateTime<Utc>,
    },
}

/// The fields of a member row the guards need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveMember {
    /// The member row.
    pub member_id: MemberId,
    /// Linked user account; `None` for virtual members.
    pub user_id: Option<UserId>,
    /// Role within the trip.
    pub role: MemberRole,
    /// Soft-removal flag.
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_round_trip() {
        assert_eq!(MemberRole::parse("admin"), Some(MemberRole::Admin));
        assert_eq!(MemberRole::parse("MEMBER"), Some(MemberRole::Member));
        assert_eq!(MemberRole::parse("owner"), None);
        assert_eq!(MemberRole::Admin.as_str(), "admin");
    }

    #[test]
    fn test_role_ordering() {
        assert!(MemberRole::Member < MemberRole::Admin);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!InvitationStatus::Pending.is_terminal());
        assert!(InvitationStatus::Accepted.is_terminal());
        assert!(InvitationStatus::Rejected.is_terminal());
        assert!(InvitationStatus::Expired.is_terminal());
        assert!(InvitationStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_invite_type_as_str() {
        assert_eq!(InviteType::Add.as_str(), "add");
        assert_eq!(InviteType::Replace.as_str(), "replace");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(InvitationStatus::Pending.to_string(), "pending");
        assert_eq!(InvitationStatus::Cancelled.to_string(), "cancelled");
    }
}
