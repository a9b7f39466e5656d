//! Notification dispatcher interface.
//!
//! Delivery (push, email, websocket) is owned by an external collaborator;
//! the core only needs a fire-and-forget dispatch point. Dispatch happens
//! after the originating database transaction has committed, and a failed
//! dispatch must never affect the committed mutation.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::types::{InvitationId, MemberId, TripId, UserId};

/// Events the core emits towards the notification collaborator.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A user was invited to a trip.
    InvitationCreated {
        /// The new invitation.
        invitation_id: InvitationId,
        /// The trip the invitation belongs to.
        trip_id: TripId,
        /// The invited user.
        invited_user_id: UserId,
    },
    /// An invitation was accepted.
    InvitationAccepted {
        /// The accepted invitation.
        invitation_id: InvitationId,
        /// The trip the invitation belongs to.
        trip_id: TripId,
        /// The user who accepted.
        accepted_by: UserId,
    },
    /// A member joined a trip (new row or replaced placeholder).
    MemberJoined {
        /// The trip that gained a member.
        trip_id: TripId,
        /// The joined (or replaced) member row.
        member_id: MemberId,
    },
    /// An invitation was rejected by the invited user.
    InvitationRejected {
        /// The rejected invitation.
        invitation_id: InvitationId,
        /// The trip the invitation belongs to.
        trip_id: TripId,
    },
}

impl NotificationEvent {
    /// Returns the wire name of the event.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvitationCreated { .. } => "invitation_created",
            Self::InvitationAccepted { .. } => "invitation_accepted",
            Self::MemberJoined { .. } => "member_joined",
            Self::InvitationRejected { .. } => "invitation_rejected",
        }
    }
}

/// Fire-and-forget notification dispatcher.
///
/// Implementations must not propagate delivery failures to the caller;
/// log and swallow them instead.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Dispatches an event to a set of recipient users.
    async fn notify(&self, event: NotificationEvent, recipients: &[UserId]);
}

/// Default dispatcher that records events in the log stream.
///
/// Stands in for the real delivery collaborator in development and tests.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: NotificationEvent, recipients: &[UserId]) {
        info!(
            event = event.kind(),
            recipients = recipients.len(),
            payload = %serde_json::to_string(&event).unwrap_or_default(),
            "notification dispatched"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kinds() {
        let event = NotificationEvent::MemberJoined {
            trip_id: TripId::new(),
            member_id: MemberId::new(),
        };
        assert_eq!(event.kind(), "member_joined");
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = NotificationEvent::InvitationRejected {
            invitation_id: InvitationId::new(),
            trip_id: TripId::new(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "invitation_rejected");
    }
}
