//! Member roles and the invitation state machine.
//!
//! This module implements the membership lifecycle:
//! - `types` - Roles, invitation states, and transition actions
//! - `invitation` - Invitation state transition validation
//! - `admin` - Admin-count and self-action guards
//! - `error` - Membership-specific error types
//!
//! The services here are pure: they validate a snapshot of the current
//! rows and return the action to execute. The repository layer runs the
//! returned action inside a database transaction, re-validating under
//! row locks where races are possible.

pub mod admin;
pub mod error;
pub mod invitation;
pub mod types;

pub use admin::MemberGuard;
pub use error::MembershipError;
pub use invitation::{InvitationService, ReplaceTarget};
pub use types::{
    ActiveMember, InvitationAction, InvitationSnapshot, InvitationStatus, InviteType, MemberRole,
    INVITATION_TTL_DAYS,
};
