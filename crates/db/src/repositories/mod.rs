//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Domain rules stay in `patungan-core`; repositories fetch
//! the rows, hand them to the core services, and execute the validated
//! mutations transactionally.

pub mod expense;
pub mod invitation;
pub mod ledger;
pub mod member;
pub mod trip;

pub use expense::{CreateExpenseInput, ExpenseRepository, ExpenseWithParticipants, ShareInput};
pub use invitation::{AcceptOutcome, CreateInvitationInput, InvitationRepository};
pub use ledger::LedgerRepository;
pub use member::MemberRepository;
pub use trip::TripRepository;

use patungan_core::membership::types::{ActiveMember, InvitationSnapshot, MemberRole};
use patungan_core::membership::{InvitationStatus, InviteType, MembershipError};
use patungan_shared::types::{InvitationId, MemberId, TripId, UserId};

use crate::entities::{sea_orm_active_enums, trip_invitations, trip_members};

// ============================================================================
// Conversion helpers between database rows and core snapshots
// ============================================================================

/// Converts a database role to the core role.
pub(crate) const fn role_to_core(role: &sea_orm_active_enums::MemberRole) -> MemberRole {
    match role {
        sea_orm_active_enums::MemberRole::Admin => MemberRole::Admin,
        sea_orm_active_enums::MemberRole::Member => MemberRole::Member,
    }
}

/// Converts a core role to the database role.
pub(crate) const fn role_to_db(role: MemberRole) -> sea_orm_active_enums::MemberRole {
    match role {
        MemberRole::Admin => sea_orm_active_enums::MemberRole::Admin,
        MemberRole::Member => sea_orm_active_enums::MemberRole::Member,
    }
}

/// Converts a database invitation status to the core status.
pub(crate) const fn status_to_core(
    status: &sea_orm_active_enums::InvitationStatus,
) -> InvitationStatus {
    match status {
        sea_orm_active_enums::InvitationStatus::Pending => InvitationStatus::Pending,
        sea_orm_active_enums::InvitationStatus::Accepted => InvitationStatus::Accepted,
        sea_orm_active_enums::InvitationStatus::Rejected => InvitationStatus::Rejected,
        sea_orm_active_enums::InvitationStatus::Expired => InvitationStatus::Expired,
        sea_orm_active_enums::InvitationStatus::Cancelled => InvitationStatus::Cancelled,
    }
}

/// Converts a database invite type to the core invite type.
pub(crate) const fn invite_type_to_core(
    invite_type: &sea_orm_active_enums::InviteType,
) -> InviteType {
    match invite_type {
        sea_orm_active_enums::InviteType::Add => InviteType::Add,
        sea_orm_active_enums::InviteType::Replace => InviteType::Replace,
    }
}

/// Converts a core invite type to the database invite type.
pub(crate) const fn invite_type_to_db(
    invite_type: InviteType,
) -> sea_orm_active_enums::InviteType {
    match invite_type {
        InviteType::Add => sea_orm_active_enums::InviteType::Add,
        InviteType::Replace => sea_orm_active_enums::InviteType::Replace,
    }
}

/// Projects a member row into the core guard view.
pub(crate) fn member_to_core(model: &trip_members::Model) -> ActiveMember {
    ActiveMember {
        member_id: MemberId::from_uuid(model.id),
        user_id: model.user_id.map(UserId::from_uuid),
        role: role_to_core(&model.role),
        is_active: model.is_active,
    }
}

/// Projects an invitation row into the core state-machine snapshot.
pub(crate) fn invitation_to_snapshot(model: &trip_invitations::Model) -> InvitationSnapshot {
    InvitationSnapshot {
        id: InvitationId::from_uuid(model.id),
        trip_id: TripId::from_uuid(model.trip_id),
        invited_user_id: UserId::from_uuid(model.invited_user_id),
        invite_type: invite_type_to_core(&model.invite_type),
        target_member_id: model.target_member_id.map(MemberId::from_uuid),
        status: status_to_core(&model.status),
        created_by: UserId::from_uuid(model.created_by),
        expires_at: model.expires_at.to_utc(),
    }
}

/// Maps a database error into the membership taxonomy.
pub(crate) fn db_err(e: sea_orm::DbErr) -> MembershipError {
    MembershipError::Database(e.to_string())
}
