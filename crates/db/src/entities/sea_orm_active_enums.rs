//! Database enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a member within a trip.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "member_role")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Trip administrator.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Regular member.
    #[sea_orm(string_value = "member")]
    Member,
}

/// Lifecycle state of a trip invitation.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invitation_status")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    /// Awaiting a response.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted by the invited user.
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Declined by the invited user.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Timed out without a response.
    #[sea_orm(string_value = "expired")]
    Expired,
    /// Withdrawn by its creator.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Whether an invitation adds a member or replaces a virtual one.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invite_type")]
#[serde(rename_all = "lowercase")]
pub enum InviteType {
    /// Accepting inserts a new member row.
    #[sea_orm(string_value = "add")]
    Add,
    /// Accepting claims an existing virtual member row.
    #[sea_orm(string_value = "replace")]
    Replace,
}
