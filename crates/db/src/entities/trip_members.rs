//! `SeaORM` Entity for the trip_members table.
//!
//! Expenses and participant shares reference this table, never `users`
//! directly; replacing a virtual member therefore mutates the row in
//! place and all historical references stay valid.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::MemberRole;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "trip_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub trip_id: Uuid,
    /// Linked user account; `NULL` exactly for virtual members.
    pub user_id: Option<Uuid>,
    pub is_virtual: bool,
    /// Placeholder name; set exactly for virtual members.
    pub display_name: Option<String>,
    pub role: MemberRole,
    pub contribution: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trips::Entity",
        from = "Column::TripId",
        to = "super::trips::Column::Id"
    )]
    Trips,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::expense_participants::Entity")]
    ExpenseParticipants,
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::expense_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseParticipants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
