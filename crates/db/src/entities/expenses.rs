//! `SeaORM` Entity for the expenses table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub trip_id: Uuid,
    pub description: String,
    /// Always non-negative; income is flagged, never signed.
    pub amount: Decimal,
    pub is_income: bool,
    pub payer_member_id: Uuid,
    pub is_paid_from_fund: bool,
    pub expense_date: Date,
    pub created_by: Uuid,
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
        belongs_to = "super::trip_members::Entity",
        from = "Column::PayerMemberId",
        to = "super::trip_members::Column::Id"
    )]
    TripMembers,
    #[sea_orm(has_many = "super::expense_participants::Entity")]
    ExpenseParticipants,
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl Related<super::trip_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TripMembers.def()
    }
}

impl Related<super::expense_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseParticipants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
