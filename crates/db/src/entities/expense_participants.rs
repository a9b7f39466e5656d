//! `SeaORM` Entity for the expense_participants table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub expense_id: Uuid,
    pub trip_member_id: Uuid,
    /// Stored non-negative; sums to the expense amount within one minor unit.
    pub share_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id"
    )]
    Expenses,
    #[sea_orm(
        belongs_to = "super::trip_members::Entity",
        from = "Column::TripMemberId",
        to = "super::trip_members::Column::Id"
    )]
    TripMembers,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::trip_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TripMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
