//! Trip repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{sea_orm_active_enums::MemberRole, trip_members, trips};

/// Trip repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TripRepository {
    db: DatabaseConnection,
}

impl TripRepository {
    /// Creates a new trip repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a trip by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<trips::Model>, DbErr> {
        trips::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new trip with the creator as its admin member.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_with_owner(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: Uuid,
    ) -> Result<(trips::Model, trip_members::Model), DbErr> {
        let txn = self.db.begin().await?;

        let now = chrono::Utc::now().into();
        let trip_id = Uuid::new_v4();

        let trip = trips::ActiveModel {
            id: Set(trip_id),
            name: Set(name.to_string()),
            description: Set(description.map(ToString::to_string)),
            owner_id: Set(owner_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let trip = trip.insert(&txn).await?;

        let owner_member = trip_members::ActiveModel {
            id: Set(Uuid::new_v4()),
            trip_id: Set(trip_id),
            user_id: Set(Some(owner_id)),
            is_virtual: Set(false),
            display_name: Set(None),
            role: Set(MemberRole::Admin),
            contribution: Set(rust_decimal::Decimal::ZERO),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let owner_member = owner_member.insert(&txn).await?;

        txn.commit().await?;

        Ok((trip, owner_member))
    }

    /// Gets a user's active membership row in a trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_active_membership(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<trip_members::Model>, DbErr> {
        trip_members::Entity::find()
            .filter(trip_members::Column::TripId.eq(trip_id))
            .filter(trip_members::Column::UserId.eq(user_id))
            .filter(trip_members::Column::IsActive.eq(true))
            .one(&self.db)
            .await
    }

    /// Checks if a user is an active member of a trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_active_member(&self, trip_id: Uuid, user_id: Uuid) -> Result<bool, DbErr> {
        Ok(self.find_active_membership(trip_id, user_id).await?.is_some())
    }
}
