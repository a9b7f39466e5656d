//! Member repository: contributions, roles, and soft removal.
//!
//! Role changes and removals touch the trip's admin-count invariant, so
//! they lock the trip's member rows (`SELECT ... FOR UPDATE`) and re-run
//! the core guards under the lock before mutating.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use patungan_core::membership::types::MemberRole as CoreMemberRole;
use patungan_core::membership::{MemberGuard, MembershipError};
use patungan_shared::types::{MemberId, TripId, UserId};

use crate::entities::{sea_orm_active_enums::MemberRole, trip_members, trips};

use super::{db_err, member_to_core, role_to_db};

/// Member repository for contribution and role management.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    db: DatabaseConnection,
}

impl MemberRepository {
    /// Creates a new member repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the active members of a trip.
    ///
    /// # Errors
    ///
    /// Returns `TripNotFound` if the trip does not exist.
    pub async fn list_active(
        &self,
        trip_id: Uuid,
    ) -> Result<Vec<trip_members::Model>, MembershipError> {
        self.require_trip(trip_id).await?;
        trip_members::Entity::find()
            .filter(trip_members::Column::TripId.eq(trip_id))
            .filter(trip_members::Column::IsActive.eq(true))
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Finds a member row by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        member_id: Uuid,
    ) -> Result<Option<trip_members::Model>, MembershipError> {
        trip_members::Entity::find_by_id(member_id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Adds a virtual placeholder member to a trip.
    ///
    /// The acting user must be an active member of the trip. The new row
    /// has no linked user and can later be claimed through a REPLACE
    /// invitation.
    ///
    /// # Errors
    ///
    /// Returns `TripNotFound`, `NotMember`, `InvalidDisplayName`, or
    /// `NegativeContribution`.
    pub async fn add_virtual(
        &self,
        trip_id: Uuid,
        actor: Uuid,
        display_name: &str,
        contribution: Decimal,
    ) -> Result<trip_members::Model, MembershipError> {
        if display_name.trim().is_empty() {
            return Err(MembershipError::InvalidDisplayName);
        }
        MemberGuard::validate_contribution(contribution)?;
        self.require_trip(trip_id).await?;
        self.require_active_member(trip_id, actor).await?;

        let now = chrono::Utc::now().into();
        let member = trip_members::ActiveModel {
            id: Set(Uuid::new_v4()),
            trip_id: Set(trip_id),
            user_id: Set(None),
            is_virtual: Set(true),
            display_name: Set(Some(display_name.trim().to_string())),
            role: Set(MemberRole::Member),
            contribution: Set(contribution),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        member.insert(&self.db).await.map_err(db_err)
    }

    /// Updates a member's fund-pool contribution.
    ///
    /// # Errors
    ///
    /// Returns `NegativeContribution`, `MemberNotFound`, or
    /// `TargetInactive`.
    pub async fn update_contribution(
        &self,
        member_id: Uuid,
        amount: Decimal,
    ) -> Result<trip_members::Model, MembershipError> {
        MemberGuard::validate_contribution(amount)?;

        let member = self
            .find_by_id(member_id)
            .await?
            .ok_or(MembershipError::MemberNotFound(MemberId::from_uuid(member_id)))?;
        if !member.is_active {
            return Err(MembershipError::TargetInactive(MemberId::from_uuid(member_id)));
        }

        let mut active: trip_members::ActiveModel = member.into();
        active.contribution = Set(amount);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await.map_err(db_err)
    }

    /// Updates several members' contributions in one transaction.
    ///
    /// All-or-nothing: any invalid amount or missing member rolls back
    /// the whole batch.
    ///
    /// # Errors
    ///
    /// Returns the first validation or lookup error encountered.
    pub async fn batch_update_contributions(
        &self,
        updates: &[(Uuid, Decimal)],
    ) -> Result<Vec<trip_members::Model>, MembershipError> {
        for (_, amount) in updates {
            MemberGuard::validate_contribution(*amount)?;
        }

        let txn = self.db.begin().await.map_err(db_err)?;
        let mut updated = Vec::with_capacity(updates.len());

        for (member_id, amount) in updates {
            let member = trip_members::Entity::find_by_id(*member_id)
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(db_err)?
                .ok_or(MembershipError::MemberNotFound(MemberId::from_uuid(*member_id)))?;
            if !member.is_active {
                return Err(MembershipError::TargetInactive(MemberId::from_uuid(*member_id)));
            }

            let mut active: trip_members::ActiveModel = member.into();
            active.contribution = Set(*amount);
            active.updated_at = Set(chrono::Utc::now().into());
            updated.push(active.update(&txn).await.map_err(db_err)?);
        }

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Changes a member's role.
    ///
    /// The acting user must be an active admin. Demotions re-validate the
    /// last-admin and self-action guards under a row lock on the trip's
    /// member rows.
    ///
    /// # Errors
    ///
    /// Returns `NotAdmin`, `SelfAdminAction`, `LastAdmin`, or lookup
    /// errors.
    pub async fn change_role(
        &self,
        trip_id: Uuid,
        actor: Uuid,
        member_id: Uuid,
        new_role: CoreMemberRole,
    ) -> Result<trip_members::Model, MembershipError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let members = self.lock_trip_members(&txn, trip_id, actor).await?;
        let target = members
            .iter()
            .find(|m| m.id == member_id)
            .ok_or(MembershipError::MemberNotFound(MemberId::from_uuid(member_id)))?
            .clone();
        if !target.is_active {
            return Err(MembershipError::TargetInactive(MemberId::from_uuid(member_id)));
        }

        // Demoting an admin is the guarded path; promotions only add
        // admin capacity.
        if new_role == CoreMemberRole::Member {
            let core_members: Vec<_> = members.iter().map(member_to_core).collect();
            let core_target = member_to_core(&target);
            MemberGuard::ensure_not_self(UserId::from_uuid(actor), &core_target)?;
            MemberGuard::ensure_admin_remains(&core_members, &core_target)?;
        }

        let mut active: trip_members::ActiveModel = target.into();
        active.role = Set(role_to_db(new_role));
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Soft-removes a member from a trip (`is_active = false`).
    ///
    /// Member rows are never hard-deleted; expenses keep referencing
    /// them. The acting user must be an active admin, may not remove
    /// themself, and may not remove the last active admin.
    ///
    /// # Errors
    ///
    /// Returns `NotAdmin`, `SelfAdminAction`, `LastAdmin`, or lookup
    /// errors.
    pub async fn deactivate(
        &self,
        trip_id: Uuid,
        actor: Uuid,
        member_id: Uuid,
    ) -> Result<trip_members::Model, MembershipError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let members = self.lock_trip_members(&txn, trip_id, actor).await?;
        let target = members
            .iter()
            .find(|m| m.id == member_id)
            .ok_or(MembershipError::MemberNotFound(MemberId::from_uuid(member_id)))?
            .clone();
        if !target.is_active {
            return Err(MembershipError::TargetInactive(MemberId::from_uuid(member_id)));
        }

        let core_members: Vec<_> = members.iter().map(member_to_core).collect();
        let core_target = member_to_core(&target);
        MemberGuard::ensure_not_self(UserId::from_uuid(actor), &core_target)?;
        MemberGuard::ensure_admin_remains(&core_members, &core_target)?;

        let mut active: trip_members::ActiveModel = target.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    async fn require_trip(&self, trip_id: Uuid) -> Result<(), MembershipError> {
        let exists = trips::Entity::find_by_id(trip_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .is_some();
        if exists {
            Ok(())
        } else {
            Err(MembershipError::TripNotFound(TripId::from_uuid(trip_id)))
        }
    }

    async fn require_active_member(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
    ) -> Result<trip_members::Model, MembershipError> {
        trip_members::Entity::find()
            .filter(trip_members::Column::TripId.eq(trip_id))
            .filter(trip_members::Column::UserId.eq(user_id))
            .filter(trip_members::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(MembershipError::NotMember(UserId::from_uuid(user_id)))
    }

    /// Locks and returns all member rows of a trip, verifying the actor
    /// is an active admin. Runs inside the caller's transaction.
    async fn lock_trip_members(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        trip_id: Uuid,
        actor: Uuid,
    ) -> Result<Vec<trip_members::Model>, MembershipError> {
        self.require_trip(trip_id).await?;

        let members = trip_members::Entity::find()
            .filter(trip_members::Column::TripId.eq(trip_id))
            .lock_exclusive()
            .all(txn)
            .await
            .map_err(db_err)?;

        let actor_row = members
            .iter()
            .find(|m| m.user_id == Some(actor) && m.is_active)
            .ok_or(MembershipError::NotMember(UserId::from_uuid(actor)))?;
        if actor_row.role != MemberRole::Admin {
            return Err(MembershipError::NotAdmin(UserId::from_uuid(actor)));
        }

        Ok(members)
    }
}
