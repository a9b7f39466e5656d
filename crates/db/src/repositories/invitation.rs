//! Invitation repository: the membership state machine's executor.
//!
//! The core service validates transitions on row snapshots; this
//! repository executes them. `accept` runs as a single transaction with
//! the invitation row locked, so the two-invitations-one-user and
//! double-accept races collapse into a deterministic winner and a
//! `Conflict` (or `Expired`) loser.

use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use patungan_core::membership::types::{InvitationAction, InviteType};
use patungan_core::membership::{InvitationService, MembershipError, ReplaceTarget};
use patungan_shared::types::{InvitationId, MemberId, TripId, UserId};

use crate::entities::{
    sea_orm_active_enums::{InvitationStatus, MemberRole},
    trip_invitations, trip_members, trips, users,
};

use super::{db_err, invitation_to_snapshot, invite_type_to_db};

/// Input for creating an invitation.
#[derive(Debug, Clone)]
pub struct CreateInvitationInput {
    /// The trip to invite into.
    pub trip_id: Uuid,
    /// The inviting user (must be an active member).
    pub created_by: Uuid,
    /// The user being invited.
    pub invited_user_id: Uuid,
    /// Add a new member or replace a virtual one.
    pub invite_type: InviteType,
    /// The virtual member to replace (REPLACE only).
    pub target_member_id: Option<Uuid>,
    /// Optional message shown to the invited user.
    pub message: Option<String>,
}

/// Result of a successful acceptance: the terminal invitation row and
/// the member row it created or claimed.
#[derive(Debug, Clone)]
pub struct AcceptOutcome {
    /// The invitation, now ACCEPTED.
    pub invitation: trip_invitations::Model,
    /// The inserted (ADD) or mutated-in-place (REPLACE) member row.
    pub member: trip_members::Model,
}

/// Invitation repository.
#[derive(Debug, Clone)]
pub struct InvitationRepository {
    db: DatabaseConnection,
}

impl InvitationRepository {
    /// Creates a new invitation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an invitation by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<trip_invitations::Model>, MembershipError> {
        trip_invitations::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists a user's pending invitations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_pending_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<trip_invitations::Model>, MembershipError> {
        trip_invitations::Entity::find()
            .filter(trip_invitations::Column::InvitedUserId.eq(user_id))
            .filter(trip_invitations::Column::Status.eq(InvitationStatus::Pending))
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Creates a PENDING invitation.
    ///
    /// # Errors
    ///
    /// - `TripNotFound` / `UserNotFound` on missing references
    /// - `NotMember` if the creator is not an active member of the trip
    /// - `AlreadyMember` if the invited user already belongs to the trip
    /// - `DuplicatePendingInvitation` if one is already open
    /// - REPLACE target validation errors from the core service
    pub async fn create(
        &self,
        input: CreateInvitationInput,
    ) -> Result<trip_invitations::Model, MembershipError> {
        let trip_id = TripId::from_uuid(input.trip_id);

        trips::Entity::find_by_id(input.trip_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(MembershipError::TripNotFound(trip_id))?;

        users::Entity::find_by_id(input.invited_user_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                MembershipError::UserNotFound(UserId::from_uuid(input.invited_user_id))
            })?;

        self.require_active_member(input.trip_id, input.created_by)
            .await?;

        if self
            .active_membership(&self.db, input.trip_id, input.invited_user_id)
            .await?
            .is_some()
        {
            return Err(MembershipError::AlreadyMember(UserId::from_uuid(
                input.invited_user_id,
            )));
        }

        let pending = trip_invitations::Entity::find()
            .filter(trip_invitations::Column::TripId.eq(input.trip_id))
            .filter(trip_invitations::Column::InvitedUserId.eq(input.invited_user_id))
            .filter(trip_invitations::Column::Status.eq(InvitationStatus::Pending))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if pending.is_some() {
            return Err(MembershipError::DuplicatePendingInvitation(
                UserId::from_uuid(input.invited_user_id),
            ));
        }

        let target = match input.target_member_id {
            Some(member_id) => {
                let row = trip_members::Entity::find_by_id(member_id)
                    .one(&self.db)
                    .await
                    .map_err(db_err)?
                    .ok_or(MembershipError::MemberNotFound(MemberId::from_uuid(
                        member_id,
                    )))?;
                Some(ReplaceTarget {
                    member_id: MemberId::from_uuid(row.id),
                    trip_id: TripId::from_uuid(row.trip_id),
                    is_virtual: row.is_virtual,
                    is_active: row.is_active,
                })
            }
            None => None,
        };
        InvitationService::validate_create(trip_id, input.invite_type, target.as_ref())?;

        let now = chrono::Utc::now();
        let invitation = trip_invitations::ActiveModel {
            id: Set(Uuid::new_v4()),
            trip_id: Set(input.trip_id),
            invited_user_id: Set(input.invited_user_id),
            invite_type: Set(invite_type_to_db(input.invite_type)),
            target_member_id: Set(input.target_member_id),
            status: Set(InvitationStatus::Pending),
            message: Set(input.message),
            created_by: Set(input.created_by),
            created_at: Set(now.into()),
            expires_at: Set(InvitationService::expiry_from(now).into()),
            responded_at: Set(None),
        };
        invitation.insert(&self.db).await.map_err(db_err)
    }

    /// Accepts an invitation as a single atomic transaction.
    ///
    /// Steps, all under a `FOR UPDATE` lock on the invitation row:
    /// 1. Core validation (actor, status, expiry).
    /// 2. A PENDING invitation past its deadline is flipped to EXPIRED
    ///    and committed before the `Expired` failure is returned, so
    ///    repeat calls deterministically fail the same way.
    /// 3. Membership is re-checked under the transaction's isolation,
    ///    closing the race of two invitations accepted concurrently.
    /// 4. REPLACE mutates the target member row in place (id preserved,
    ///    historical expense references untouched); ADD inserts a fresh
    ///    member row.
    ///
    /// Notification dispatch belongs to the caller, after this method
    /// returns (and the transaction has committed).
    ///
    /// # Errors
    ///
    /// Returns `InvitationNotFound`, `NotInvited`, `NotPending`,
    /// `InvitationExpired`, or `AlreadyMember`.
    pub async fn accept(
        &self,
        invitation_id: Uuid,
        user_id: Uuid,
    ) -> Result<AcceptOutcome, MembershipError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let invitation = trip_invitations::Entity::find_by_id(invitation_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(MembershipError::InvitationNotFound(InvitationId::from_uuid(
                invitation_id,
            )))?;

        let snapshot = invitation_to_snapshot(&invitation);
        let now = chrono::Utc::now();

        let action = match InvitationService::accept(&snapshot, UserId::from_uuid(user_id), now) {
            Ok(action) => action,
            Err(MembershipError::InvitationExpired)
                if invitation.status == InvitationStatus::Pending =>
            {
                // Expire the row inside the same transaction; the commit
                // makes repeat accepts idempotent failures.
                let mut active: trip_invitations::ActiveModel = invitation.into();
                active.status = Set(InvitationStatus::Expired);
                active.update(&txn).await.map_err(db_err)?;
                txn.commit().await.map_err(db_err)?;
                return Err(MembershipError::InvitationExpired);
            }
            Err(e) => return Err(e),
        };
        let InvitationAction::Accept { responded_at } = action else {
            return Err(MembershipError::Database(
                "accept validation returned a foreign action".to_string(),
            ));
        };

        // Re-check membership under the lock: a concurrently accepted
        // invitation for the same user must lose here.
        if self
            .active_membership(&txn, invitation.trip_id, user_id)
            .await?
            .is_some()
        {
            return Err(MembershipError::AlreadyMember(UserId::from_uuid(user_id)));
        }

        let member = match snapshot.invite_type {
            InviteType::Replace => {
                let target_id = snapshot
                    .target_member_id
                    .ok_or(MembershipError::ReplaceTargetRequired)?;
                self.claim_virtual_member(&txn, target_id.into_inner(), user_id, now)
                    .await?
            }
            InviteType::Add => {
                let member = trip_members::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    trip_id: Set(invitation.trip_id),
                    user_id: Set(Some(user_id)),
                    is_virtual: Set(false),
                    display_name: Set(None),
                    role: Set(MemberRole::Member),
                    contribution: Set(rust_decimal::Decimal::ZERO),
                    is_active: Set(true),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                member.insert(&txn).await.map_err(db_err)?
            }
        };

        let mut active: trip_invitations::ActiveModel = invitation.into();
        active.status = Set(InvitationStatus::Accepted);
        active.responded_at = Set(Some(responded_at.into()));
        let invitation = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok(AcceptOutcome { invitation, member })
    }

    /// Rejects a pending invitation.
    ///
    /// # Errors
    ///
    /// Returns `InvitationNotFound`, `NotInvited`, or `NotPending`.
    pub async fn reject(
        &self,
        invitation_id: Uuid,
        user_id: Uuid,
    ) -> Result<trip_invitations::Model, MembershipError> {
        let invitation = self
            .find_by_id(invitation_id)
            .await?
            .ok_or(MembershipError::InvitationNotFound(InvitationId::from_uuid(
                invitation_id,
            )))?;

        let snapshot = invitation_to_snapshot(&invitation);
        let action =
            InvitationService::reject(&snapshot, UserId::from_uuid(user_id), chrono::Utc::now())?;
        let InvitationAction::Reject { responded_at } = action else {
            return Err(MembershipError::Database(
                "reject validation returned a foreign action".to_string(),
            ));
        };

        let mut active: trip_invitations::ActiveModel = invitation.into();
        active.status = Set(InvitationStatus::Rejected);
        active.responded_at = Set(Some(responded_at.into()));
        active.update(&self.db).await.map_err(db_err)
    }

    /// Cancels a pending invitation. Only its creator may cancel.
    ///
    /// # Errors
    ///
    /// Returns `InvitationNotFound`, `NotCreator`, or `NotPending`.
    pub async fn cancel(
        &self,
        invitation_id: Uuid,
        user_id: Uuid,
    ) -> Result<trip_invitations::Model, MembershipError> {
        let invitation = self
            .find_by_id(invitation_id)
            .await?
            .ok_or(MembershipError::InvitationNotFound(InvitationId::from_uuid(
                invitation_id,
            )))?;

        let snapshot = invitation_to_snapshot(&invitation);
        let action =
            InvitationService::cancel(&snapshot, UserId::from_uuid(user_id), chrono::Utc::now())?;
        let InvitationAction::Cancel { responded_at } = action else {
            return Err(MembershipError::Database(
                "cancel validation returned a foreign action".to_string(),
            ));
        };

        let mut active: trip_invitations::ActiveModel = invitation.into();
        active.status = Set(InvitationStatus::Cancelled);
        active.responded_at = Set(Some(responded_at.into()));
        active.update(&self.db).await.map_err(db_err)
    }

    /// Expires every overdue pending invitation in one conditional bulk
    /// update and returns the number of rows changed.
    ///
    /// Safe to call repeatedly and concurrently: the predicate excludes
    /// rows that are already terminal, so a second sweep reports zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn sweep_expired(&self) -> Result<u64, MembershipError> {
        let result = trip_invitations::Entity::update_many()
            .col_expr(
                trip_invitations::Column::Status,
                InvitationStatus::Expired.as_enum(),
            )
            .filter(trip_invitations::Column::Status.eq(InvitationStatus::Pending))
            .filter(trip_invitations::Column::ExpiresAt.lt(chrono::Utc::now()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected > 0 {
            tracing::info!(expired = result.rows_affected, "swept overdue invitations");
        }
        Ok(result.rows_affected)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Claims a virtual member row for a real user, preserving its id so
    /// expense and share references stay valid.
    async fn claim_virtual_member(
        &self,
        txn: &DatabaseTransaction,
        member_id: Uuid,
        user_id: Uuid,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<trip_members::Model, MembershipError> {
        let target = trip_members::Entity::find_by_id(member_id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(MembershipError::MemberNotFound(MemberId::from_uuid(
                member_id,
            )))?;

        // Re-validate under the lock; the row may have changed since the
        // invitation was created.
        if !target.is_active {
            return Err(MembershipError::TargetInactive(MemberId::from_uuid(
                member_id,
            )));
        }
        if !target.is_virtual {
            return Err(MembershipError::TargetNotVirtual(MemberId::from_uuid(
                member_id,
            )));
        }

        let mut active: trip_members::ActiveModel = target.into();
        active.user_id = Set(Some(user_id));
        active.is_virtual = Set(false);
        active.display_name = Set(None);
        active.updated_at = Set(now.into());
        active.update(txn).await.map_err(db_err)
    }

    async fn require_active_member(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), MembershipError> {
        if self
            .active_membership(&self.db, trip_id, user_id)
            .await?
            .is_some()
        {
            Ok(())
        } else {
            Err(MembershipError::NotMember(UserId::from_uuid(user_id)))
        }
    }

    async fn active_membership<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        trip_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<trip_members::Model>, MembershipError> {
        trip_members::Entity::find()
            .filter(trip_members::Column::TripId.eq(trip_id))
            .filter(trip_members::Column::UserId.eq(user_id))
            .filter(trip_members::Column::IsActive.eq(true))
            .one(conn)
            .await
            .map_err(db_err)
    }
}
