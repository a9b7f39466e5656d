//! Read-only ledger repository: balances and settlement plans.
//!
//! Balances are recomputed on every read; there is no cache, so there is
//! no staleness. Cost scales with the trip's expense count, which stays
//! small for the small-group trips this system serves.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use patungan_core::ledger::types::{ExpenseRecord, FundSummary, MemberBalance, MemberPosition, Share};
use patungan_core::ledger::{LedgerError, LedgerService};
use patungan_core::settlement::{SettlementPlan, SettlementPlanner};
use patungan_shared::types::{ExpenseId, MemberId, TripId};

use crate::entities::{expense_participants, expenses, trip_members, trips};

/// Read-only repository deriving balances and settlement plans.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Computes the balance of every active member of a trip.
    ///
    /// # Errors
    ///
    /// Returns `TripNotFound` if the trip does not exist and
    /// `NoActiveMembers` if it has nobody to compute over. A trip with
    /// zero expenses is valid: balances equal the contributions.
    pub async fn compute_balances(
        &self,
        trip_id: Uuid,
    ) -> Result<Vec<MemberBalance>, LedgerError> {
        let (members, expenses) = self.load_trip_ledger(trip_id).await?;
        Ok(LedgerService::compute_balances(&members, &expenses))
    }

    /// Plans the settlement transfers for a trip's current balances.
    ///
    /// # Errors
    ///
    /// Same errors as [`Self::compute_balances`].
    pub async fn plan_settlement(&self, trip_id: Uuid) -> Result<SettlementPlan, LedgerError> {
        let balances = self.compute_balances(trip_id).await?;
        Ok(SettlementPlanner::plan(&balances))
    }

    /// Computes the fund pool's net position for a trip.
    ///
    /// # Errors
    ///
    /// Same errors as [`Self::compute_balances`].
    pub async fn fund_summary(&self, trip_id: Uuid) -> Result<FundSummary, LedgerError> {
        let (members, expenses) = self.load_trip_ledger(trip_id).await?;
        Ok(LedgerService::fund_summary(&members, &expenses))
    }

    /// Fetches the active members and all expenses of a trip, projected
    /// into the core ledger types.
    async fn load_trip_ledger(
        &self,
        trip_id: Uuid,
    ) -> Result<(Vec<MemberPosition>, Vec<ExpenseRecord>), LedgerError> {
        trips::Entity::find_by_id(trip_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::TripNotFound(TripId::from_uuid(trip_id)))?;

        let members: Vec<MemberPosition> = trip_members::Entity::find()
            .filter(trip_members::Column::TripId.eq(trip_id))
            .filter(trip_members::Column::IsActive.eq(true))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|m| MemberPosition {
                member_id: MemberId::from_uuid(m.id),
                contribution: m.contribution,
            })
            .collect();
        if members.is_empty() {
            return Err(LedgerError::NoActiveMembers(TripId::from_uuid(trip_id)));
        }

        let expense_rows = expenses::Entity::find()
            .filter(expenses::Column::TripId.eq(trip_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let expense_ids: Vec<Uuid> = expense_rows.iter().map(|e| e.id).collect();
        let mut shares_by_expense: HashMap<Uuid, Vec<Share>> = HashMap::new();
        if !expense_ids.is_empty() {
            let participants = expense_participants::Entity::find()
                .filter(expense_participants::Column::ExpenseId.is_in(expense_ids))
                .all(&self.db)
                .await
                .map_err(db_err)?;
            for p in participants {
                shares_by_expense
                    .entry(p.expense_id)
                    .or_default()
                    .push(Share {
                        member_id: MemberId::from_uuid(p.trip_member_id),
                        amount: p.share_amount,
                    });
            }
        }

        let records = expense_rows
            .into_iter()
            .map(|e| ExpenseRecord {
                expense_id: ExpenseId::from_uuid(e.id),
                payer_member_id: MemberId::from_uuid(e.payer_member_id),
                amount: e.amount,
                is_income: e.is_income,
                is_paid_from_fund: e.is_paid_from_fund,
                shares: shares_by_expense.remove(&e.id).unwrap_or_default(),
            })
            .collect();

        Ok((members, records))
    }
}

fn db_err(e: sea_orm::DbErr) -> LedgerError {
    LedgerError::Database(e.to_string())
}
