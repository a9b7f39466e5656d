//! Expense repository: recording and listing trip expenses.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use patungan_core::ledger::types::Share;
use patungan_core::ledger::{validate_expense_shares, LedgerError};
use patungan_shared::types::{MemberId, PageRequest, TripId};

use crate::entities::{expense_participants, expenses, trip_members, trips};

/// One participant share in an expense creation request.
#[derive(Debug, Clone, Copy)]
pub struct ShareInput {
    /// The participating member.
    pub trip_member_id: Uuid,
    /// The member's share of the amount.
    pub share_amount: Decimal,
}

/// Input for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// The trip the expense belongs to.
    pub trip_id: Uuid,
    /// Human-readable description.
    pub description: String,
    /// Total amount (non-negative).
    pub amount: Decimal,
    /// True for money flowing back to the group.
    pub is_income: bool,
    /// The member who paid (or received) the amount.
    pub payer_member_id: Uuid,
    /// True if paid from the shared fund pool.
    pub is_paid_from_fund: bool,
    /// The day the expense occurred.
    pub expense_date: NaiveDate,
    /// The user recording the expense.
    pub created_by: Uuid,
    /// Participant shares; must sum to `amount` within one minor unit.
    pub shares: Vec<ShareInput>,
}

/// An expense row together with its participant rows.
#[derive(Debug, Clone)]
pub struct ExpenseWithParticipants {
    /// The expense.
    pub expense: expenses::Model,
    /// Its participant shares.
    pub participants: Vec<expense_participants::Model>,
}

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an expense with its participant shares.
    ///
    /// Shares are validated against the amount before anything is
    /// written; the expense and its participant rows are inserted in a
    /// single transaction.
    ///
    /// # Errors
    ///
    /// Returns share-validation errors, `TripNotFound`, `PayerNotMember`,
    /// or `ParticipantNotMember`.
    pub async fn create(
        &self,
        input: CreateExpenseInput,
    ) -> Result<ExpenseWithParticipants, LedgerError> {
        let shares: Vec<Share> = input
            .shares
            .iter()
            .map(|s| Share {
                member_id: MemberId::from_uuid(s.trip_member_id),
                amount: s.share_amount,
            })
            .collect();
        validate_expense_shares(input.amount, &shares)?;

        trips::Entity::find_by_id(input.trip_id)
            .one(&self.db)
            .await
            .map_err(ledger_db_err)?
            .ok_or(LedgerError::TripNotFound(TripId::from_uuid(input.trip_id)))?;

        let active_ids: Vec<Uuid> = trip_members::Entity::find()
            .select_only()
            .column(trip_members::Column::Id)
            .filter(trip_members::Column::TripId.eq(input.trip_id))
            .filter(trip_members::Column::IsActive.eq(true))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(ledger_db_err)?;

        if !active_ids.contains(&input.payer_member_id) {
            return Err(LedgerError::PayerNotMember(MemberId::from_uuid(
                input.payer_member_id,
            )));
        }
        for share in &input.shares {
            if !active_ids.contains(&share.trip_member_id) {
                return Err(LedgerError::ParticipantNotMember(MemberId::from_uuid(
                    share.trip_member_id,
                )));
            }
        }

        let txn = self.db.begin().await.map_err(ledger_db_err)?;
        let now = chrono::Utc::now().into();
        let expense_id = Uuid::new_v4();

        let expense = expenses::ActiveModel {
            id: Set(expense_id),
            trip_id: Set(input.trip_id),
            description: Set(input.description.clone()),
            amount: Set(input.amount),
            is_income: Set(input.is_income),
            payer_member_id: Set(input.payer_member_id),
            is_paid_from_fund: Set(input.is_paid_from_fund),
            expense_date: Set(input.expense_date),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let expense = expense.insert(&txn).await.map_err(ledger_db_err)?;

        let mut participants = Vec::with_capacity(input.shares.len());
        for share in &input.shares {
            let participant = expense_participants::ActiveModel {
                id: Set(Uuid::new_v4()),
                expense_id: Set(expense_id),
                trip_member_id: Set(share.trip_member_id),
                share_amount: Set(share.share_amount),
                created_at: Set(now),
            };
            participants.push(participant.insert(&txn).await.map_err(ledger_db_err)?);
        }

        txn.commit().await.map_err(ledger_db_err)?;

        Ok(ExpenseWithParticipants {
            expense,
            participants,
        })
    }

    /// Lists a trip's expenses, newest first, with their participants.
    ///
    /// # Errors
    ///
    /// Returns `TripNotFound` if the trip does not exist.
    pub async fn list_for_trip(
        &self,
        trip_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<ExpenseWithParticipants>, u64), LedgerError> {
        trips::Entity::find_by_id(trip_id)
            .one(&self.db)
            .await
            .map_err(ledger_db_err)?
            .ok_or(LedgerError::TripNotFound(TripId::from_uuid(trip_id)))?;

        let query = expenses::Entity::find()
            .filter(expenses::Column::TripId.eq(trip_id))
            .order_by_desc(expenses::Column::ExpenseDate)
            .order_by_desc(expenses::Column::CreatedAt);

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(ledger_db_err)?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(ledger_db_err)?;

        let mut by_expense = self.participants_for(&rows).await?;
        let result = rows
            .into_iter()
            .map(|expense| {
                let participants = by_expense.remove(&expense.id).unwrap_or_default();
                ExpenseWithParticipants {
                    expense,
                    participants,
                }
            })
            .collect();

        Ok((result, total))
    }

    /// Finds one expense with its participants.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_with_participants(
        &self,
        expense_id: Uuid,
    ) -> Result<Option<ExpenseWithParticipants>, LedgerError> {
        let Some(expense) = expenses::Entity::find_by_id(expense_id)
            .one(&self.db)
            .await
            .map_err(ledger_db_err)?
        else {
            return Ok(None);
        };

        let participants = expense_participants::Entity::find()
            .filter(expense_participants::Column::ExpenseId.eq(expense_id))
            .all(&self.db)
            .await
            .map_err(ledger_db_err)?;

        Ok(Some(ExpenseWithParticipants {
            expense,
            participants,
        }))
    }

    async fn participants_for(
        &self,
        rows: &[expenses::Model],
    ) -> Result<HashMap<Uuid, Vec<expense_participants::Model>>, LedgerError> {
        let ids: Vec<Uuid> = rows.iter().map(|e| e.id).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let participants = expense_participants::Entity::find()
            .filter(expense_participants::Column::ExpenseId.is_in(ids))
            .all(&self.db)
            .await
            .map_err(ledger_db_err)?;

        let mut by_expense: HashMap<Uuid, Vec<expense_participants::Model>> = HashMap::new();
        for participant in participants {
            by_expense
                .entry(participant.expense_id)
                .or_default()
                .push(participant);
        }
        Ok(by_expense)
    }
}

fn ledger_db_err(e: sea_orm::DbErr) -> LedgerError {
    LedgerError::Database(e.to_string())
}
