//! Expense recording and listing routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use patungan_db::repositories::expense::{
    CreateExpenseInput, ExpenseRepository, ExpenseWithParticipants, ShareInput,
};
use patungan_shared::types::{PageMeta, PageRequest, PageResponse};

use crate::{AppState, middleware::AuthUser};

use super::{ledger_error, members::require_membership, not_found};

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trips/{trip_id}/expenses", post(create_expense))
        .route("/trips/{trip_id}/expenses", get(list_expenses))
        .route("/trips/{trip_id}/expenses/{expense_id}", get(get_expense))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// One participant share in an expense request.
#[derive(Debug, serde::Deserialize)]
pub struct ParticipantInput {
    /// The participating member.
    pub trip_member_id: Uuid,
    /// The member's share of the amount.
    pub share_amount: Decimal,
}

/// Request body for recording an expense.
#[derive(Debug, serde::Deserialize)]
pub struct CreateExpenseRequest {
    /// Human-readable description.
    pub description: String,
    /// Total amount (non-negative).
    pub amount: Decimal,
    /// True for money flowing back to the group.
    #[serde(default)]
    pub is_income: bool,
    /// The member who paid (or received) the amount.
    pub payer_member_id: Uuid,
    /// True if paid from the shared fund pool.
    #[serde(default)]
    pub is_paid_from_fund: bool,
    /// The day the expense occurred.
    pub expense_date: NaiveDate,
    /// Participant shares; must sum to the amount.
    pub participants: Vec<ParticipantInput>,
}

/// Response for one participant share.
#[derive(Debug, serde::Serialize)]
pub struct ParticipantResponse {
    /// The participating member.
    pub trip_member_id: Uuid,
    /// The member's share.
    pub share_amount: Decimal,
}

/// Response for an expense.
#[derive(Debug, serde::Serialize)]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: Uuid,
    /// Trip ID.
    pub trip_id: Uuid,
    /// Description.
    pub description: String,
    /// Total amount.
    pub amount: Decimal,
    /// Income flag.
    pub is_income: bool,
    /// The paying member.
    pub payer_member_id: Uuid,
    /// Fund-pool flag.
    pub is_paid_from_fund: bool,
    /// The day the expense occurred.
    pub expense_date: NaiveDate,
    /// Participant shares.
    pub participants: Vec<ParticipantResponse>,
}

impl From<ExpenseWithParticipants> for ExpenseResponse {
    fn from(row: ExpenseWithParticipants) -> Self {
        Self {
            id: row.expense.id,
            trip_id: row.expense.trip_id,
            description: row.expense.description,
            amount: row.expense.amount,
            is_income: row.expense.is_income,
            payer_member_id: row.expense.payer_member_id,
            is_paid_from_fund: row.expense.is_paid_from_fund,
            expense_date: row.expense.expense_date,
            participants: row
                .participants
                .into_iter()
                .map(|p| ParticipantResponse {
                    trip_member_id: p.trip_member_id,
                    share_amount: p.share_amount,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Records an expense with its participant shares.
async fn create_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trip_id): Path<Uuid>,
    Json(body): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_membership(&state, trip_id, user.user_id()).await {
        return response;
    }

    let input = CreateExpenseInput {
        trip_id,
        description: body.description,
        amount: body.amount,
        is_income: body.is_income,
        payer_member_id: body.payer_member_id,
        is_paid_from_fund: body.is_paid_from_fund,
        expense_date: body.expense_date,
        created_by: user.user_id(),
        shares: body
            .participants
            .iter()
            .map(|p| ShareInput {
                trip_member_id: p.trip_member_id,
                share_amount: p.share_amount,
            })
            .collect(),
    };

    let repo = ExpenseRepository::new(state.db.as_ref().clone());
    match repo.create(input).await {
        Ok(row) => (StatusCode::CREATED, Json(ExpenseResponse::from(row))).into_response(),
        Err(e) => ledger_error(&e),
    }
}

/// Fetches one expense with its participant shares.
async fn get_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path((trip_id, expense_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = require_membership(&state, trip_id, user.user_id()).await {
        return response;
    }

    let repo = ExpenseRepository::new(state.db.as_ref().clone());
    match repo.find_with_participants(expense_id).await {
        Ok(Some(row)) if row.expense.trip_id == trip_id => {
            Json(ExpenseResponse::from(row)).into_response()
        }
        Ok(_) => not_found("Expense"),
        Err(e) => ledger_error(&e),
    }
}

/// Lists a trip's expenses, newest first.
async fn list_expenses(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trip_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_membership(&state, trip_id, user.user_id()).await {
        return response;
    }

    let repo = ExpenseRepository::new(state.db.as_ref().clone());
    match repo.list_for_trip(trip_id, &page).await {
        Ok((rows, total)) => Json(PageResponse {
            data: rows
                .into_iter()
                .map(ExpenseResponse::from)
                .collect::<Vec<_>>(),
            meta: PageMeta::new(&page, total),
        })
        .into_response(),
        Err(e) => ledger_error(&e),
    }
}
