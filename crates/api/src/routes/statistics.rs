//! Balance and settlement routes.
//!
//! Both endpoints recompute from the current rows on every call; there
//! is no cache to invalidate.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use patungan_core::ledger::types::{FundSummary, MemberBalance};
use patungan_db::LedgerRepository;

use crate::{AppState, middleware::AuthUser};

use super::{ledger_error, members::require_membership};

/// Creates the statistics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trips/{trip_id}/balances", get(get_balances))
        .route("/trips/{trip_id}/settlement", get(get_settlement))
}

/// Response for a trip's balances.
#[derive(Debug, serde::Serialize)]
pub struct BalancesResponse {
    /// Per-member balances.
    pub balances: Vec<MemberBalance>,
    /// Fund pool position.
    pub fund: FundSummary,
}

/// Computes the current balance of every active member.
async fn get_balances(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trip_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_membership(&state, trip_id, user.user_id()).await {
        return response;
    }

    let repo = LedgerRepository::new(state.db.as_ref().clone());
    let balances = match repo.compute_balances(trip_id).await {
        Ok(balances) => balances,
        Err(e) => return ledger_error(&e),
    };
    match repo.fund_summary(trip_id).await {
        Ok(fund) => Json(BalancesResponse { balances, fund }).into_response(),
        Err(e) => ledger_error(&e),
    }
}

/// Proposes transfers that zero every member's balance.
async fn get_settlement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trip_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_membership(&state, trip_id, user.user_id()).await {
        return response;
    }

    let repo = LedgerRepository::new(state.db.as_ref().clone());
    match repo.plan_settlement(trip_id).await {
        Ok(plan) => Json(plan).into_response(),
        Err(e) => ledger_error(&e),
    }
}
