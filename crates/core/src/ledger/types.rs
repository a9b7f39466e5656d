//! Domain types for balance aggregation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use patungan_shared::types::{ExpenseId, MemberId};

/// An active member's standing input to the ledger: identity plus the
/// amount they have paid into the shared fund pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPosition {
    /// The trip member.
    pub member_id: MemberId,
    /// Fund-pool contribution (non-negative).
    pub contribution: Decimal,
}

/// One member's share of a single expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    /// The member carrying the share.
    pub member_id: MemberId,
    /// Share amount (stored non-negative).
    pub amount: Decimal,
}

/// A recorded expense together with its participant shares.
///
/// Amounts are always stored non-negative. Income (a refund, a deposit
/// returned) is flagged through `is_income` and has its sign applied at
/// aggregation time, never in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// The expense.
    pub expense_id: ExpenseId,
    /// The member who paid (or, for income, received) the amount.
    pub payer_member_id: MemberId,
    /// Total amount (non-negative).
    pub amount: Decimal,
    /// True if this record represents money flowing back to the group.
    pub is_income: bool,
    /// True if the amount was paid out of the shared fund pool rather
    /// than the payer's own pocket.
    pub is_paid_from_fund: bool,
    /// Per-member shares; their sum equals `amount` within one minor unit.
    pub shares: Vec<Share>,
}

/// A member's derived financial position. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    /// The trip member.
    pub member_id: MemberId,
    /// Fund-pool contribution.
    pub contribution: Decimal,
    /// Total paid out-of-pocket (fund-paid expenses excluded).
    pub total_paid: Decimal,
    /// Total owed as share of group expenses.
    pub total_share: Decimal,
    /// `contribution + total_paid - total_share`.
    pub net: Decimal,
}

impl MemberBalance {
    /// Returns true if the member owes nothing and is owed nothing
    /// (within one currency minor unit).
    #[must_use]
    pub fn is_settled(&self) -> bool {
        patungan_shared::types::money::is_settled(self.net)
    }
}

/// Net position of the shared fund pool. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundSummary {
    /// Sum of all active members' contributions.
    pub total_contributions: Decimal,
    /// Sum of amounts paid out of the fund pool (income signed).
    pub fund_paid_total: Decimal,
    /// `total_contributions - fund_paid_total`: money not yet distributed.
    pub net_position: Decimal,
}
