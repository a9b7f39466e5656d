//! Settlement plan types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use patungan_shared::types::MemberId;

/// A single proposed transfer between two members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// The debtor paying.
    pub from: MemberId,
    /// The creditor receiving.
    pub to: MemberId,
    /// Transfer amount, always strictly positive.
    pub amount: Decimal,
}

/// A complete settlement proposal for a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    /// The proposed transfers, in planning order.
    pub settlements: Vec<Transfer>,
    /// Number of proposed transfers.
    pub total_transactions: usize,
    /// Sum of all transfer amounts.
    pub total_amount: Decimal,
}

impl SettlementPlan {
    /// An empty plan: everyone is already settled.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            settlements: Vec::new(),
            total_transactions: 0,
            total_amount: Decimal::ZERO,
        }
    }
}
