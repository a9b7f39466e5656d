//! Greedy netting of member balances into a transfer plan.
//!
//! Consumes the ledger's per-member balances and proposes a near-minimal
//! set of peer-to-peer transfers that zeroes every balance. Settlements
//! are records of intent, not money movement.

pub mod planner;
pub mod types;

#[cfg(test)]
mod planner_props;

pub use planner::SettlementPlanner;
pub use types::{SettlementPlan, Transfer};
