//! Balance aggregation over expenses and contributions.
//!
//! This module implements the trip ledger:
//! - Per-member balance derivation from raw expense records
//! - Fund pool position tracking
//! - Expense share validation
//! - Error types for ledger operations
//!
//! All arithmetic is exact fixed-point decimal; floating point is banned
//! at the workspace-lint level.

pub mod aggregator;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod aggregator_props;

pub use aggregator::LedgerService;
pub use error::LedgerError;
pub use types::{ExpenseRecord, FundSummary, MemberBalance, MemberPosition, Share};
pub use validation::validate_expense_shares;
