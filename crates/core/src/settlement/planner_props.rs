//! Property-based tests for the settlement planner.

use proptest::prelude::*;
use rust_decimal::Decimal;

use patungan_shared::types::MemberId;
use patungan_shared::types::money::is_settled;

use crate::ledger::types::MemberBalance;

use super::planner::SettlementPlanner;

fn balance(net: Decimal) -> MemberBalance {
    MemberBalance {
        member_id: MemberId::new(),
        contribution: Decimal::ZERO,
        total_paid: Decimal::ZERO,
        total_share: Decimal::ZERO,
        net,
    }
}

/// Strategy for a balanced ledger: N arbitrary nets plus one closing
/// entry that brings the sum to exactly zero.
fn balanced_ledger() -> impl Strategy<Value = Vec<MemberBalance>> {
    prop::collection::vec(-1_000_000i64..1_000_000i64, 1..12).prop_map(|cents| {
        let mut balances: Vec<MemberBalance> = cents
            .iter()
            .map(|&c| balance(Decimal::new(c, 2)))
            .collect();
        let closing: i64 = cents.iter().sum();
        balances.push(balance(Decimal::new(-closing, 2)));
        balances
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(250))]

    /// Every emitted transfer has a strictly positive amount.
    #[test]
    fn prop_transfers_strictly_positive(balances in balanced_ledger()) {
        let plan = SettlementPlanner::plan(&balances);
        for transfer in &plan.settlements {
            prop_assert!(transfer.amount > Decimal::ZERO);
        }
    }

    /// A plan never needs more than N-1 transfers for N unsettled members.
    #[test]
    fn prop_at_most_n_minus_one_transfers(balances in balanced_ledger()) {
        let unsettled = balances.iter().filter(|b| !is_settled(b.net)).count();
        let plan = SettlementPlanner::plan(&balances);
        prop_assert!(plan.total_transactions <= unsettled.saturating_sub(1));
    }

    /// Executing the plan zeroes every member's balance exactly.
    #[test]
    fn prop_plan_zeroes_every_balance(balances in balanced_ledger()) {
        let plan = SettlementPlanner::plan(&balances);
        for member in &balances {
            let incoming: Decimal = plan
                .settlements
                .iter()
                .filter(|t| t.to == member.member_id)
                .map(|t| t.amount)
                .sum();
            let outgoing: Decimal = plan
                .settlements
                .iter()
                .filter(|t| t.from == member.member_id)
                .map(|t| t.amount)
                .sum();
            prop_assert_eq!(member.net - incoming + outgoing, Decimal::ZERO);
        }
    }

    /// Totals are internally consistent.
    #[test]
    fn prop_totals_consistent(balances in balanced_ledger()) {
        let plan = SettlementPlanner::plan(&balances);
        prop_assert_eq!(plan.total_transactions, plan.settlements.len());
        let sum: Decimal = plan.settlements.iter().map(|t| t.amount).sum();
        prop_assert_eq!(plan.total_amount, sum);
    }

    /// Planning is deterministic for a given input.
    #[test]
    fn prop_plan_deterministic(balances in balanced_ledger()) {
        let first = SettlementPlanner::plan(&balances);
        let second = SettlementPlanner::plan(&balances);
        prop_assert_eq!(first, second);
    }
}
