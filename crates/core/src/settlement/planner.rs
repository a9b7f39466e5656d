//! Greedy settlement planning.
//!
//! Matches the largest creditor against the largest debtor until both
//! sides are exhausted. This is a polynomial-time heuristic, not the
//! NP-hard minimum-transaction solver; it emits at most N-1 transfers
//! for N unsettled members and, because the arithmetic is exact decimal
//! subtraction, leaves every remainder at exactly zero.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rust_decimal::Decimal;

use patungan_shared::types::MemberId;
use patungan_shared::types::money::is_settled;

use crate::ledger::types::MemberBalance;

use super::types::{SettlementPlan, Transfer};

/// One side of the netting: a member's remaining unmatched magnitude.
///
/// Heap order is by magnitude; equal magnitudes are won by the smaller
/// member id, which makes the plan deterministic for a given input set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenPosition {
    remaining: Decimal,
    member_id: MemberId,
}

impl Ord for OpenPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.remaining
            .cmp(&other.remaining)
            .then_with(|| other.member_id.cmp(&self.member_id))
    }
}

impl PartialOrd for OpenPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Stateless service netting balances into a transfer plan.
pub struct SettlementPlanner;

impl SettlementPlanner {
    /// Produces a transfer plan that zeroes every member's balance.
    ///
    /// Members whose net is within one currency minor unit of zero are
    /// treated as settled and excluded up front; a fully settled input
    /// yields an empty plan.
    #[must_use]
    pub fn plan(balances: &[MemberBalance]) -> SettlementPlan {
        let mut creditors: BinaryHeap<OpenPosition> = BinaryHeap::new();
        let mut debtors: BinaryHeap<OpenPosition> = BinaryHeap::new();

        for balance in balances {
            if is_settled(balance.net) {
                continue;
            }
            let position = OpenPosition {
                remaining: balance.net.abs(),
                member_id: balance.member_id,
            };
            if balance.net > Decimal::ZERO {
                creditors.push(position);
            } else {
                debtors.push(position);
            }
        }

        let mut settlements = Vec::new();
        let mut total_amount = Decimal::ZERO;

        while let (Some(mut creditor), Some(mut debtor)) = (creditors.pop(), debtors.pop()) {
            let amount = creditor.remaining.min(debtor.remaining);
            settlements.push(Transfer {
                from: debtor.member_id,
                to: creditor.member_id,
                amount,
            });
            total_amount += amount;

            creditor.remaining -= amount;
            debtor.remaining -= amount;

            // Sub-minor-unit dust cannot be transferred; drop it the same
            // way already-settled members are dropped up front.
            if !is_settled(creditor.remaining) {
                creditors.push(creditor);
            }
            if !is_settled(debtor.remaining) {
                debtors.push(debtor);
            }
        }

        SettlementPlan {
            total_transactions: settlements.len(),
            total_amount,
            settlements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn balance(member_id: MemberId, net: Decimal) -> MemberBalance {
        MemberBalance {
            member_id,
            contribution: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            total_share: Decimal::ZERO,
            net,
        }
    }

    #[test]
    fn test_two_member_settlement() {
        // A: paid 1000, share 500 -> +500; B: share 500 -> -500.
        let a = MemberId::new();
        let b = MemberId::new();
        let plan = SettlementPlanner::plan(&[balance(a, dec!(500)), balance(b, dec!(-500))]);

        assert_eq!(plan.total_transactions, 1);
        assert_eq!(plan.total_amount, dec!(500));
        assert_eq!(
            plan.settlements,
            vec![Transfer {
                from: b,
                to: a,
                amount: dec!(500)
            }]
        );
    }

    #[test]
    fn test_all_settled_yields_empty_plan() {
        let plan = SettlementPlanner::plan(&[
            balance(MemberId::new(), dec!(0)),
            balance(MemberId::new(), dec!(0.005)),
            balance(MemberId::new(), dec!(-0.005)),
        ]);

        assert!(plan.settlements.is_empty());
        assert_eq!(plan.total_transactions, 0);
        assert_eq!(plan.total_amount, dec!(0));
    }

    #[test]
    fn test_largest_pair_matched_first() {
        let big_creditor = MemberId::new();
        let small_creditor = MemberId::new();
        let debtor = MemberId::new();
        let plan = SettlementPlanner::plan(&[
            balance(small_creditor, dec!(100)),
            balance(big_creditor, dec!(300)),
            balance(debtor, dec!(-400)),
        ]);

        assert_eq!(plan.total_transactions, 2);
        assert_eq!(plan.settlements[0].to, big_creditor);
        assert_eq!(plan.settlements[0].amount, dec!(300));
        assert_eq!(plan.settlements[1].to, small_creditor);
        assert_eq!(plan.settlements[1].amount, dec!(100));
    }

    #[test]
    fn test_equal_magnitudes_break_ties_by_member_id() {
        let id_lo = MemberId::from_uuid(Uuid::from_u128(1));
        let id_hi = MemberId::from_uuid(Uuid::from_u128(2));
        let debtor = MemberId::from_uuid(Uuid::from_u128(3));

        let plan = SettlementPlanner::plan(&[
            balance(id_hi, dec!(50)),
            balance(id_lo, dec!(50)),
            balance(debtor, dec!(-100)),
        ]);

        // Smaller UUID wins the tie and is paid first.
        assert_eq!(plan.settlements[0].to, id_lo);
        assert_eq!(plan.settlements[1].to, id_hi);
    }

    #[test]
    fn test_chain_nets_to_zero_exactly() {
        let a = MemberId::new();
        let b = MemberId::new();
        let c = MemberId::new();
        let d = MemberId::new();
        let balances = [
            balance(a, dec!(123.45)),
            balance(b, dec!(0.55)),
            balance(c, dec!(-100.00)),
            balance(d, dec!(-24.00)),
        ];

        let plan = SettlementPlanner::plan(&balances);

        // N-1 bound for 4 unsettled members.
        assert!(plan.total_transactions <= 3);

        // Every member ends exactly at zero.
        for member in balances {
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
            // Creditors receive their net, debtors pay off theirs.
            assert_eq!(member.net - incoming + outgoing, Decimal::ZERO);
        }
    }

    #[test]
    fn test_no_non_positive_transfer_amounts() {
        let plan = SettlementPlanner::plan(&[
            balance(MemberId::new(), dec!(10.01)),
            balance(MemberId::new(), dec!(-10.00)),
            balance(MemberId::new(), dec!(-0.01)),
        ]);

        for transfer in &plan.settlements {
            assert!(transfer.amount > Decimal::ZERO);
        }
    }
}
