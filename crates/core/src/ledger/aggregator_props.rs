//! Property tests for balance aggregation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use patungan_shared::types::{ExpenseId, MemberId};

use super::aggregator::LedgerService;
use super::types::{ExpenseRecord, MemberPosition, Share};

/// Strategy for a non-negative monetary amount at minor-unit scale.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for a set of member positions.
fn members_strategy() -> impl Strategy<Value = Vec<MemberPosition>> {
    prop::collection::vec(amount_strategy(), 1..8).prop_map(|contributions| {
        contributions
            .into_iter()
            .map(|contribution| MemberPosition {
                member_id: MemberId::new(),
                contribution,
            })
            .collect()
    })
}

/// Strategy for expenses over the given member count. Shares are generated
/// first and the amount is their exact sum, so every generated expense
/// satisfies the share-sum invariant.
fn expenses_strategy(member_count: usize) -> impl Strategy<Value = Vec<RawExpense>> {
    let share_list = prop::collection::vec((0..member_count, 0i64..100_000i64), 1..=member_count);
    prop::collection::vec(
        (0..member_count, share_list, any::<bool>(), any::<bool>()),
        0..12,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(payer, shares, is_income, is_paid_from_fund)| RawExpense {
                payer,
                shares: shares
                    .into_iter()
                    .map(|(idx, cents)| (idx, Decimal::new(cents, 2)))
                    .collect(),
                is_income,
                is_paid_from_fund,
            })
            .collect()
    })
}

#[derive(Debug, Clone)]
struct RawExpense {
    payer: usize,
    shares: Vec<(usize, Decimal)>,
    is_income: bool,
    is_paid_from_fund: bool,
}

fn materialize(members: &[MemberPosition], raw: &[RawExpense]) -> Vec<ExpenseRecord> {
    raw.iter()
        .map(|e| {
            // Collapse duplicate member indices so each member appears once.
            let mut shares: Vec<Share> = Vec::new();
            for &(idx, amount) in &e.shares {
                let member_id = members[idx].member_id;
                match shares.iter_mut().find(|s| s.member_id == member_id) {
                    Some(existing) => existing.amount += amount,
                    None => shares.push(Share { member_id, amount }),
                }
            }
            let amount: Decimal = shares.iter().map(|s| s.amount).sum();
            ExpenseRecord {
                expense_id: ExpenseId::new(),
                payer_member_id: members[e.payer].member_id,
                amount,
                is_income: e.is_income,
                is_paid_from_fund: e.is_paid_from_fund,
                shares,
            }
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The sum of all member nets equals the fund pool's net position:
    /// money not yet distributed never disappears from the ledger.
    #[test]
    fn prop_net_sum_equals_fund_position(
        (members, raw) in members_strategy()
            .prop_flat_map(|m| {
                let n = m.len();
                (Just(m), expenses_strategy(n))
            })
    ) {
        let expenses = materialize(&members, &raw);
        let balances = LedgerService::compute_balances(&members, &expenses);
        let fund = LedgerService::fund_summary(&members, &expenses);

        let net_sum: Decimal = balances.iter().map(|b| b.net).sum();
        prop_assert_eq!(net_sum, fund.net_position);
    }

    /// Output is one balance per member, in input order.
    #[test]
    fn prop_one_balance_per_member(
        (members, raw) in members_strategy()
            .prop_flat_map(|m| {
                let n = m.len();
                (Just(m), expenses_strategy(n))
            })
    ) {
        let expenses = materialize(&members, &raw);
        let balances = LedgerService::compute_balances(&members, &expenses);

        prop_assert_eq!(balances.len(), members.len());
        for (balance, member) in balances.iter().zip(&members) {
            prop_assert_eq!(balance.member_id, member.member_id);
        }
    }

    /// Aggregation is deterministic.
    #[test]
    fn prop_aggregation_deterministic(
        (members, raw) in members_strategy()
            .prop_flat_map(|m| {
                let n = m.len();
                (Just(m), expenses_strategy(n))
            })
    ) {
        let expenses = materialize(&members, &raw);
        let first = LedgerService::compute_balances(&members, &expenses);
        let second = LedgerService::compute_balances(&members, &expenses);
        prop_assert_eq!(first, second);
    }
}
