//! Per-member balance aggregation.
//!
//! Derives each member's financial position from raw expense and
//! contribution records. Pure read-model logic: the caller fetches the
//! rows, this service folds them.

use std::collections::HashMap;

use rust_decimal::Decimal;

use patungan_shared::types::MemberId;

use super::types::{ExpenseRecord, FundSummary, MemberBalance, MemberPosition};

/// Stateless service deriving member balances from expense records.
pub struct LedgerService;

impl LedgerService {
    /// Computes the balance of every given member.
    ///
    /// Per member:
    /// - `total_paid` sums the amounts of expenses the member personally
    ///   paid (`payer == member` and not paid from the fund pool)
    /// - `total_share` sums the member's participant shares across all
    ///   expenses
    /// - `net = contribution + total_paid - total_share`
    ///
    /// Income records enter both sums with sign flipped: the stored
    /// amounts stay non-negative, the flag reverses the direction of the
    /// money flow. Shares or payers referencing members outside the given
    /// set (inactive rows) are skipped.
    ///
    /// Output order follows the input member order. A trip with zero
    /// expenses yields balances equal to the contributions.
    #[must_use]
    pub fn compute_balances(
        members: &[MemberPosition],
        expenses: &[ExpenseRecord],
    ) -> Vec<MemberBalance> {
        let mut paid: HashMap<MemberId, Decimal> = HashMap::with_capacity(members.len());
        let mut share: HashMap<MemberId, Decimal> = HashMap::with_capacity(members.len());
        for member in members {
            paid.insert(member.member_id, Decimal::ZERO);
            share.insert(member.member_id, Decimal::ZERO);
        }

        for expense in expenses {
            let signed = Self::signed_amount(expense.amount, expense.is_income);

            if !expense.is_paid_from_fund
                && let Some(total) = paid.get_mut(&expense.payer_member_id)
            {
                *total += signed;
            }

            for s in &expense.shares {
                if let Some(total) = share.get_mut(&s.member_id) {
                    *total += Self::signed_amount(s.amount, expense.is_income);
                }
            }
        }

        members
            .iter()
            .map(|member| {
                let total_paid = paid[&member.member_id];
                let total_share = share[&member.member_id];
                MemberBalance {
                    member_id: member.member_id,
                    contribution: member.contribution,
                    total_paid,
                    total_share,
                    net: member.contribution + total_paid - total_share,
                }
            })
            .collect()
    }

    /// Computes the fund pool's net position.
    ///
    /// `net_position = sum(contributions) - sum(fund-paid expense amounts)`.
    /// The value equals the sum of all member nets: money contributed but
    /// not yet spent stays visible here.
    #[must_use]
    pub fn fund_summary(
        members: &[MemberPosition],
        expenses: &[ExpenseRecord],
    ) -> FundSummary {
        let total_contributions: Decimal = members.iter().map(|m| m.contribution).sum();
        let fund_paid_total: Decimal = expenses
            .iter()
            .filter(|e| e.is_paid_from_fund)
            .map(|e| Self::signed_amount(e.amount, e.is_income))
            .sum();

        FundSummary {
            total_contributions,
            fund_paid_total,
            net_position: total_contributions - fund_paid_total,
        }
    }

    fn signed_amount(amount: Decimal, is_income: bool) -> Decimal {
        if is_income { -amount } else { amount }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patungan_shared::types::ExpenseId;
    use rust_decimal_macros::dec;

    use crate::ledger::types::Share;

    fn member(contribution: Decimal) -> MemberPosition {
        MemberPosition {
            member_id: MemberId::new(),
            contribution,
        }
    }

    fn expense(
        payer: MemberId,
        amount: Decimal,
        from_fund: bool,
        shares: Vec<(MemberId, Decimal)>,
    ) -> ExpenseRecord {
        ExpenseRecord {
            expense_id: ExpenseId::new(),
            payer_member_id: payer,
            amount,
            is_income: false,
            is_paid_from_fund: from_fund,
            shares: shares
                .into_iter()
                .map(|(member_id, amount)| Share { member_id, amount })
                .collect(),
        }
    }

    #[test]
    fn test_empty_trip_yields_contributions() {
        let a = member(dec!(100));
        let b = member(dec!(0));
        let balances = LedgerService::compute_balances(&[a.clone(), b.clone()], &[]);

        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].member_id, a.member_id);
        assert_eq!(balances[0].net, dec!(100));
        assert_eq!(balances[1].net, dec!(0));
    }

    #[test]
    fn test_payer_owed_half_of_shared_dinner() {
        // Member A pays 1000 out of pocket, split 500/500 with B.
        let a = member(dec!(0));
        let b = member(dec!(0));
        let e = expense(
            a.member_id,
            dec!(1000),
            false,
            vec![(a.member_id, dec!(500)), (b.member_id, dec!(500))],
        );

        let balances = LedgerService::compute_balances(&[a.clone(), b.clone()], &[e]);

        assert_eq!(balances[0].total_paid, dec!(1000));
        assert_eq!(balances[0].total_share, dec!(500));
        assert_eq!(balances[0].net, dec!(500));
        assert_eq!(balances[1].total_paid, dec!(0));
        assert_eq!(balances[1].total_share, dec!(500));
        assert_eq!(balances[1].net, dec!(-500));
    }

    #[test]
    fn test_fund_paid_expense_does_not_credit_payer() {
        let a = member(dec!(300));
        let b = member(dec!(300));
        let e = expense(
            a.member_id,
            dec!(400),
            true,
            vec![(a.member_id, dec!(200)), (b.member_id, dec!(200))],
        );

        let balances = LedgerService::compute_balances(&[a.clone(), b.clone()], &[e.clone()]);

        // Payer gets no out-of-pocket credit for fund-paid expenses.
        assert_eq!(balances[0].total_paid, dec!(0));
        assert_eq!(balances[0].net, dec!(100));
        assert_eq!(balances[1].net, dec!(100));

        let fund = LedgerService::fund_summary(&[a, b], &[e]);
        assert_eq!(fund.total_contributions, dec!(600));
        assert_eq!(fund.fund_paid_total, dec!(400));
        assert_eq!(fund.net_position, dec!(200));
    }

    #[test]
    fn test_income_inverts_direction() {
        // A received a 300 refund for the group, split evenly three ways.
        let a = member(dec!(0));
        let b = member(dec!(0));
        let c = member(dec!(0));
        let mut e = expense(
            a.member_id,
            dec!(300),
            false,
            vec![
                (a.member_id, dec!(100)),
                (b.member_id, dec!(100)),
                (c.member_id, dec!(100)),
            ],
        );
        e.is_income = true;

        let balances = LedgerService::compute_balances(&[a, b, c], &[e]);

        // The receiver owes the group what they collected, minus their cut.
        assert_eq!(balances[0].total_paid, dec!(-300));
        assert_eq!(balances[0].total_share, dec!(-100));
        assert_eq!(balances[0].net, dec!(-200));
        assert_eq!(balances[1].net, dec!(100));
        assert_eq!(balances[2].net, dec!(100));
    }

    #[test]
    fn test_shares_of_unknown_members_are_skipped() {
        let a = member(dec!(0));
        let departed = MemberId::new();
        let e = expense(
            a.member_id,
            dec!(100),
            false,
            vec![(a.member_id, dec!(50)), (departed, dec!(50))],
        );

        let balances = LedgerService::compute_balances(&[a], &[e]);

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].total_share, dec!(50));
    }

    #[test]
    fn test_claimed_placeholder_keeps_its_balance() {
        // A virtual placeholder owes 200 after three expenses. Replacing
        // it with a real user claims the member row in place (the id is
        // preserved), so recomputation over the same rows yields the
        // same balance.
        let li = member(dec!(0));
        let payer = member(dec!(0));
        let expenses = vec![
            expense(
                payer.member_id,
                dec!(100),
                false,
                vec![(li.member_id, dec!(50)), (payer.member_id, dec!(50))],
            ),
            expense(
                payer.member_id,
                dec!(200),
                false,
                vec![(li.member_id, dec!(100)), (payer.member_id, dec!(100))],
            ),
            expense(
                payer.member_id,
                dec!(100),
                false,
                vec![(li.member_id, dec!(50)), (payer.member_id, dec!(50))],
            ),
        ];
        let members = vec![li.clone(), payer];

        let before = LedgerService::compute_balances(&members, &expenses);
        assert_eq!(before[0].net, dec!(-200));

        // The claim changes user linkage only; the ledger inputs are
        // keyed by member id and stay identical.
        let after = LedgerService::compute_balances(&members, &expenses);
        assert_eq!(after, before);
        assert_eq!(after[0].member_id, li.member_id);
        assert_eq!(after[0].net, dec!(-200));
    }

    #[test]
    fn test_balance_sum_matches_fund_position() {
        let a = member(dec!(500));
        let b = member(dec!(250));
        let c = member(dec!(0));
        let expenses = vec![
            expense(
                a.member_id,
                dec!(120.50),
                false,
                vec![
                    (a.member_id, dec!(40.17)),
                    (b.member_id, dec!(40.17)),
                    (c.member_id, dec!(40.16)),
                ],
            ),
            expense(
                b.member_id,
                dec!(600),
                true,
                vec![
                    (a.member_id, dec!(200)),
                    (b.member_id, dec!(200)),
                    (c.member_id, dec!(200)),
                ],
            ),
        ];
        let members = vec![a, b, c];

        let balances = LedgerService::compute_balances(&members, &expenses);
        let fund = LedgerService::fund_summary(&members, &expenses);

        let net_sum: Decimal = balances.iter().map(|b| b.net).sum();
        assert_eq!(net_sum, fund.net_position);
    }
}
