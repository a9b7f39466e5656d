//! Expense share validation.
//!
//! An expense is accepted only if its participant shares add up to the
//! expense amount within one currency minor unit. The tolerance absorbs
//! the rounding of an uneven split (e.g. 100.00 three ways); anything
//! larger is a data error.

use rust_decimal::Decimal;
use std::collections::HashSet;

use patungan_shared::types::money::within_minor_unit;

use super::error::LedgerError;
use super::types::Share;

/// Validates an expense amount against its participant shares.
///
/// # Errors
///
/// - `NegativeAmount` if the amount is negative (income is a flag, never
///   a negative amount)
/// - `NoParticipants` if no shares were submitted
/// - `NegativeShare` / `DuplicateParticipant` on malformed share lists
/// - `ShareSumMismatch` if the shares differ from the amount by more than
///   one minor unit
pub fn validate_expense_shares(amount: Decimal, shares: &[Share]) -> Result<(), LedgerError> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount);
    }
    if shares.is_empty() {
        return Err(LedgerError::NoParticipants);
    }

    let mut seen = HashSet::with_capacity(shares.len());
    for share in shares {
        if share.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeShare(share.member_id));
        }
        if !seen.insert(share.member_id) {
            return Err(LedgerError::DuplicateParticipant(share.member_id));
        }
    }

    let total: Decimal = shares.iter().map(|s| s.amount).sum();
    if !within_minor_unit(total, amount) {
        return Err(LedgerError::ShareSumMismatch {
            expected: amount,
            actual: total,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use patungan_shared::types::MemberId;
    use rust_decimal_macros::dec;

    fn shares(amounts: &[Decimal]) -> Vec<Share> {
        amounts
            .iter()
            .map(|&amount| Share {
                member_id: MemberId::new(),
                amount,
            })
            .collect()
    }

    #[test]
    fn test_exact_split_is_valid() {
        let s = shares(&[dec!(50), dec!(30), dec!(20)]);
        assert!(validate_expense_shares(dec!(100), &s).is_ok());
    }

    #[test]
    fn test_uneven_three_way_split_within_tolerance() {
        // 100.00 / 3 rounds to 33.33 + 33.33 + 33.33 = 99.99
        let s = shares(&[dec!(33.33), dec!(33.33), dec!(33.33)]);
        assert!(validate_expense_shares(dec!(100.00), &s).is_ok());
    }

    #[test]
    fn test_mismatch_beyond_tolerance_is_rejected() {
        let s = shares(&[dec!(33.33), dec!(33.33), dec!(33.32)]);
        let result = validate_expense_shares(dec!(100.00), &s);
        assert!(matches!(
            result,
            Err(LedgerError::ShareSumMismatch { .. })
        ));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let s = shares(&[dec!(10)]);
        assert!(matches!(
            validate_expense_shares(dec!(-10), &s),
            Err(LedgerError::NegativeAmount)
        ));
    }

    #[test]
    fn test_empty_participants_rejected() {
        assert!(matches!(
            validate_expense_shares(dec!(10), &[]),
            Err(LedgerError::NoParticipants)
        ));
    }

    #[test]
    fn test_negative_share_rejected() {
        let s = shares(&[dec!(20), dec!(-10)]);
        assert!(matches!(
            validate_expense_shares(dec!(10), &s),
            Err(LedgerError::NegativeShare(_))
        ));
    }

    #[test]
    fn test_duplicate_participant_rejected() {
        let id = MemberId::new();
        let s = vec![
            Share {
                member_id: id,
                amount: dec!(5),
            },
            Share {
                member_id: id,
                amount: dec!(5),
            },
        ];
        assert!(matches!(
            validate_expense_shares(dec!(10), &s),
            Err(LedgerError::DuplicateParticipant(_))
        ));
    }

    #[test]
    fn test_zero_amount_expense_with_zero_shares() {
        let s = shares(&[dec!(0)]);
        assert!(validate_expense_shares(dec!(0), &s).is_ok());
    }
}
