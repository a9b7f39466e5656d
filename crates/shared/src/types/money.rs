//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` at a fixed minor-unit scale.

use rust_decimal::Decimal;

/// Number of decimal places of the currency minor unit (cents).
pub const MINOR_UNIT_SCALE: u32 = 2;

/// One currency minor unit (0.01).
///
/// Amounts whose magnitude falls below this are treated as settled:
/// they cannot be represented as a real transfer.
#[must_use]
pub fn minor_unit() -> Decimal {
    Decimal::new(1, MINOR_UNIT_SCALE)
}

/// Returns true if `amount` is within one minor unit of zero.
#[must_use]
pub fn is_settled(amount: Decimal) -> bool {
    amount.abs() < minor_unit()
}

/// Rounds an amount to the minor-unit scale using Banker's Rounding.
#[must_use]
pub fn round_minor(amount: Decimal) -> Decimal {
    amount.round_dp(MINOR_UNIT_SCALE)
}

/// Returns true if two amounts agree within one minor unit.
#[must_use]
pub fn within_minor_unit(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= minor_unit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_minor_unit_is_one_cent() {
        assert_eq!(minor_unit(), dec!(0.01));
    }

    #[test]
    fn test_is_settled_boundary() {
        assert!(is_settled(Decimal::ZERO));
        assert!(is_settled(dec!(0.009)));
        assert!(is_settled(dec!(-0.009)));
        assert!(!is_settled(dec!(0.01)));
        assert!(!is_settled(dec!(-0.01)));
    }

    #[test]
    fn test_round_minor_bankers() {
        // Banker's Rounding: ties go to the even digit
        assert_eq!(round_minor(dec!(1.005)), dec!(1.00));
        assert_eq!(round_minor(dec!(1.015)), dec!(1.02));
        assert_eq!(round_minor(dec!(1.014)), dec!(1.01));
    }

    #[test]
    fn test_within_minor_unit() {
        assert!(within_minor_unit(dec!(100.00), dec!(100.01)));
        assert!(within_minor_unit(dec!(100.00), dec!(99.99)));
        assert!(!within_minor_unit(dec!(100.00), dec!(100.02)));
    }
}
