//! Fee policy and business limits
//!
//! All amounts are Toman-denominated with no fractional subunit. Limits are
//! named constants so they can be tuned without touching the algorithm.

use rust_decimal::Decimal;

/// Minimum transaction amount
pub const MIN_TX: i64 = 1_000;

/// Maximum transaction amount
pub const MAX_TX: i64 = 50_000_000;

/// Fee cap per transaction
pub const FEE_CAP: i64 = 100_000;

/// Daily cumulative outgoing cap per source card
pub const CARD_DAILY_CAP: i64 = 50_000_000;

/// Fee rate applied to every outgoing movement (10%)
pub fn fee_rate() -> Decimal {
    Decimal::new(10, 2)
}

/// Calculate the fee for a transfer amount.
///
/// Truncates toward zero at the whole-Toman boundary, then clamps to
/// [`FEE_CAP`]. Pure and deterministic.
pub fn calc_fee(amount: Decimal) -> Decimal {
    let fee = (amount * fee_rate()).trunc();
    fee.min(Decimal::from(FEE_CAP))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_fee_basic() {
        assert_eq!(calc_fee(Decimal::from(100_000)), Decimal::from(10_000));
        assert_eq!(calc_fee(Decimal::from(45_000)), Decimal::from(4_500));
        assert_eq!(calc_fee(Decimal::from(MIN_TX)), Decimal::from(100));
    }

    #[test]
    fn test_calc_fee_truncates_toward_zero() {
        // 10% of 1005 is 100.5 -> 100, never rounded up
        assert_eq!(calc_fee(Decimal::from(1_005)), Decimal::from(100));
        assert_eq!(calc_fee(Decimal::from(1_009)), Decimal::from(100));
        assert_eq!(calc_fee(Decimal::new(10_005, 1)), Decimal::from(100)); // 1000.5
    }

    #[test]
    fn test_calc_fee_cap() {
        // 1,000,000 is the last amount whose raw fee sits exactly at the cap
        assert_eq!(calc_fee(Decimal::from(1_000_000)), Decimal::from(FEE_CAP));
        assert_eq!(calc_fee(Decimal::from(1_000_010)), Decimal::from(FEE_CAP));
        assert_eq!(calc_fee(Decimal::from(MAX_TX)), Decimal::from(FEE_CAP));
    }

    #[test]
    fn test_calc_fee_matches_formula_across_range() {
        for amount in [1_000i64, 4_999, 123_456, 999_999, 1_000_000, 25_000_000, MAX_TX] {
            let expected = Decimal::from((amount / 10).min(FEE_CAP));
            assert_eq!(calc_fee(Decimal::from(amount)), expected, "amount={amount}");
        }
    }
}
