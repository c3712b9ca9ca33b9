//! Monetary conversion helpers
//!
//! Model fields store f64; all pricing arithmetic runs on rust_decimal and
//! rounds half-up to 2 decimal places on the way back out.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Clamp an amount into [0, max]
#[inline]
pub fn clamp_amount(amount: Decimal, max: Decimal) -> Decimal {
    amount.max(Decimal::ZERO).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_up_rounding() {
        assert_eq!(to_f64(to_decimal(10.005)), 10.01);
        assert_eq!(to_f64(to_decimal(10.004)), 10.0);
    }

    #[test]
    fn test_clamp() {
        let hundred = Decimal::ONE_HUNDRED;
        assert_eq!(clamp_amount(Decimal::new(-5, 0), hundred), Decimal::ZERO);
        assert_eq!(clamp_amount(Decimal::new(150, 0), hundred), hundred);
        assert_eq!(
            clamp_amount(Decimal::new(50, 0), hundred),
            Decimal::new(50, 0)
        );
    }
}
