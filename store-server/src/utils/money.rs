//! Currency display helpers
//!
//! Storefront prices are rendered in rupees with Indian digit grouping
//! (lakh/crore style: `₹12,34,567.50`), matching what the React storefront
//! prints next to each product card.

use rust_decimal::prelude::*;

/// Rounding for displayed amounts (2 decimal places, half-up)
const DISPLAY_PLACES: u32 = 2;

/// Format an amount as a rupee string with en-IN digit grouping.
///
/// Trailing zero cents are dropped: `100.00` renders as `₹100`,
/// `99.50` as `₹99.5`.
pub fn format_inr(amount: f64) -> String {
    let value = Decimal::from_f64(amount)
        .unwrap_or_default()
        .round_dp_with_strategy(DISPLAY_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    let text = value.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let grouped = group_indian(&int_part);
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };

    match frac_part {
        Some(frac) => format!("{sign}₹{grouped}.{frac}"),
        None => format!("{sign}₹{grouped}"),
    }
}

/// Apply Indian grouping: last 3 digits, then groups of 2.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<String> = Vec::new();
    let head_chars: Vec<char> = head.chars().collect();
    let mut idx = head_chars.len();
    while idx > 0 {
        let start = idx.saturating_sub(2);
        groups.push(head_chars[start..idx].iter().collect());
        idx = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_amounts_ungrouped() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(100.0), "₹100");
        assert_eq!(format_inr(999.0), "₹999");
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_inr(1234.0), "₹1,234");
        assert_eq!(format_inr(123456.0), "₹1,23,456");
        assert_eq!(format_inr(12345678.0), "₹1,23,45,678");
    }

    #[test]
    fn test_fractional_amounts() {
        assert_eq!(format_inr(99.5), "₹99.5");
        assert_eq!(format_inr(1234.75), "₹1,234.75");
        // half-up rounding to 2 places
        assert_eq!(format_inr(10.005), "₹10.01");
    }
}
