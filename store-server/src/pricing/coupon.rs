//! Coupon Validator
//!
//! Validates a user-supplied code against usage limits and date windows,
//! computes the single discount amount, and records the redemption through
//! the repository's guarded update so concurrent submissions cannot push
//! usage past a limit.

use super::money::{clamp_amount, to_decimal, to_f64};
use super::PricingItem;
use crate::db::models::Coupon;
use crate::db::models::coupon::CouponKind;
use crate::db::repository::{CouponRepository, full_id};
use crate::utils::{AppError, AppResult};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Result of a successful coupon application
#[derive(Debug, Clone, Serialize)]
pub struct CouponApplication {
    pub code: String,
    pub description: Option<String>,
    pub discount_amount: f64,
    pub final_total: f64,
}

/// Compute the amount a coupon takes off a cart total, >= 0.
///
/// Zero below the minimum amount; percentage coupons are capped by
/// `maximum_amount`; the result never exceeds the total itself.
pub fn coupon_amount(coupon: &Coupon, cart_total: Decimal) -> Decimal {
    if cart_total < to_decimal(coupon.minimum_amount) {
        return Decimal::ZERO;
    }

    let amount = match coupon.kind {
        CouponKind::Percentage => {
            let raw = cart_total * to_decimal(coupon.value) / Decimal::ONE_HUNDRED;
            match coupon.maximum_amount {
                Some(cap) => raw.min(to_decimal(cap)),
                None => raw,
            }
        }
        CouponKind::Fixed => to_decimal(coupon.value),
    };

    clamp_amount(amount, cart_total)
}

/// Coupon application flow: validate, compute, redeem
#[derive(Clone)]
pub struct CouponEngine {
    coupons: CouponRepository,
}

impl CouponEngine {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            coupons: CouponRepository::new(db),
        }
    }

    /// Apply a coupon code to a cart for a user.
    ///
    /// Validation order follows the redemption contract: normalize the
    /// code, look up an active coupon, reject when it is NOT currently
    /// valid, reject when this user's redemptions are exhausted, reject a
    /// zero amount (below minimum), then record the redemption atomically.
    /// No counter moves unless every check passed AND the guarded update
    /// committed.
    pub async fn apply(
        &self,
        code: &str,
        user_id: &str,
        items: &[PricingItem],
        cart_total: f64,
    ) -> AppResult<CouponApplication> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(AppError::validation("Invalid or missing coupon code"));
        }
        if items.is_empty() {
            return Err(AppError::validation("Cart must contain at least one item"));
        }
        if !cart_total.is_finite() || cart_total <= 0.0 {
            return Err(AppError::validation("Cart total must be a positive number"));
        }

        let now = Utc::now();
        let coupon = self
            .coupons
            .find_active_by_code(&code)
            .await?
            .ok_or_else(|| AppError::not_found("Invalid or expired coupon"))?;

        if !coupon.is_valid_at(now) {
            return Err(AppError::limit_exceeded("Coupon is expired or exhausted"));
        }
        if !coupon.can_user_use(&format_user_id(user_id)) {
            return Err(AppError::limit_exceeded(
                "You have already used this coupon",
            ));
        }

        let total = to_decimal(cart_total);
        let amount = coupon_amount(&coupon, total);
        if amount.is_zero() {
            return Err(AppError::validation("Coupon does not apply to your cart"));
        }

        // Guarded increment: re-checks both limits inside the transaction
        let coupon_id = coupon
            .id
            .as_ref()
            .map(|id| id.to_string())
            .ok_or_else(|| AppError::internal("Coupon record has no id"))?;
        let redeemed = self.coupons.redeem(&coupon_id, user_id, now).await?;

        Ok(CouponApplication {
            code: redeemed.code,
            description: redeemed.description,
            discount_amount: to_f64(amount),
            final_total: to_f64(total - amount),
        })
    }
}

fn format_user_id(user_id: &str) -> String {
    full_id("user", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_coupon(kind: CouponKind, value: f64) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: None,
            code: "TEST".to_string(),
            description: None,
            kind,
            value,
            minimum_amount: 0.0,
            maximum_amount: None,
            usage_limit: None,
            usage_count: 0,
            user_limit: 1,
            used_by: Vec::new(),
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            is_active: true,
            created_by: None,
            created_at: now,
        }
    }

    #[test]
    fn test_percentage_amount() {
        let coupon = make_coupon(CouponKind::Percentage, 10.0);
        assert_eq!(coupon_amount(&coupon, to_decimal(200.0)), to_decimal(20.0));
    }

    #[test]
    fn test_percentage_capped_by_maximum() {
        let mut coupon = make_coupon(CouponKind::Percentage, 50.0);
        coupon.maximum_amount = Some(30.0);
        assert_eq!(coupon_amount(&coupon, to_decimal(200.0)), to_decimal(30.0));
    }

    #[test]
    fn test_fixed_below_minimum_is_zero() {
        // fixed 15 with minimum 50: a 40 cart gets nothing
        let mut coupon = make_coupon(CouponKind::Fixed, 15.0);
        coupon.minimum_amount = 50.0;
        assert_eq!(coupon_amount(&coupon, to_decimal(40.0)), Decimal::ZERO);
        assert_eq!(coupon_amount(&coupon, to_decimal(50.0)), to_decimal(15.0));
    }

    #[test]
    fn test_fixed_clamped_to_total() {
        let coupon = make_coupon(CouponKind::Fixed, 100.0);
        assert_eq!(coupon_amount(&coupon, to_decimal(60.0)), to_decimal(60.0));
    }
}
