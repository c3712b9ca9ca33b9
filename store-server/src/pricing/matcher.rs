//! Discount Matcher
//!
//! Scope matching, validity windows and per-user eligibility. These are the
//! gates a discount passes before its rules are ever evaluated.

use super::{PricingItem, UserContext};
use crate::db::models::{Discount, TimeRestrictions};
use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc};

/// Check whether a discount's scope covers a set of cart items.
///
/// Exclusions are evaluated per item, before inclusions, and always win for
/// that item; a single non-excluded item matching the include sets makes the
/// whole discount apply. Empty include sets mean "applies to all products".
pub fn applies_to(discount: &Discount, items: &[PricingItem]) -> bool {
    if items.is_empty() {
        return false;
    }

    let applies_to_all =
        discount.applicable_products.is_empty() && discount.applicable_categories.is_empty();
    if applies_to_all {
        return true;
    }

    let applicable_products: Vec<String> = ids(&discount.applicable_products);
    let applicable_categories: Vec<String> = ids(&discount.applicable_categories);
    let exclude_products: Vec<String> = ids(&discount.exclude_products);
    let exclude_categories: Vec<String> = ids(&discount.exclude_categories);

    for item in items {
        // Exclusions: skip this item, keep scanning the rest
        if exclude_products.contains(&item.product_id) {
            continue;
        }
        if item
            .category_path
            .iter()
            .any(|cat| exclude_categories.contains(cat))
        {
            continue;
        }

        // Inclusions: first match wins
        let matches_product = applicable_products.contains(&item.product_id);
        let matches_category = item
            .category_path
            .iter()
            .any(|cat| applicable_categories.contains(cat));

        if matches_product || matches_category {
            return true;
        }
    }

    false
}

/// Check whether a discount is currently valid: active, inside its date
/// window, global usage limit not exhausted, and inside any time-of-day /
/// day-of-week restriction.
pub fn is_valid_at(discount: &Discount, now: DateTime<Utc>) -> bool {
    if !discount.is_active || discount.start_date > now || discount.end_date < now {
        return false;
    }

    if let Some(limit) = discount.usage_limit
        && discount.usage_count >= limit
    {
        return false;
    }

    match &discount.time_restrictions {
        Some(tr) => is_time_allowed(tr, now),
        None => true,
    }
}

/// Check a day-of-week / time-of-day restriction
pub fn is_time_allowed(tr: &TimeRestrictions, now: DateTime<Utc>) -> bool {
    if let Some(days) = &tr.days_of_week
        && !days.is_empty()
    {
        let current_day = now.weekday().num_days_from_sunday() as u8;
        if !days.contains(&current_day) {
            return false;
        }
    }

    if let (Some(start), Some(end)) = (tr.start_time.as_deref(), tr.end_time.as_deref())
        && let (Ok(start_time), Ok(end_time)) = (
            NaiveTime::parse_from_str(start, "%H:%M"),
            NaiveTime::parse_from_str(end, "%H:%M"),
        )
    {
        let current_time = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0)
            .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).unwrap());

        // Handle overnight ranges (e.g., 22:00 - 02:00)
        if start_time <= end_time {
            if !(current_time >= start_time && current_time <= end_time) {
                return false;
            }
        } else if !(current_time >= start_time || current_time <= end_time) {
            return false;
        }
    }

    true
}

/// Check whether a user may use this discount: validity plus first-time
/// restriction plus the per-customer usage limit.
///
/// `user` is None for anonymous storefront quoting, which skips the
/// user-specific gates.
pub fn can_user_use(discount: &Discount, user: Option<&UserContext>, now: DateTime<Utc>) -> bool {
    if !is_valid_at(discount, now) {
        return false;
    }

    let Some(user) = user else {
        // Anonymous quoting cannot satisfy a first-time-only restriction
        return !discount.first_time_customers_only;
    };

    if discount.first_time_customers_only && !user.is_first_time_customer {
        return false;
    }

    if let Some(usage) = discount.usage_for(&user.user_id)
        && usage.used_count >= discount.usage_limit_per_customer
    {
        return false;
    }

    true
}

/// Check order-level conditions: minimum/maximum order amount and minimum
/// total quantity.
pub fn meets_order_conditions(discount: &Discount, items: &[PricingItem], cart_total: f64) -> bool {
    if cart_total < discount.minimum_order_amount {
        return false;
    }
    if let Some(max) = discount.maximum_order_amount
        && cart_total > max
    {
        return false;
    }
    let total_quantity: u32 = items.iter().map(|item| item.quantity).sum();
    total_quantity >= discount.minimum_quantity
}

fn ids(records: &[surrealdb::RecordId]) -> Vec<String> {
    records.iter().map(|id| id.to_string()).collect()
}
