//! Shared fixtures for pricing tests

use super::PricingItem;
use crate::db::models::{Discount, DiscountRule};
use chrono::{Duration, Utc};

/// A wildcard-scope, always-valid percentage discount to mutate per test
pub(crate) fn make_discount() -> Discount {
    let now = Utc::now();
    Discount {
        id: None,
        name: "Test".to_string(),
        description: None,
        code: None,
        rules: vec![DiscountRule::Percentage { value: 10.0 }],
        applicable_products: Vec::new(),
        applicable_categories: Vec::new(),
        exclude_products: Vec::new(),
        exclude_categories: Vec::new(),
        minimum_order_amount: 0.0,
        maximum_order_amount: None,
        minimum_quantity: 0,
        first_time_customers_only: false,
        usage_limit: None,
        usage_count: 0,
        usage_limit_per_customer: 1,
        used_by: Vec::new(),
        start_date: now - Duration::days(1),
        end_date: now + Duration::days(1),
        time_restrictions: None,
        can_combine_with_other_discounts: false,
        can_combine_with_coupons: true,
        priority: 0,
        is_active: true,
        is_automatic: true,
        show_on_storefront: false,
        total_savings: 0.0,
        created_by: None,
        created_at: now,
    }
}

/// Cart line with pre-resolved category path
pub(crate) fn make_item(
    product: &str,
    categories: &[&str],
    price: f64,
    quantity: u32,
) -> PricingItem {
    PricingItem {
        product_id: format!("product:{product}"),
        category_path: categories.iter().map(|c| format!("category:{c}")).collect(),
        unit_price: price,
        quantity,
    }
}
