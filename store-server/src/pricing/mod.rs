//! Discount / Pricing Resolution Engine
//!
//! Given a product (or a cart of items) and the set of active promotional
//! rules, this module determines the final price, the winning/combinable
//! rule set, and a displayable breakdown.
//!
//! The computation itself is pure: all store I/O happens up front in
//! [`PricingEngine`] / [`CouponEngine`], which fetch the records and resolve
//! category ancestry before handing plain data to the matcher, evaluator and
//! selector. Quoting never mutates usage counters; only coupon redemption
//! does, through a guarded update.

mod coupon;
mod engine;
mod evaluator;
mod hierarchy;
pub mod matcher;
mod money;
mod selector;
#[cfg(test)]
pub(crate) mod testutil;

pub use coupon::{CouponApplication, CouponEngine, coupon_amount};
pub use engine::PricingEngine;
pub use evaluator::{discount_amount, evaluate_rule};
pub use hierarchy::CategoryResolver;
pub use money::{clamp_amount, to_decimal, to_f64};
pub use selector::{price_cart, price_product};

use serde::Serialize;

/// One cart line as the engine sees it: ids flattened to strings and the
/// category ancestry already resolved (item's own category first).
#[derive(Debug, Clone)]
pub struct PricingItem {
    pub product_id: String,
    /// The item's category id plus its ancestors, nearest first; empty when
    /// the product has no resolvable category
    pub category_path: Vec<String>,
    pub unit_price: f64,
    pub quantity: u32,
}

impl PricingItem {
    pub fn subtotal(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Authenticated caller context for per-user eligibility checks
#[derive(Debug, Clone)]
pub struct UserContext {
    /// Full record id ("user:key")
    pub user_id: String,
    pub is_first_time_customer: bool,
}

/// Summary of one applied discount for display
#[derive(Debug, Clone, Serialize)]
pub struct AppliedDiscount {
    pub id: Option<String>,
    pub name: String,
    /// Rule kind labels, one per rule
    pub kinds: Vec<String>,
    /// Primary rule values, one per rule (None for kinds without a single
    /// headline number)
    pub values: Vec<Option<f64>>,
    /// Monetary amount this discount contributed
    pub amount: f64,
}

/// Locale-formatted price strings for direct storefront display
#[derive(Debug, Clone, Serialize)]
pub struct FormattedPricing {
    pub mrp: Option<String>,
    pub selling_price: String,
    pub savings: String,
    pub discount_label: Option<String>,
}

/// Displayable pricing for a single product
#[derive(Debug, Clone, Serialize)]
pub struct PricingBreakdown {
    /// List price: compare_price when set, else the sale price
    pub original_price: f64,
    pub discounted_price: f64,
    /// Percentage off relative to compare_price when present, else relative
    /// to the sale price
    pub discount_percentage: i64,
    /// Savings versus the list price
    pub savings: f64,
    pub has_discount: bool,
    pub applied_discounts: Vec<AppliedDiscount>,
    pub show_mrp: bool,
    pub show_discount_badge: bool,
    pub formatted: FormattedPricing,
}

/// Aggregate pricing for a cart
#[derive(Debug, Clone, Serialize)]
pub struct CartPricing {
    pub original_total: f64,
    pub discounted_total: f64,
    pub total_discount: f64,
    pub applied_discounts: Vec<AppliedDiscount>,
}
