//! Discount Model
//!
//! A discount is a promotional rule bundle: an ordered list of rules plus
//! scope, time-window, usage-limit and combinability constraints. Rule
//! payloads are a tagged enum validated at construction time, not at save
//! time.

use super::serde_helpers;
use super::serde_record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type DiscountId = RecordId;

/// One bulk-pricing tier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkTier {
    pub min_quantity: u32,
    pub discount_percentage: f64,
}

/// One product required by a bundle rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleProduct {
    #[serde(with = "serde_record")]
    pub product: RecordId,
    #[serde(default = "default_one")]
    pub min_quantity: u32,
}

fn default_one() -> u32 {
    1
}

/// How a bundle's discount value is interpreted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BundleDiscountKind {
    Percentage,
    FixedAmount,
}

/// One monetary computation method within a discount
///
/// Rules are evaluated independently against the same cart and summed;
/// the per-discount total is clamped to the cart total by the evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountRule {
    /// amount = cart_total * value / 100
    Percentage { value: f64 },
    /// amount = value (flat)
    FixedAmount { value: f64 },
    /// Per item: free_units = floor(qty / (buy + get)) * get,
    /// amount = free_units * unit_price * get_discount_percentage / 100
    BuyXGetY {
        buy_quantity: u32,
        get_quantity: u32,
        #[serde(default = "default_hundred")]
        get_discount_percentage: f64,
    },
    /// Every tier whose min_quantity is met adds
    /// item_subtotal * discount_percentage / 100
    BulkDiscount { tiers: Vec<BulkTier> },
    /// Handled by the shipping subsystem; contributes 0 here
    FreeShipping,
    /// Flat amount or percentage of cart total once every bundle product is
    /// in the cart at its minimum quantity
    BundleDiscount {
        bundle_products: Vec<BundleProduct>,
        bundle_discount_type: BundleDiscountKind,
        bundle_discount_value: f64,
    },
}

fn default_hundred() -> f64 {
    100.0
}

impl DiscountRule {
    /// Validate per-kind payload invariants
    ///
    /// Called by the repository before create/update so a malformed rule is
    /// rejected at construction and never reaches the evaluator.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            DiscountRule::Percentage { value } => {
                if !(0.0..=100.0).contains(value) {
                    return Err(format!("percentage value must be in 0..=100, got {value}"));
                }
            }
            DiscountRule::FixedAmount { value } => {
                if *value < 0.0 {
                    return Err("fixed amount cannot be negative".to_string());
                }
            }
            DiscountRule::BuyXGetY {
                buy_quantity,
                get_quantity,
                get_discount_percentage,
            } => {
                if *buy_quantity < 1 || *get_quantity < 1 {
                    return Err("buy and get quantities must be at least 1".to_string());
                }
                if !(0.0..=100.0).contains(get_discount_percentage) {
                    return Err("get discount percentage must be in 0..=100".to_string());
                }
            }
            DiscountRule::BulkDiscount { tiers } => {
                if tiers.is_empty() {
                    return Err("bulk discount requires at least one tier".to_string());
                }
                for tier in tiers {
                    if tier.min_quantity < 1 {
                        return Err("tier minimum quantity must be at least 1".to_string());
                    }
                    if !(0.0..=100.0).contains(&tier.discount_percentage) {
                        return Err("tier discount percentage must be in 0..=100".to_string());
                    }
                }
            }
            DiscountRule::FreeShipping => {}
            DiscountRule::BundleDiscount {
                bundle_products,
                bundle_discount_value,
                ..
            } => {
                if bundle_products.is_empty() {
                    return Err("bundle discount requires at least one product".to_string());
                }
                if bundle_products.iter().any(|b| b.min_quantity < 1) {
                    return Err("bundle minimum quantity must be at least 1".to_string());
                }
                if *bundle_discount_value < 0.0 {
                    return Err("bundle discount value cannot be negative".to_string());
                }
            }
        }
        Ok(())
    }

    /// Short kind label for applied-discount summaries
    pub fn kind(&self) -> &'static str {
        match self {
            DiscountRule::Percentage { .. } => "percentage",
            DiscountRule::FixedAmount { .. } => "fixed_amount",
            DiscountRule::BuyXGetY { .. } => "buy_x_get_y",
            DiscountRule::BulkDiscount { .. } => "bulk_discount",
            DiscountRule::FreeShipping => "free_shipping",
            DiscountRule::BundleDiscount { .. } => "bundle_discount",
        }
    }

    /// Primary numeric value for applied-discount summaries
    pub fn display_value(&self) -> Option<f64> {
        match self {
            DiscountRule::Percentage { value } | DiscountRule::FixedAmount { value } => {
                Some(*value)
            }
            DiscountRule::BuyXGetY {
                get_discount_percentage,
                ..
            } => Some(*get_discount_percentage),
            DiscountRule::BundleDiscount {
                bundle_discount_value,
                ..
            } => Some(*bundle_discount_value),
            DiscountRule::BulkDiscount { .. } | DiscountRule::FreeShipping => None,
        }
    }
}

/// Day-of-week / time-of-day restriction
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimeRestrictions {
    /// Days of week (0=Sunday, 1=Monday, ..., 6=Saturday)
    pub days_of_week: Option<Vec<u8>>,
    /// Start time (HH:MM)
    pub start_time: Option<String>,
    /// End time (HH:MM)
    pub end_time: Option<String>,
}

/// Per-user usage record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEntry {
    #[serde(with = "serde_record")]
    pub user: RecordId,
    #[serde(default)]
    pub used_count: u32,
    pub last_used: Option<DateTime<Utc>>,
}

/// Discount entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    #[serde(default, with = "serde_record::option", skip_serializing_if = "Option::is_none")]
    pub id: Option<DiscountId>,
    pub name: String,
    pub description: Option<String>,
    /// Activation code, uppercase; only set for code-activated discounts
    pub code: Option<String>,
    pub rules: Vec<DiscountRule>,

    // Applicability scope. Both include sets empty means "all products";
    // exclude sets always win and are checked first.
    #[serde(default, with = "serde_record::vec")]
    pub applicable_products: Vec<RecordId>,
    #[serde(default, with = "serde_record::vec")]
    pub applicable_categories: Vec<RecordId>,
    #[serde(default, with = "serde_record::vec")]
    pub exclude_products: Vec<RecordId>,
    #[serde(default, with = "serde_record::vec")]
    pub exclude_categories: Vec<RecordId>,

    // Order conditions
    #[serde(default)]
    pub minimum_order_amount: f64,
    pub maximum_order_amount: Option<f64>,
    #[serde(default)]
    pub minimum_quantity: u32,

    // Customer restrictions
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub first_time_customers_only: bool,

    // Usage limits
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub usage_count: u32,
    #[serde(default = "default_one")]
    pub usage_limit_per_customer: u32,
    #[serde(default)]
    pub used_by: Vec<UsageEntry>,

    // Time window
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub time_restrictions: Option<TimeRestrictions>,

    // Combination rules
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub can_combine_with_other_discounts: bool,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub can_combine_with_coupons: bool,
    /// Higher priority discounts are evaluated/preferred first
    #[serde(default)]
    pub priority: i32,

    // Status and settings
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    /// Automatically applied vs requires a code
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_automatic: bool,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub show_on_storefront: bool,

    // Tracking
    #[serde(default)]
    pub total_savings: f64,
    #[serde(default, with = "serde_record::option")]
    pub created_by: Option<RecordId>,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Discount {
    /// Per-user usage lookup
    pub fn usage_for(&self, user_id: &str) -> Option<&UsageEntry> {
        self.used_by
            .iter()
            .find(|entry| entry.user.to_string() == user_id)
    }
}

/// Create discount payload
#[derive(Debug, Clone, Deserialize)]
pub struct DiscountCreate {
    pub name: String,
    pub description: Option<String>,
    pub code: Option<String>,
    pub rules: Vec<DiscountRule>,
    #[serde(default)]
    pub applicable_products: Vec<String>,
    #[serde(default)]
    pub applicable_categories: Vec<String>,
    #[serde(default)]
    pub exclude_products: Vec<String>,
    #[serde(default)]
    pub exclude_categories: Vec<String>,
    pub minimum_order_amount: Option<f64>,
    pub maximum_order_amount: Option<f64>,
    pub minimum_quantity: Option<u32>,
    pub first_time_customers_only: Option<bool>,
    pub usage_limit: Option<u32>,
    pub usage_limit_per_customer: Option<u32>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub time_restrictions: Option<TimeRestrictions>,
    pub can_combine_with_other_discounts: Option<bool>,
    pub can_combine_with_coupons: Option<bool>,
    pub priority: Option<i32>,
    pub is_automatic: Option<bool>,
    pub show_on_storefront: Option<bool>,
}

/// Update discount payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<DiscountRule>>,
    #[serde(default, with = "serde_record::vec_option", skip_serializing_if = "Option::is_none")]
    pub applicable_products: Option<Vec<RecordId>>,
    #[serde(default, with = "serde_record::vec_option", skip_serializing_if = "Option::is_none")]
    pub applicable_categories: Option<Vec<RecordId>>,
    #[serde(default, with = "serde_record::vec_option", skip_serializing_if = "Option::is_none")]
    pub exclude_products: Option<Vec<RecordId>>,
    #[serde(default, with = "serde_record::vec_option", skip_serializing_if = "Option::is_none")]
    pub exclude_categories: Option<Vec<RecordId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_order_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_order_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_time_customers_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit_per_customer: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_restrictions: Option<TimeRestrictions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_combine_with_other_discounts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_combine_with_coupons: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_automatic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_on_storefront: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_tag_serialization() {
        let rule = DiscountRule::Percentage { value: 20.0 };
        let json = serde_json::to_value(&rule).expect("serialize rule");
        assert_eq!(json["type"], "percentage");
        assert_eq!(json["value"], 20.0);

        let parsed: DiscountRule = serde_json::from_value(serde_json::json!({
            "type": "buy_x_get_y",
            "buy_quantity": 2,
            "get_quantity": 1
        }))
        .expect("deserialize rule");
        match parsed {
            DiscountRule::BuyXGetY {
                buy_quantity,
                get_quantity,
                get_discount_percentage,
            } => {
                assert_eq!(buy_quantity, 2);
                assert_eq!(get_quantity, 1);
                assert_eq!(get_discount_percentage, 100.0);
            }
            other => panic!("unexpected rule: {other:?}"),
        }
    }

    #[test]
    fn test_rule_validation_rejects_malformed() {
        assert!(DiscountRule::Percentage { value: 120.0 }.validate().is_err());
        assert!(DiscountRule::FixedAmount { value: -1.0 }.validate().is_err());
        assert!(
            DiscountRule::BuyXGetY {
                buy_quantity: 0,
                get_quantity: 1,
                get_discount_percentage: 100.0,
            }
            .validate()
            .is_err()
        );
        assert!(DiscountRule::BulkDiscount { tiers: vec![] }.validate().is_err());
        assert!(DiscountRule::FreeShipping.validate().is_ok());
    }
}
