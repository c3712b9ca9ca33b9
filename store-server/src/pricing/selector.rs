//! Discount Selector
//!
//! Picks which of the candidate discounts actually apply to a product or
//! cart, respecting combinability and priority, and aggregates the result
//! into a displayable pricing breakdown.
//!
//! Combination semantics: the first (by priority, descending) applicable
//! discount with `can_combine_with_other_discounts = false` and a non-zero
//! amount is the *exclusive* discount and suppresses all others. Otherwise
//! every applicable discount stacks additively - each amount is computed
//! independently against the same undiscounted base, never multiplicatively
//! against a running total.

use super::evaluator::discount_amount;
use super::matcher::can_user_use;
use super::money::{clamp_amount, to_decimal, to_f64};
use super::{
    AppliedDiscount, CartPricing, FormattedPricing, PricingBreakdown, PricingItem, UserContext,
};
use crate::db::models::{Discount, Product};
use crate::utils::money::format_inr;
use crate::utils::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;

/// Resolve the winning/combinable discount set and its total amount.
///
/// Returns the clamped total and one [`AppliedDiscount`] summary per
/// contributing discount. Quoting only - usage counters are not touched.
pub fn select_discounts(
    discounts: &[Discount],
    items: &[PricingItem],
    cart_total: Decimal,
    user: Option<&UserContext>,
    now: DateTime<Utc>,
) -> (Decimal, Vec<AppliedDiscount>) {
    // Step 1: user-level eligibility (validity window, per-customer limits)
    let mut candidates: Vec<&Discount> = discounts
        .iter()
        .filter(|d| can_user_use(d, user, now))
        .collect();

    // Higher priority first; the store usually returns them sorted but the
    // exclusivity rule depends on this order, so enforce it here
    candidates.sort_by(|a, b| b.priority.cmp(&a.priority));

    let amounts: Vec<(&Discount, Decimal)> = candidates
        .iter()
        .map(|d| (*d, discount_amount(d, items, cart_total, now)))
        .collect();

    // Step 2: the first non-combinable discount with a real amount wins alone
    let exclusive = amounts
        .iter()
        .find(|(d, amount)| !d.can_combine_with_other_discounts && *amount > Decimal::ZERO);

    let winners: Vec<(&Discount, Decimal)> = match exclusive {
        Some(&(discount, amount)) => vec![(discount, amount)],
        None => amounts
            .into_iter()
            .filter(|(_, amount)| *amount > Decimal::ZERO)
            .collect(),
    };

    let total: Decimal = winners.iter().map(|(_, amount)| *amount).sum();
    let total = clamp_amount(total, cart_total);

    let applied = winners
        .into_iter()
        .map(|(discount, amount)| AppliedDiscount {
            id: discount.id.as_ref().map(|id| id.to_string()),
            name: discount.name.clone(),
            kinds: discount
                .rules
                .iter()
                .map(|rule| rule.kind().to_string())
                .collect(),
            values: discount.rules.iter().map(|rule| rule.display_value()).collect(),
            amount: to_f64(amount),
        })
        .collect();

    (total, applied)
}

/// Price a single product against the candidate discounts.
///
/// The product is treated as a one-item cart with quantity 1;
/// `category_path` is its resolved category ancestry (own category first).
pub fn price_product(
    product: &Product,
    category_path: &[String],
    discounts: &[Discount],
    user: Option<&UserContext>,
    now: DateTime<Utc>,
) -> AppResult<PricingBreakdown> {
    if !product.price.is_finite() || product.price < 0.0 {
        return Err(AppError::validation(format!(
            "Product '{}' has no resolvable price",
            product.name
        )));
    }

    let item = PricingItem {
        product_id: product
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        category_path: category_path.to_vec(),
        unit_price: product.price,
        quantity: 1,
    };

    let price = to_decimal(product.price);
    let (total_discount, applied) = select_discounts(discounts, &[item], price, user, now);

    let discounted = (price - total_discount).max(Decimal::ZERO);

    // The savings reference is the list price: compare_price when set
    let compare_price = product.compare_price.filter(|cp| *cp > 0.0);
    let mrp = compare_price.map(to_decimal).unwrap_or(price);
    let savings = (mrp - discounted).max(Decimal::ZERO);

    let discount_percentage = match compare_price {
        Some(cp) => percentage_of(to_decimal(cp) - discounted, to_decimal(cp)),
        None => {
            if total_discount > Decimal::ZERO {
                percentage_of(total_discount, price)
            } else {
                0
            }
        }
    };

    let has_discount = total_discount > Decimal::ZERO;
    let mrp_f = to_f64(mrp);
    let discounted_f = to_f64(discounted);
    let savings_f = to_f64(savings);

    Ok(PricingBreakdown {
        original_price: mrp_f,
        discounted_price: discounted_f,
        discount_percentage,
        savings: savings_f,
        has_discount,
        applied_discounts: applied,
        show_mrp: mrp_f > discounted_f,
        show_discount_badge: has_discount,
        formatted: FormattedPricing {
            mrp: (mrp_f > 0.0).then(|| format_inr(mrp_f)),
            selling_price: format_inr(discounted_f),
            savings: format_inr(savings_f),
            discount_label: (discount_percentage != 0)
                .then(|| format!("{discount_percentage}% off")),
        },
    })
}

/// Price a cart against the candidate discounts
pub fn price_cart(
    items: &[PricingItem],
    discounts: &[Discount],
    user: Option<&UserContext>,
    now: DateTime<Utc>,
) -> AppResult<CartPricing> {
    if items
        .iter()
        .any(|item| !item.unit_price.is_finite() || item.unit_price < 0.0)
    {
        return Err(AppError::validation(
            "Cart contains an item without a resolvable price",
        ));
    }

    let cart_total: Decimal = items.iter().map(|item| to_decimal(item.subtotal())).sum();
    let (total_discount, applied) = select_discounts(discounts, items, cart_total, user, now);
    let discounted = (cart_total - total_discount).max(Decimal::ZERO);

    Ok(CartPricing {
        original_total: to_f64(cart_total),
        discounted_total: to_f64(discounted),
        total_discount: to_f64(total_discount),
        applied_discounts: applied,
    })
}

/// Rounded percentage `part / whole * 100`, 0 when the base is zero
fn percentage_of(part: Decimal, whole: Decimal) -> i64 {
    if whole.is_zero() {
        return 0;
    }
    (part / whole * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::DiscountRule;
    use crate::pricing::testutil::{make_discount, make_item};
    use surrealdb::RecordId;

    fn make_product(price: f64, compare_price: Option<f64>) -> Product {
        let mut product = Product::new(
            "Widget".to_string(),
            price,
            RecordId::from_table_key("category", "general"),
        );
        product.id = Some(RecordId::from_table_key("product", "widget"));
        product.compare_price = compare_price;
        product
    }

    #[test]
    fn test_no_discounts_identity() {
        // No applicable discounts: discounted price equals the sale price
        // and nothing claims a discount happened
        let product = make_product(100.0, None);
        let breakdown = price_product(&product, &[], &[], None, Utc::now()).unwrap();

        assert_eq!(breakdown.original_price, 100.0);
        assert_eq!(breakdown.discounted_price, 100.0);
        assert!(!breakdown.has_discount);
        assert!(!breakdown.show_discount_badge);
        assert!(breakdown.applied_discounts.is_empty());
        assert_eq!(breakdown.discount_percentage, 0);
    }

    #[test]
    fn test_worked_example_against_compare_price() {
        // price=100, compare_price=150, one 20% discount:
        // discounted=80, savings=70, percentage=round((150-80)/150*100)=47
        let product = make_product(100.0, Some(150.0));
        let mut discount = make_discount();
        discount.rules = vec![DiscountRule::Percentage { value: 20.0 }];

        let breakdown =
            price_product(&product, &[], std::slice::from_ref(&discount), None, Utc::now())
                .unwrap();

        assert_eq!(breakdown.original_price, 150.0);
        assert_eq!(breakdown.discounted_price, 80.0);
        assert_eq!(breakdown.savings, 70.0);
        assert_eq!(breakdown.discount_percentage, 47);
        assert!(breakdown.has_discount);
        assert!(breakdown.show_mrp);
        assert_eq!(breakdown.formatted.selling_price, "₹80");
        assert_eq!(breakdown.formatted.discount_label.as_deref(), Some("47% off"));
    }

    #[test]
    fn test_exclusive_discount_suppresses_others() {
        let mut exclusive = make_discount();
        exclusive.name = "Exclusive".to_string();
        exclusive.priority = 10;
        exclusive.can_combine_with_other_discounts = false;
        exclusive.rules = vec![DiscountRule::Percentage { value: 10.0 }];

        let mut stackable = make_discount();
        stackable.name = "Stackable".to_string();
        stackable.priority = 5;
        stackable.can_combine_with_other_discounts = true;
        stackable.rules = vec![DiscountRule::Percentage { value: 20.0 }];

        let items = [make_item("a", &[], 100.0, 1)];
        let (total, applied) = select_discounts(
            &[stackable, exclusive],
            &items,
            to_decimal(100.0),
            None,
            Utc::now(),
        );

        // Higher-priority exclusive wins alone even though stacking both
        // would discount more
        assert_eq!(to_f64(total), 10.0);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].name, "Exclusive");
    }

    #[test]
    fn test_combinable_discounts_stack_additively() {
        let mut first = make_discount();
        first.can_combine_with_other_discounts = true;
        first.rules = vec![DiscountRule::Percentage { value: 10.0 }];

        let mut second = make_discount();
        second.can_combine_with_other_discounts = true;
        second.rules = vec![DiscountRule::FixedAmount { value: 5.0 }];

        let items = [make_item("a", &[], 100.0, 1)];
        let (total, applied) = select_discounts(
            &[first, second],
            &items,
            to_decimal(100.0),
            None,
            Utc::now(),
        );

        // Both computed against the same base: 10 + 5, not 10% then 5 off 90
        assert_eq!(to_f64(total), 15.0);
        assert_eq!(applied.len(), 2);
    }

    #[test]
    fn test_total_clamped_to_cart_total() {
        let mut first = make_discount();
        first.can_combine_with_other_discounts = true;
        first.rules = vec![DiscountRule::Percentage { value: 80.0 }];

        let mut second = make_discount();
        second.can_combine_with_other_discounts = true;
        second.rules = vec![DiscountRule::Percentage { value: 60.0 }];

        let items = [make_item("a", &[], 100.0, 1)];
        let (total, _) = select_discounts(
            &[first, second],
            &items,
            to_decimal(100.0),
            None,
            Utc::now(),
        );

        assert_eq!(to_f64(total), 100.0);
    }

    #[test]
    fn test_zero_amount_exclusive_does_not_block() {
        // An exclusive discount whose scope misses the cart must not
        // suppress a matching combinable one
        let mut exclusive = make_discount();
        exclusive.priority = 10;
        exclusive.can_combine_with_other_discounts = false;
        exclusive.applicable_products =
            vec![RecordId::from_table_key("product", "something-else")];

        let mut stackable = make_discount();
        stackable.can_combine_with_other_discounts = true;
        stackable.rules = vec![DiscountRule::Percentage { value: 20.0 }];

        let items = [make_item("a", &[], 100.0, 1)];
        let (total, applied) = select_discounts(
            &[exclusive, stackable],
            &items,
            to_decimal(100.0),
            None,
            Utc::now(),
        );

        assert_eq!(to_f64(total), 20.0);
        assert_eq!(applied.len(), 1);
    }

    #[test]
    fn test_price_cart_totals() {
        let mut discount = make_discount();
        discount.rules = vec![DiscountRule::Percentage { value: 10.0 }];

        let items = [
            make_item("a", &[], 100.0, 2),
            make_item("b", &[], 50.0, 1),
        ];
        let pricing = price_cart(&items, &[discount], None, Utc::now()).unwrap();

        assert_eq!(pricing.original_total, 250.0);
        assert_eq!(pricing.total_discount, 25.0);
        assert_eq!(pricing.discounted_total, 225.0);
        assert_eq!(pricing.applied_discounts.len(), 1);
    }

    #[test]
    fn test_unpriceable_product_rejected() {
        let product = make_product(f64::NAN, None);
        assert!(price_product(&product, &[], &[], None, Utc::now()).is_err());
    }
}
