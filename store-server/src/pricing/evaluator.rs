//! Discount Rule Evaluator
//!
//! Computes the monetary amount of a single rule against a cart, and the
//! clamped total for a whole discount. Uses rust_decimal throughout; a rule
//! can never yield a negative amount and a discount can never exceed the
//! cart's own value.

use super::money::{clamp_amount, to_decimal};
use super::{PricingItem, matcher};
use crate::db::models::{BundleDiscountKind, Discount, DiscountRule};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Compute the amount one rule contributes, >= 0
pub fn evaluate_rule(rule: &DiscountRule, items: &[PricingItem], cart_total: Decimal) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;

    let amount = match rule {
        DiscountRule::Percentage { value } => cart_total * to_decimal(*value) / hundred,

        DiscountRule::FixedAmount { value } => to_decimal(*value),

        DiscountRule::BuyXGetY {
            buy_quantity,
            get_quantity,
            get_discount_percentage,
        } => {
            let group = buy_quantity + get_quantity;
            let pct = to_decimal(*get_discount_percentage) / hundred;
            items
                .iter()
                .map(|item| {
                    let free_units = item.quantity / group * get_quantity;
                    Decimal::from(free_units) * to_decimal(item.unit_price) * pct
                })
                .sum()
        }

        DiscountRule::BulkDiscount { tiers } => items
            .iter()
            .map(|item| {
                let subtotal = to_decimal(item.unit_price) * Decimal::from(item.quantity);
                tiers
                    .iter()
                    .filter(|tier| item.quantity >= tier.min_quantity)
                    .map(|tier| subtotal * to_decimal(tier.discount_percentage) / hundred)
                    .sum::<Decimal>()
            })
            .sum(),

        // Shipping is priced by a separate subsystem
        DiscountRule::FreeShipping => Decimal::ZERO,

        DiscountRule::BundleDiscount {
            bundle_products,
            bundle_discount_type,
            bundle_discount_value,
        } => {
            let complete = bundle_products.iter().all(|bundle| {
                let required = bundle.product.to_string();
                let in_cart: u32 = items
                    .iter()
                    .filter(|item| item.product_id == required)
                    .map(|item| item.quantity)
                    .sum();
                in_cart >= bundle.min_quantity
            });

            if complete {
                match bundle_discount_type {
                    BundleDiscountKind::FixedAmount => to_decimal(*bundle_discount_value),
                    BundleDiscountKind::Percentage => {
                        cart_total * to_decimal(*bundle_discount_value) / hundred
                    }
                }
            } else {
                Decimal::ZERO
            }
        }
    };

    amount.max(Decimal::ZERO)
}

/// Total amount a discount yields against a cart, clamped to [0, cart_total]
///
/// Gates on scope, validity and order conditions; rules are evaluated
/// independently and summed. Returns zero when any gate fails.
pub fn discount_amount(
    discount: &Discount,
    items: &[PricingItem],
    cart_total: Decimal,
    now: DateTime<Utc>,
) -> Decimal {
    if !matcher::applies_to(discount, items) {
        return Decimal::ZERO;
    }
    if !matcher::is_valid_at(discount, now) {
        return Decimal::ZERO;
    }
    if !matcher::meets_order_conditions(discount, items, super::money::to_f64(cart_total)) {
        return Decimal::ZERO;
    }

    let total: Decimal = discount
        .rules
        .iter()
        .map(|rule| evaluate_rule(rule, items, cart_total))
        .sum();

    clamp_amount(total, cart_total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{BulkTier, BundleProduct};
    use crate::pricing::testutil::{make_discount, make_item};
    use surrealdb::RecordId;

    fn item(product: &str, price: f64, quantity: u32) -> PricingItem {
        make_item(product, &[], price, quantity)
    }

    fn dec(value: f64) -> Decimal {
        to_decimal(value)
    }

    #[test]
    fn test_percentage_rule() {
        let rule = DiscountRule::Percentage { value: 20.0 };
        let amount = evaluate_rule(&rule, &[item("a", 100.0, 1)], dec(100.0));
        assert_eq!(amount, dec(20.0));
    }

    #[test]
    fn test_fixed_amount_rule() {
        let rule = DiscountRule::FixedAmount { value: 15.0 };
        let amount = evaluate_rule(&rule, &[item("a", 100.0, 1)], dec(100.0));
        assert_eq!(amount, dec(15.0));
    }

    #[test]
    fn test_buy_x_get_y_worked_example() {
        // quantity=5, buy 2 get 1, unit price 10:
        // free = floor(5/3) * 1 = 1 -> discount = 10
        let rule = DiscountRule::BuyXGetY {
            buy_quantity: 2,
            get_quantity: 1,
            get_discount_percentage: 100.0,
        };
        let amount = evaluate_rule(&rule, &[item("a", 10.0, 5)], dec(50.0));
        assert_eq!(amount, dec(10.0));
    }

    #[test]
    fn test_buy_x_get_y_partial_percentage() {
        // Half-price free units: 1 free unit at 50% of 10 = 5
        let rule = DiscountRule::BuyXGetY {
            buy_quantity: 2,
            get_quantity: 1,
            get_discount_percentage: 50.0,
        };
        let amount = evaluate_rule(&rule, &[item("a", 10.0, 5)], dec(50.0));
        assert_eq!(amount, dec(5.0));
    }

    #[test]
    fn test_buy_x_get_y_below_threshold() {
        let rule = DiscountRule::BuyXGetY {
            buy_quantity: 2,
            get_quantity: 1,
            get_discount_percentage: 100.0,
        };
        let amount = evaluate_rule(&rule, &[item("a", 10.0, 2)], dec(20.0));
        assert_eq!(amount, Decimal::ZERO);
    }

    #[test]
    fn test_bulk_tiers_accumulate() {
        // Both tiers match at quantity 10: (5+10)% of 100 = 15
        let rule = DiscountRule::BulkDiscount {
            tiers: vec![
                BulkTier {
                    min_quantity: 5,
                    discount_percentage: 5.0,
                },
                BulkTier {
                    min_quantity: 10,
                    discount_percentage: 10.0,
                },
            ],
        };
        let amount = evaluate_rule(&rule, &[item("a", 10.0, 10)], dec(100.0));
        assert_eq!(amount, dec(15.0));
    }

    #[test]
    fn test_bulk_tier_not_reached() {
        let rule = DiscountRule::BulkDiscount {
            tiers: vec![BulkTier {
                min_quantity: 5,
                discount_percentage: 5.0,
            }],
        };
        let amount = evaluate_rule(&rule, &[item("a", 10.0, 4)], dec(40.0));
        assert_eq!(amount, Decimal::ZERO);
    }

    #[test]
    fn test_free_shipping_contributes_zero() {
        let amount = evaluate_rule(&DiscountRule::FreeShipping, &[item("a", 10.0, 1)], dec(10.0));
        assert_eq!(amount, Decimal::ZERO);
    }

    #[test]
    fn test_bundle_requires_all_products_at_min_quantity() {
        let rule = DiscountRule::BundleDiscount {
            bundle_products: vec![
                BundleProduct {
                    product: RecordId::from_table_key("product", "a"),
                    min_quantity: 1,
                },
                BundleProduct {
                    product: RecordId::from_table_key("product", "b"),
                    min_quantity: 2,
                },
            ],
            bundle_discount_type: BundleDiscountKind::FixedAmount,
            bundle_discount_value: 25.0,
        };

        // b present but below its minimum quantity
        let incomplete = [item("a", 10.0, 1), item("b", 10.0, 1)];
        assert_eq!(evaluate_rule(&rule, &incomplete, dec(20.0)), Decimal::ZERO);

        let complete = [item("a", 10.0, 1), item("b", 10.0, 2)];
        assert_eq!(evaluate_rule(&rule, &complete, dec(30.0)), dec(25.0));
    }

    #[test]
    fn test_bundle_percentage_of_cart_total() {
        let rule = DiscountRule::BundleDiscount {
            bundle_products: vec![BundleProduct {
                product: RecordId::from_table_key("product", "a"),
                min_quantity: 1,
            }],
            bundle_discount_type: BundleDiscountKind::Percentage,
            bundle_discount_value: 10.0,
        };
        let amount = evaluate_rule(&rule, &[item("a", 10.0, 1)], dec(200.0));
        assert_eq!(amount, dec(20.0));
    }

    #[test]
    fn test_discount_amount_sums_rules_and_clamps() {
        let mut discount = make_discount();
        discount.rules = vec![
            DiscountRule::Percentage { value: 80.0 },
            DiscountRule::FixedAmount { value: 50.0 },
        ];

        // 80 + 50 = 130, clamped to the cart total of 100
        let items = [item("a", 100.0, 1)];
        let amount = discount_amount(&discount, &items, dec(100.0), Utc::now());
        assert_eq!(amount, dec(100.0));
    }

    #[test]
    fn test_discount_amount_zero_when_window_closed() {
        let mut discount = make_discount();
        discount.end_date = Utc::now() - chrono::Duration::hours(1);

        let items = [item("a", 100.0, 1)];
        let amount = discount_amount(&discount, &items, dec(100.0), Utc::now());
        assert_eq!(amount, Decimal::ZERO);
    }

    #[test]
    fn test_discount_amount_respects_minimum_order() {
        let mut discount = make_discount();
        discount.minimum_order_amount = 500.0;

        let items = [item("a", 100.0, 1)];
        let amount = discount_amount(&discount, &items, dec(100.0), Utc::now());
        assert_eq!(amount, Decimal::ZERO);
    }

    #[test]
    fn test_random_rule_mixes_stay_in_bounds() {
        // Property: 0 <= amount <= cart_total for arbitrary rule combinations
        use rand::{Rng, SeedableRng, rngs::StdRng};
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let mut discount = make_discount();
            discount.rules = (0..rng.gen_range(1..5))
                .map(|_| match rng.gen_range(0..4) {
                    0 => DiscountRule::Percentage {
                        value: rng.gen_range(0.0..100.0),
                    },
                    1 => DiscountRule::FixedAmount {
                        value: rng.gen_range(0.0..500.0),
                    },
                    2 => DiscountRule::BuyXGetY {
                        buy_quantity: rng.gen_range(1..5),
                        get_quantity: rng.gen_range(1..3),
                        get_discount_percentage: rng.gen_range(0.0..100.0),
                    },
                    _ => DiscountRule::BulkDiscount {
                        tiers: vec![BulkTier {
                            min_quantity: rng.gen_range(1..10),
                            discount_percentage: rng.gen_range(0.0..100.0),
                        }],
                    },
                })
                .collect();

            let items: Vec<PricingItem> = (0..rng.gen_range(1..4))
                .map(|i| {
                    item(
                        &format!("p{i}"),
                        rng.gen_range(1.0..200.0),
                        rng.gen_range(1..10),
                    )
                })
                .collect();
            let cart_total: Decimal = items.iter().map(|i| to_decimal(i.subtotal())).sum();

            let amount = discount_amount(&discount, &items, cart_total, Utc::now());
            assert!(amount >= Decimal::ZERO);
            assert!(amount <= cart_total);
        }
    }
}
