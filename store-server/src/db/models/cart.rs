//! Cart Model

use super::serde_record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Variant attributes chosen for a cart line
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Variant {
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
}

/// One cart line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(with = "serde_record")]
    pub product: RecordId,
    pub quantity: u32,
    /// Unit price snapshot taken when the item was added
    pub price: f64,
    #[serde(default)]
    pub variant: Variant,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn subtotal(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// Cart entity, one per user
///
/// `total_items` / `total_amount` are denormalized and recomputed on every
/// mutation via [`Cart::recompute_totals`]; they are never set directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default, with = "serde_record::option", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_record")]
    pub user: RecordId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub total_amount: f64,
    pub last_modified: DateTime<Utc>,
}

impl Cart {
    pub fn new(user: RecordId) -> Self {
        Self {
            id: None,
            user,
            items: Vec::new(),
            total_items: 0,
            total_amount: 0.0,
            last_modified: Utc::now(),
        }
    }

    /// Recompute denormalized totals from the item lines
    pub fn recompute_totals(&mut self) {
        self.total_items = self.items.iter().map(|item| item.quantity).sum();
        self.total_amount = self.items.iter().map(CartItem::subtotal).sum();
        self.last_modified = Utc::now();
    }

    /// Find a line matching product + variant
    pub fn find_item_mut(&mut self, product: &RecordId, variant: &Variant) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product == product && &item.variant == variant)
    }
}

/// Add-to-cart payload
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CartItemAdd {
    /// Product id as string (e.g., "product:xxx")
    pub product: String,
    #[validate(range(min = 1))]
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub variant: Variant,
}

fn default_quantity() -> u32 {
    1
}

/// Update-quantity payload
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CartItemUpdate {
    pub product: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[serde(default)]
    pub variant: Variant,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(key: &str, quantity: u32, price: f64) -> CartItem {
        CartItem {
            product: RecordId::from_table_key("product", key),
            quantity,
            price,
            variant: Variant::default(),
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_totals_recomputed_from_lines() {
        let mut cart = Cart::new(RecordId::from_table_key("user", "u1"));
        cart.items.push(item("a", 2, 10.0));
        cart.items.push(item("b", 1, 5.5));
        cart.recompute_totals();

        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.total_amount, 25.5);
    }

    #[test]
    fn test_variant_distinguishes_lines() {
        let mut cart = Cart::new(RecordId::from_table_key("user", "u1"));
        let red = Variant {
            color: Some("red".to_string()),
            ..Default::default()
        };
        cart.items.push(CartItem {
            variant: red.clone(),
            ..item("a", 1, 10.0)
        });

        let product = RecordId::from_table_key("product", "a");
        assert!(cart.find_item_mut(&product, &red).is_some());
        assert!(cart.find_item_mut(&product, &Variant::default()).is_none());
    }
}
