//! Product Model

use super::serde_helpers;
use super::serde_record;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type ProductId = RecordId;

/// Product model
///
/// `price` is the actual sale price before discounts; `compare_price`, when
/// set, is the list price ("MRP") used as the reference for savings display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_record::option", skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub compare_price: Option<f64>,
    pub sku: Option<String>,
    /// Record link to category
    #[serde(with = "serde_record")]
    pub category: RecordId,
    pub brand: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub in_stock: bool,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_featured: bool,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Product {
    pub fn new(name: String, price: f64, category: RecordId) -> Self {
        Self {
            id: None,
            name,
            description: String::new(),
            price,
            compare_price: None,
            sku: None,
            category,
            brand: None,
            tags: Vec::new(),
            in_stock: true,
            is_featured: false,
            sort_order: 0,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0.0))]
    pub compare_price: Option<f64>,
    pub sku: Option<String>,
    /// Category id as string (e.g., "category:xxx")
    pub category: String,
    pub brand: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub in_stock: Option<bool>,
    pub is_featured: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, with = "serde_record::option", skip_serializing_if = "Option::is_none")]
    pub category: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
