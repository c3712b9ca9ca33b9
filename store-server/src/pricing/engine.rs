//! Pricing Engine
//!
//! I/O orchestration for the pure pricing core: fetches products, resolves
//! category ancestry, loads candidate discounts, then delegates to the
//! selector. All store access happens here, before the computation; a store
//! failure aborts the call with no partial result.

use super::hierarchy::CategoryResolver;
use super::{CartPricing, PricingBreakdown, PricingItem, UserContext, selector};
use crate::db::models::{Cart, Discount, Product};
use crate::db::repository::{CategoryRepository, DiscountRepository, ProductRepository};
use crate::utils::{AppError, AppResult};
use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct PricingEngine {
    products: ProductRepository,
    discounts: DiscountRepository,
    resolver: CategoryResolver,
}

impl PricingEngine {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            discounts: DiscountRepository::new(db.clone()),
            resolver: CategoryResolver::new(CategoryRepository::new(db)),
        }
    }

    /// Quote a single product for storefront display.
    ///
    /// Loads active automatic discounts; anonymous callers skip per-user
    /// eligibility. Never mutates usage counters.
    pub async fn quote_product(
        &self,
        product_id: &str,
        user: Option<&UserContext>,
    ) -> AppResult<PricingBreakdown> {
        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {product_id}")))?;

        let category_path = self.category_path_for(&product).await?;
        let discounts = self.discounts.find_active_automatic().await?;

        selector::price_product(&product, &category_path, &discounts, user, Utc::now())
    }

    /// Quote a whole cart.
    ///
    /// Candidates are active automatic discounts plus, when `code` is
    /// given, active code-activated discounts matching it.
    pub async fn quote_cart(
        &self,
        cart: &Cart,
        user: Option<&UserContext>,
        code: Option<&str>,
    ) -> AppResult<CartPricing> {
        if cart.items.is_empty() {
            return Err(AppError::validation("Cart must contain at least one item"));
        }

        let items = self.build_items(cart).await?;
        let discounts = self.load_candidates(code).await?;

        selector::price_cart(&items, &discounts, user, Utc::now())
    }

    /// Flatten cart lines into pricing items with resolved category paths
    pub async fn build_items(&self, cart: &Cart) -> AppResult<Vec<PricingItem>> {
        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let product_id = line.product.to_string();
            let category_path = match self.products.find_by_id(&product_id).await? {
                Some(product) => self.category_path_for(&product).await?,
                // The product vanished since it was carted; the snapshot
                // price still participates, just without category scope
                None => Vec::new(),
            };
            items.push(PricingItem {
                product_id,
                category_path,
                unit_price: line.price,
                quantity: line.quantity,
            });
        }
        Ok(items)
    }

    async fn load_candidates(&self, code: Option<&str>) -> AppResult<Vec<Discount>> {
        let mut discounts = self.discounts.find_active_automatic().await?;
        if let Some(code) = code {
            discounts.extend(self.discounts.find_active_by_code(code).await?);
        }
        Ok(discounts)
    }

    async fn category_path_for(&self, product: &Product) -> AppResult<Vec<String>> {
        self.resolver
            .category_path(&product.category.to_string())
            .await
    }
}
