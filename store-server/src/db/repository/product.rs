//! Product Repository

use super::{BaseRepository, RepoError, RepoResult, full_id, make_record, strip_table_prefix};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active products ordered by sort_order
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE is_active = true ORDER BY sort_order")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find active products in a category
    pub async fn find_by_category(&self, category_id: &str) -> RepoResult<Vec<Product>> {
        let cat = full_id("category", category_id);
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE category = $cat AND is_active = true ORDER BY sort_order")
            .bind(("cat", cat))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let product: Option<Product> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(product)
    }

    /// Find product by SKU
    pub async fn find_by_sku(&self, sku: &str) -> RepoResult<Option<Product>> {
        let sku_owned = sku.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM product WHERE sku = $sku LIMIT 1")
            .bind(("sku", sku_owned))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if data.price < 0.0 {
            return Err(RepoError::Validation("Price cannot be negative".to_string()));
        }
        if let Some(cp) = data.compare_price
            && cp < 0.0
        {
            return Err(RepoError::Validation(
                "Compare price cannot be negative".to_string(),
            ));
        }

        // Check duplicate SKU
        if let Some(ref sku) = data.sku
            && self.find_by_sku(sku).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!("SKU '{}' already exists", sku)));
        }

        let product = Product {
            id: None,
            name: data.name,
            description: data.description.unwrap_or_default(),
            price: data.price,
            compare_price: data.compare_price,
            sku: data.sku,
            category: make_record("category", &data.category),
            brand: data.brand,
            tags: data.tags,
            in_stock: data.in_stock.unwrap_or(true),
            is_featured: data.is_featured.unwrap_or(false),
            sort_order: data.sort_order.unwrap_or(0),
            is_active: true,
        };

        let created: Option<Product> = self.base.db().create(TABLE).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let pure_id = strip_table_prefix(TABLE, id);
        self.find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;

        if let Some(price) = data.price
            && price < 0.0
        {
            return Err(RepoError::Validation("Price cannot be negative".to_string()));
        }

        let thing = make_record(TABLE, pure_id);
        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", thing))
            .bind(("data", data))
            .await?;

        self.find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let pure_id = strip_table_prefix(TABLE, id);
        let thing = make_record(TABLE, pure_id);
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
