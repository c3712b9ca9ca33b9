//! Cart Repository
//!
//! One cart per user; totals are recomputed by the model before every save.

use super::{BaseRepository, RepoError, RepoResult, full_id, make_record, strip_table_prefix};
use crate::db::models::Cart;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "cart";

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

impl CartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find the cart owned by a user
    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Option<Cart>> {
        let user = full_id("user", user_id);
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cart WHERE user = $user LIMIT 1")
            .bind(("user", user))
            .await?;
        let carts: Vec<Cart> = result.take(0)?;
        Ok(carts.into_iter().next())
    }

    /// Find the user's cart, creating an empty one if none exists
    pub async fn find_or_create(&self, user_id: &str) -> RepoResult<Cart> {
        if let Some(cart) = self.find_by_user(user_id).await? {
            return Ok(cart);
        }
        let cart = Cart::new(make_record("user", user_id));
        let created: Option<Cart> = self.base.db().create(TABLE).content(cart).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create cart".to_string()))
    }

    /// Persist a cart after mutation
    ///
    /// The caller must have run [`Cart::recompute_totals`]; totals are never
    /// accepted from the outside.
    pub async fn save(&self, mut cart: Cart) -> RepoResult<Cart> {
        // The id is the update target, not content - the id field is
        // immutable on the record itself
        let id = cart
            .id
            .take()
            .ok_or_else(|| RepoError::Validation("Cart has no id".to_string()))?;
        let key = record_key(&id);
        let updated: Option<Cart> = self
            .base
            .db()
            .update((TABLE, key.as_str()))
            .content(cart)
            .await?;
        updated.ok_or_else(|| RepoError::Database("Failed to save cart".to_string()))
    }

    /// Remove a user's cart entirely
    pub async fn delete_for_user(&self, user_id: &str) -> RepoResult<bool> {
        let user = full_id("user", user_id);
        self.base
            .db()
            .query("DELETE cart WHERE user = $user")
            .bind(("user", user))
            .await?;
        Ok(true)
    }

    /// Find cart by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Cart>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let cart: Option<Cart> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(cart)
    }
}

fn record_key(id: &RecordId) -> String {
    let raw = id.to_string();
    strip_table_prefix(TABLE, &raw).to_string()
}
