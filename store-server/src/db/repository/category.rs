//! Category Repository

use super::{BaseRepository, RepoError, RepoResult, full_id, make_record, strip_table_prefix};
use crate::db::models::category::slugify;
use crate::db::models::{Category, CategoryCreate, CategoryUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active categories ordered by sort_order
    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM category WHERE is_active = true ORDER BY sort_order")
            .await?
            .take(0)?;
        Ok(categories)
    }

    /// Find category by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let category: Option<Category> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(category)
    }

    /// Find category by name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        let name_owned = name.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM category WHERE name = $name LIMIT 1")
            .bind(("name", name_owned))
            .await?;
        let categories: Vec<Category> = result.take(0)?;
        Ok(categories.into_iter().next())
    }

    /// Create a new category
    pub async fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        // Check duplicate name
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Category '{}' already exists",
                data.name
            )));
        }

        // Resolve parent and derive level
        let (parent, level) = match data.parent.as_deref() {
            Some(parent_id) => {
                let parent = self
                    .find_by_id(parent_id)
                    .await?
                    .ok_or_else(|| RepoError::NotFound(format!("Category {parent_id} not found")))?;
                (parent.id, parent.level + 1)
            }
            None => (None, 0),
        };

        let category = Category {
            id: None,
            slug: slugify(&data.name),
            name: data.name,
            description: data.description,
            parent,
            level,
            sort_order: data.sort_order.unwrap_or(0),
            is_active: true,
        };

        let created: Option<Category> = self.base.db().create(TABLE).content(category).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }

    /// Update a category
    pub async fn update(&self, id: &str, data: CategoryUpdate) -> RepoResult<Category> {
        let pure_id = strip_table_prefix(TABLE, id);
        let existing = self
            .find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Category {} not found", id)))?;

        // Check duplicate name if changing
        if let Some(ref new_name) = data.name
            && new_name != &existing.name
            && self.find_by_name(new_name).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Category '{}' already exists",
                new_name
            )));
        }

        // A category cannot be its own parent
        if let Some(ref parent) = data.parent
            && strip_table_prefix(TABLE, &parent.to_string()) == pure_id
        {
            return Err(RepoError::Validation(
                "Category cannot be its own parent".to_string(),
            ));
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
            .ok_or_else(|| RepoError::NotFound(format!("Category {} not found", id)))
    }

    /// Hard delete a category
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let pure_id = strip_table_prefix(TABLE, id);

        // Check if category has products (links are stored in string form)
        let cat_ref = full_id(TABLE, pure_id);
        let mut result = self
            .base
            .db()
            .query(
                "SELECT count() FROM product WHERE category = $cat AND is_active = true GROUP ALL",
            )
            .bind(("cat", cat_ref.clone()))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;

        if count.unwrap_or(0) > 0 {
            return Err(RepoError::Validation(
                "Cannot delete category with active products".to_string(),
            ));
        }

        // Check if category has children
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM category WHERE parent = $cat GROUP ALL")
            .bind(("cat", cat_ref))
            .await?;
        let children: Option<i64> = result.take((0, "count"))?;

        if children.unwrap_or(0) > 0 {
            return Err(RepoError::Validation(
                "Cannot delete category with child categories".to_string(),
            ));
        }

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", make_record(TABLE, pure_id)))
            .await?;

        Ok(true)
    }
}
