//! Category Hierarchy Resolver
//!
//! Walks a category's parent chain to produce its ordered ancestor list,
//! nearest parent first. Chains are recomputed on every lookup so parent
//! reassignment is visible immediately. A malformed cyclic chain fails with
//! a data-integrity error instead of hanging.

use crate::db::repository::CategoryRepository;
use crate::utils::{AppError, AppResult};
use std::collections::HashSet;

/// Upper bound on traversal depth; a deeper chain is treated as malformed
const MAX_DEPTH: usize = 32;

#[derive(Clone)]
pub struct CategoryResolver {
    categories: CategoryRepository,
}

impl CategoryResolver {
    pub fn new(categories: CategoryRepository) -> Self {
        Self { categories }
    }

    /// Ordered ancestor ids for a category, nearest parent first.
    ///
    /// Stops at a root (null parent) or a dangling reference - a partial
    /// chain is returned in the latter case. Repeated ids and chains deeper
    /// than [`MAX_DEPTH`] fail with [`AppError::DataIntegrity`].
    pub async fn ancestors(&self, category_id: &str) -> AppResult<Vec<String>> {
        let mut ancestors = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(normalize(category_id));

        let mut current = match self.categories.find_by_id(category_id).await? {
            Some(category) => category.parent,
            None => return Ok(ancestors),
        };

        while let Some(parent_id) = current {
            let parent_key = parent_id.to_string();
            if !visited.insert(parent_key.clone()) {
                return Err(AppError::data_integrity(format!(
                    "Cyclic category parent chain at {parent_key}"
                )));
            }
            if ancestors.len() >= MAX_DEPTH {
                return Err(AppError::data_integrity(format!(
                    "Category ancestry deeper than {MAX_DEPTH} levels at {parent_key}"
                )));
            }

            ancestors.push(parent_key.clone());
            current = match self.categories.find_by_id(&parent_key).await? {
                Some(category) => category.parent,
                // Dangling parent reference: return the partial chain
                None => None,
            };
        }

        Ok(ancestors)
    }

    /// The category itself plus its ancestors, nearest first
    ///
    /// This is the id set the applicability matcher checks scope against.
    pub async fn category_path(&self, category_id: &str) -> AppResult<Vec<String>> {
        let mut path = vec![normalize(category_id)];
        path.extend(self.ancestors(category_id).await?);
        Ok(path)
    }
}

/// Normalize to the full `category:key` form used for scope comparisons
fn normalize(id: &str) -> String {
    if id.contains(':') {
        id.to_string()
    } else {
        format!("category:{id}")
    }
}
