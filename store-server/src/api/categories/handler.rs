//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{Category, CategoryCreate, CategoryUpdate};
use crate::db::repository::CategoryRepository;
use crate::pricing::CategoryResolver;
use crate::utils::{AppError, AppResult};

/// GET /api/categories - list active categories
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let repo = CategoryRepository::new(state.db.clone());
    let categories = repo.find_all().await?;
    Ok(Json(categories))
}

/// GET /api/categories/:id - fetch one category
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Category>> {
    let repo = CategoryRepository::new(state.db.clone());
    let category = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Category {}", id)))?;
    Ok(Json(category))
}

/// GET /api/categories/:id/ancestors - ordered ancestor chain, nearest
/// parent first
pub async fn ancestors(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<String>>> {
    let resolver = CategoryResolver::new(CategoryRepository::new(state.db.clone()));
    let chain = resolver.ancestors(&id).await?;
    Ok(Json(chain))
}

/// POST /api/categories - create category
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.create(payload).await?;
    Ok(Json(category))
}

/// PUT /api/categories/:id - update category
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.update(&id, payload).await?;
    Ok(Json(category))
}

/// DELETE /api/categories/:id - delete category
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = CategoryRepository::new(state.db.clone());
    let result = repo.delete(&id).await?;
    Ok(Json(result))
}
