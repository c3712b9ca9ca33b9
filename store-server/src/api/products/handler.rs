//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::ProductRepository;
use crate::pricing::PricingBreakdown;
use crate::utils::{AppError, AppResult};

/// GET /api/products - list active products
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_all().await?;
    Ok(Json(products))
}

/// GET /api/products/by-category/:category_id - products in a category
pub async fn list_by_category(
    State(state): State<ServerState>,
    Path(category_id): Path<String>,
) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_by_category(&category_id).await?;
    Ok(Json(products))
}

/// GET /api/products/:id - fetch one product
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;
    Ok(Json(product))
}

/// GET /api/products/:id/pricing - storefront pricing breakdown
///
/// Anonymous quoting: active automatic discounts only, no per-user gates,
/// no counter mutation.
pub async fn pricing(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<PricingBreakdown>> {
    let breakdown = state.pricing.quote_product(&id, None).await?;
    Ok(Json(breakdown))
}

/// POST /api/products - create product
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(payload).await?;
    Ok(Json(product))
}

/// PUT /api/products/:id - update product
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.update(&id, payload).await?;
    Ok(Json(product))
}

/// DELETE /api/products/:id - delete product
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = ProductRepository::new(state.db.clone());
    let result = repo.delete(&id).await?;
    Ok(Json(result))
}
