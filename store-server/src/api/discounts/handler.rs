//! Discount API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Discount, DiscountCreate, DiscountUpdate};
use crate::db::repository::{DiscountRepository, make_record};
use crate::utils::{AppError, AppResult};

/// GET /api/discounts - all discounts, highest priority first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Discount>>> {
    let repo = DiscountRepository::new(state.db.clone());
    let discounts = repo.find_all().await?;
    Ok(Json(discounts))
}

/// GET /api/discounts/storefront - active automatic discounts flagged for
/// storefront display
pub async fn storefront(State(state): State<ServerState>) -> AppResult<Json<Vec<Discount>>> {
    let repo = DiscountRepository::new(state.db.clone());
    let discounts = repo.find_storefront().await?;
    Ok(Json(discounts))
}

/// GET /api/discounts/:id - fetch one discount
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Discount>> {
    let repo = DiscountRepository::new(state.db.clone());
    let discount = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Discount {} not found", id)))?;
    Ok(Json(discount))
}

/// POST /api/discounts - create discount
///
/// Rule payloads are validated at construction; a malformed rule is a 400
/// here, never a surprise at pricing time.
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<DiscountCreate>,
) -> AppResult<Json<Discount>> {
    let repo = DiscountRepository::new(state.db.clone());
    let discount = repo
        .create(payload, Some(make_record("user", &user.id)))
        .await?;
    Ok(Json(discount))
}

/// PUT /api/discounts/:id - update discount
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DiscountUpdate>,
) -> AppResult<Json<Discount>> {
    let repo = DiscountRepository::new(state.db.clone());
    let discount = repo.update(&id, payload).await?;
    Ok(Json(discount))
}

/// DELETE /api/discounts/:id - delete discount
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = DiscountRepository::new(state.db.clone());
    let result = repo.delete(&id).await?;
    Ok(Json(result))
}
