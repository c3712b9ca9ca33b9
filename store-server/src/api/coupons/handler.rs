//! Coupon API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Coupon, CouponCreate, CouponUpdate};
use crate::db::repository::{CartRepository, CouponRepository, make_record};
use crate::pricing::CouponApplication;
use crate::utils::{AppError, AppResult};

/// GET /api/coupons - all coupons
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Coupon>>> {
    let repo = CouponRepository::new(state.db.clone());
    let coupons = repo.find_all().await?;
    Ok(Json(coupons))
}

/// GET /api/coupons/:id - fetch one coupon
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Coupon>> {
    let repo = CouponRepository::new(state.db.clone());
    let coupon = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Coupon {} not found", id)))?;
    Ok(Json(coupon))
}

/// POST /api/coupons - create coupon
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CouponCreate>,
) -> AppResult<Json<Coupon>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let repo = CouponRepository::new(state.db.clone());
    let coupon = repo
        .create(payload, Some(make_record("user", &user.id)))
        .await?;
    Ok(Json(coupon))
}

/// PUT /api/coupons/:id - update coupon
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CouponUpdate>,
) -> AppResult<Json<Coupon>> {
    let repo = CouponRepository::new(state.db.clone());
    let coupon = repo.update(&id, payload).await?;
    Ok(Json(coupon))
}

/// DELETE /api/coupons/:id - delete coupon
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = CouponRepository::new(state.db.clone());
    let result = repo.delete(&id).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub coupon_code: String,
}

/// POST /api/coupons/apply - validate and redeem a code against the
/// caller's cart
///
/// Cart items and total come from the server-side cart, never from the
/// request. On success the coupon's usage counters have been incremented
/// atomically; any rejection leaves them untouched.
pub async fn apply(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ApplyCouponRequest>,
) -> AppResult<Json<CouponApplication>> {
    let carts = CartRepository::new(state.db.clone());
    let cart = carts
        .find_by_user(&user.id)
        .await?
        .ok_or_else(|| AppError::validation("Cart must contain at least one item"))?;

    let items = state.pricing.build_items(&cart).await?;
    let application = state
        .coupons
        .apply(&payload.coupon_code, &user.id, &items, cart.total_amount)
        .await?;

    Ok(Json(application))
}

#[derive(Debug, Serialize)]
pub struct TopUser {
    pub user_id: String,
    pub used_count: u32,
    pub last_used: Option<chrono::DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CouponAnalytics {
    pub coupon_id: String,
    pub code: String,
    pub total_usage: u32,
    pub unique_users: usize,
    /// Percentage of the global limit consumed; None when unlimited
    pub usage_rate: Option<f64>,
    pub remaining_uses: Option<u32>,
    pub top_users: Vec<TopUser>,
    pub is_active: bool,
    pub is_expired: bool,
}

/// GET /api/coupons/:id/analytics - usage statistics
pub async fn analytics(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<CouponAnalytics>> {
    let repo = CouponRepository::new(state.db.clone());
    let coupon = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Coupon {} not found", id)))?;

    let mut top_users: Vec<TopUser> = coupon
        .used_by
        .iter()
        .map(|entry| TopUser {
            user_id: entry.user.to_string(),
            used_count: entry.used_count,
            last_used: entry.last_used,
        })
        .collect();
    top_users.sort_by(|a, b| b.used_count.cmp(&a.used_count));
    top_users.truncate(10);

    Ok(Json(CouponAnalytics {
        coupon_id: coupon.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        code: coupon.code.clone(),
        total_usage: coupon.usage_count,
        unique_users: coupon.used_by.len(),
        usage_rate: coupon
            .usage_limit
            .map(|limit| coupon.usage_count as f64 / limit as f64 * 100.0),
        remaining_uses: coupon
            .usage_limit
            .map(|limit| limit.saturating_sub(coupon.usage_count)),
        top_users,
        is_active: coupon.is_active,
        is_expired: coupon.end_date < Utc::now(),
    }))
}
