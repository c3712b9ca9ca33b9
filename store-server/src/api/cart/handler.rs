//! Cart API Handlers
//!
//! Every mutation goes through [`Cart::recompute_totals`] before saving;
//! totals are never accepted from the client.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Cart, CartItem, CartItemAdd, CartItemUpdate, Variant};
use crate::db::repository::{CartRepository, ProductRepository, UserRepository, make_record};
use crate::pricing::{CartPricing, UserContext};
use crate::utils::{AppError, AppResult};

/// GET /api/cart - the caller's cart (created empty on first access)
pub async fn get_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Cart>> {
    let repo = CartRepository::new(state.db.clone());
    let cart = repo.find_or_create(&user.id).await?;
    Ok(Json(cart))
}

/// POST /api/cart/items - add an item (merges into an existing line with
/// the same product + variant)
pub async fn add_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CartItemAdd>,
) -> AppResult<Json<Cart>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let products = ProductRepository::new(state.db.clone());
    let product = products
        .find_by_id(&payload.product)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::not_found("Product not found or inactive"))?;

    if !product.in_stock {
        return Err(AppError::validation("Product is out of stock"));
    }

    let carts = CartRepository::new(state.db.clone());
    let mut cart = carts.find_or_create(&user.id).await?;

    let product_id = make_record("product", &payload.product);
    match cart.find_item_mut(&product_id, &payload.variant) {
        Some(line) => line.quantity += payload.quantity,
        None => cart.items.push(CartItem {
            product: product_id,
            quantity: payload.quantity,
            // Unit price snapshot at add time
            price: product.price,
            variant: payload.variant,
            added_at: Utc::now(),
        }),
    }

    cart.recompute_totals();
    let saved = carts.save(cart).await?;
    Ok(Json(saved))
}

/// PUT /api/cart/items - set a line's quantity
pub async fn update_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CartItemUpdate>,
) -> AppResult<Json<Cart>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let carts = CartRepository::new(state.db.clone());
    let mut cart = carts
        .find_by_user(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Cart is empty"))?;

    let product_id = make_record("product", &payload.product);
    let line = cart
        .find_item_mut(&product_id, &payload.variant)
        .ok_or_else(|| AppError::not_found("Item not in cart"))?;
    line.quantity = payload.quantity;

    cart.recompute_totals();
    let saved = carts.save(cart).await?;
    Ok(Json(saved))
}

#[derive(Debug, Deserialize)]
pub struct CartItemRemove {
    pub product: String,
    #[serde(default)]
    pub variant: Variant,
}

/// DELETE /api/cart/items - remove a line
pub async fn remove_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CartItemRemove>,
) -> AppResult<Json<Cart>> {
    let carts = CartRepository::new(state.db.clone());
    let mut cart = carts
        .find_by_user(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Cart is empty"))?;

    let product_id = make_record("product", &payload.product);
    let before = cart.items.len();
    cart.items
        .retain(|item| !(item.product == product_id && item.variant == payload.variant));
    if cart.items.len() == before {
        return Err(AppError::not_found("Item not in cart"));
    }

    cart.recompute_totals();
    let saved = carts.save(cart).await?;
    Ok(Json(saved))
}

/// DELETE /api/cart - empty the cart
pub async fn clear(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Cart>> {
    let carts = CartRepository::new(state.db.clone());
    let mut cart = carts.find_or_create(&user.id).await?;
    cart.items.clear();
    cart.recompute_totals();
    let saved = carts.save(cart).await?;
    Ok(Json(saved))
}

#[derive(Debug, Deserialize, Default)]
pub struct PriceCartRequest {
    /// Optional code-activated discount to include in the candidate set
    pub code: Option<String>,
    /// First-time-customer hint; computed from history when absent
    pub is_first_time_customer: Option<bool>,
}

/// POST /api/cart/price - quote the caller's cart
///
/// Pure quoting: no usage counter moves here, that happens only in the
/// coupon apply flow.
pub async fn price(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PriceCartRequest>,
) -> AppResult<Json<CartPricing>> {
    let carts = CartRepository::new(state.db.clone());
    let cart = carts
        .find_by_user(&user.id)
        .await?
        .ok_or_else(|| AppError::validation("Cart must contain at least one item"))?;

    let is_first_time = match payload.is_first_time_customer {
        Some(hint) => hint,
        None => {
            UserRepository::new(state.db.clone())
                .is_first_time_customer(&user.id)
                .await?
        }
    };
    let context = UserContext {
        user_id: make_record("user", &user.id).to_string(),
        is_first_time_customer: is_first_time,
    };

    let pricing = state
        .pricing
        .quote_cart(&cart, Some(&context), payload.code.as_deref())
        .await?;
    Ok(Json(pricing))
}
