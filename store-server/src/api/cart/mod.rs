//! Cart API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get_cart).delete(handler::clear))
        .route(
            "/items",
            post(handler::add_item)
                .put(handler::update_item)
                .delete(handler::remove_item),
        )
        .route("/price", post(handler::price))
        .layer(middleware::from_fn(require_permission("cart:use")))
}
