//! Coupon API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/coupons", routes())
}

fn routes() -> Router<ServerState> {
    // Any authenticated customer can redeem a code against their own cart
    let apply_route = Router::new().route("/apply", post(handler::apply));

    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/analytics", get(handler::analytics))
        .layer(middleware::from_fn(require_permission("coupons:read")));

    let write_routes = Router::new()
        .route("/", post(handler::create))
        .route(
            "/{id}",
            axum::routing::put(handler::update).delete(handler::delete),
        )
        .layer(middleware::from_fn(require_permission("coupons:write")));

    apply_route.merge(read_routes).merge(write_routes)
}
