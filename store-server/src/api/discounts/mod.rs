//! Discount API Module

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/discounts", routes())
}

fn routes() -> Router<ServerState> {
    // /storefront is a public route (see require_auth); full listings
    // include activation codes and stay behind discounts:read
    let storefront_route = Router::new().route("/storefront", get(handler::storefront));

    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission("discounts:read")));

    let write_routes = Router::new()
        .route("/", axum::routing::post(handler::create))
        .route(
            "/{id}",
            axum::routing::put(handler::update).delete(handler::delete),
        )
        .layer(middleware::from_fn(require_permission("discounts:write")));

    storefront_route.merge(read_routes).merge(write_routes)
}
