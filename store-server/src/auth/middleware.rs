//! Authentication Middleware
//!
//! Axum middleware for JWT authentication and permission checks.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Require a logged-in user.
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>` and
/// injects [`CurrentUser`] into the request extensions.
///
/// Skipped for:
/// - `OPTIONS *` (CORS preflight)
/// - non-`/api/` paths
/// - public routes: register, login, health, and storefront catalog reads
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public_route(path, req.method()) {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.jwt_service.clone();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// Routes reachable without a token
fn is_public_route(path: &str, method: &http::Method) -> bool {
    if path == "/api/auth/login" || path == "/api/auth/register" || path == "/api/health" {
        return true;
    }
    // Storefront browses the catalog anonymously
    method == http::Method::GET
        && (path.starts_with("/api/products")
            || path.starts_with("/api/categories")
            || path.starts_with("/api/discounts/storefront"))
}

/// Require a specific permission (checked against the role capability table)
///
/// ```ignore
/// Router::new()
///     .route("/api/discounts", post(handler::create))
///     .layer(middleware::from_fn(require_permission("discounts:write")));
/// ```
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id.clone(),
                    role = user.role.clone(),
                    required_permission = permission
                );
                return Err(AppError::forbidden(format!(
                    "Permission denied: {}",
                    permission
                )));
            }

            Ok(next.run(req).await)
        })
    }
}
