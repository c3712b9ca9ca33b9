//! Authentication and Authorization
//!
//! JWT access tokens, the role capability table, and the axum middleware
//! that enforces both.

mod extractor;
pub mod jwt;
mod middleware;
pub mod permissions;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_permission};
pub use permissions::permissions_for;
