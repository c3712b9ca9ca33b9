//! Store Server - e-commerce storefront backend
//!
//! # Architecture
//!
//! - **Pricing engine** (`pricing`): discount/pricing resolution - scope
//!   matching with category ancestry, rule evaluation, exclusive/combinable
//!   selection, coupon validation with guarded redemption
//! - **Database** (`db`): embedded SurrealDB models and repositories
//! - **Auth** (`auth`): JWT + Argon2, role capability table
//! - **HTTP API** (`api`): per-resource axum routers
//!
//! # Module layout
//!
//! ```text
//! store-server/src/
//! ├── core/          # config, state, server assembly
//! ├── auth/          # JWT, permissions, middleware
//! ├── db/            # models + repositories
//! ├── pricing/       # the discount/pricing engine
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, logging, currency display
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod pricing;
pub mod utils;

// Re-export public types
pub use crate::auth::{CurrentUser, JwtService};
pub use crate::core::{Config, Server, ServerState};
pub use crate::pricing::{CouponEngine, PricingEngine};
pub use crate::utils::{AppError, AppResult};

// Re-export logger functions
pub use crate::utils::logger::{init_logger, init_logger_with_file};

/// Security event logging with tracing format specifiers
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Initialize logging from the loaded configuration
pub fn setup_environment(config: &Config) {
    let log_dir = config.log_dir();
    init_logger_with_file(Some(&config.log_level), log_dir.to_str());
}
