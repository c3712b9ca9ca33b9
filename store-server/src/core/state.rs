//! Server State

use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::pricing::{CouponEngine, PricingEngine};

/// Shared server state - cheaply cloneable handles to every service
///
/// | Field | Purpose |
/// |-------|---------|
/// | config | immutable settings |
/// | db | embedded SurrealDB handle |
/// | jwt_service | token generation/validation |
/// | pricing | discount/pricing resolution engine |
/// | coupons | coupon validation/redemption flow |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub pricing: PricingEngine,
    pub coupons: CouponEngine,
}

impl ServerState {
    /// Initialize the state: working directories, database, services
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("store.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        Self::with_db(config.clone(), db_service.db)
    }

    /// Build state around an existing database handle (tests use an
    /// in-memory engine here)
    pub fn with_db(config: Config, db: Surreal<Db>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let pricing = PricingEngine::new(db.clone());
        let coupons = CouponEngine::new(db.clone());

        Self {
            config,
            db,
            jwt_service,
            pricing,
            coupons,
        }
    }
}
