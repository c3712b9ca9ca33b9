//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine) plus schema definitions.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

const NAMESPACE: &str = "store";
const DATABASE: &str = "store";

/// Database service - owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the embedded database and apply schema definitions
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database connection established ({db_path})");
        Ok(Self { db })
    }
}

/// Apply index definitions
///
/// Uniqueness of user emails, coupon codes and category names is enforced
/// by the store so concurrent creates cannot race past the
/// application-level duplicate checks.
pub async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS user_email ON TABLE user COLUMNS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS coupon_code ON TABLE coupon COLUMNS code UNIQUE;
        DEFINE INDEX IF NOT EXISTS category_name ON TABLE category COLUMNS name UNIQUE;
        DEFINE INDEX IF NOT EXISTS cart_user ON TABLE cart COLUMNS user UNIQUE;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;
    Ok(())
}
