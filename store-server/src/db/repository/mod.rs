//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.

// Identity
pub mod user;

// Catalog
pub mod category;
pub mod product;

// Promotions
pub mod coupon;
pub mod discount;

// Cart
pub mod cart;

// Re-exports
pub use cart::CartRepository;
pub use category::CategoryRepository;
pub use coupon::CouponRepository;
pub use discount::DiscountRepository;
pub use product::ProductRepository;
pub use user::UserRepository;

use crate::utils::AppError;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Limit exceeded: {0}")]
    Limit(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Limit(msg) => AppError::LimitExceeded(msg),
            RepoError::Database(msg) => AppError::Database(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Build a RecordId from a table name and an id that may or may not carry
/// the `table:` prefix (API clients send both forms)
pub fn make_record(table: &str, id: &str) -> RecordId {
    let key = id
        .strip_prefix(table)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(id);
    RecordId::from_table_key(table, key)
}

/// Normalize an id to the full `"table:key"` string form.
///
/// Record links are serialized as strings (see `models::serde_record`), so
/// equality comparisons in queries must bind this form; only UPDATE/DELETE
/// targets bind an actual [`RecordId`] via [`make_record`].
pub fn full_id(table: &str, id: &str) -> String {
    make_record(table, id).to_string()
}

/// Strip the `table:` prefix from an id if present
pub fn strip_table_prefix<'a>(table: &str, id: &'a str) -> &'a str {
    id.strip_prefix(table)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(id)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
