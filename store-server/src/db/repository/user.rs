//! User Repository

use super::{BaseRepository, RepoError, RepoResult, full_id, make_record, strip_table_prefix};
use crate::db::models::{Role, User};
use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let user: Option<User> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(user)
    }

    /// Find user by email (stored lowercase)
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.trim().to_lowercase();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user with an already-hashed password
    pub async fn create(
        &self,
        name: String,
        email: String,
        password_hash: String,
        role: Role,
    ) -> RepoResult<User> {
        let email = email.trim().to_lowercase();
        if self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let user = User {
            id: None,
            name,
            email,
            password_hash,
            role,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        };

        let created: Option<User> = self.base.db().create(TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Stamp a successful login
    pub async fn touch_last_login(&self, id: &str) -> RepoResult<()> {
        let thing = make_record(TABLE, strip_table_prefix(TABLE, id));
        self.base
            .db()
            .query("UPDATE $thing SET last_login = $now")
            .bind(("thing", thing))
            .bind(("now", Utc::now()))
            .await?;
        Ok(())
    }

    /// Whether this user has ever redeemed a coupon or placed a cart
    ///
    /// Used as the "first-time customer" hint when the caller does not
    /// supply one.
    pub async fn is_first_time_customer(&self, id: &str) -> RepoResult<bool> {
        let user = full_id(TABLE, id);
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM coupon WHERE used_by.user CONTAINS $user GROUP ALL")
            .bind(("user", user))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0) == 0)
    }
}
