//! Coupon Repository
//!
//! Redemption runs as a single guarded transaction so that the
//! read-validate-increment sequence cannot race: two concurrent redemptions
//! against the same coupon are serialized by the store, and the guards
//! re-check the limits inside the transaction.

use super::{BaseRepository, RepoError, RepoResult, full_id, make_record, strip_table_prefix};
use crate::db::models::{Coupon, CouponCreate, CouponUpdate};
use chrono::{DateTime, Utc};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "coupon";

#[derive(Clone)]
pub struct CouponRepository {
    base: BaseRepository,
}

impl CouponRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all coupons
    pub async fn find_all(&self) -> RepoResult<Vec<Coupon>> {
        let coupons: Vec<Coupon> = self
            .base
            .db()
            .query("SELECT * FROM coupon ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(coupons)
    }

    /// Find coupon by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Coupon>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let coupon: Option<Coupon> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(coupon)
    }

    /// Find an active coupon by code (case-insensitive, stored uppercase)
    pub async fn find_active_by_code(&self, code: &str) -> RepoResult<Option<Coupon>> {
        let code_owned = code.trim().to_uppercase();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM coupon WHERE code = $code AND is_active = true LIMIT 1")
            .bind(("code", code_owned))
            .await?;
        let coupons: Vec<Coupon> = result.take(0)?;
        Ok(coupons.into_iter().next())
    }

    /// Create a new coupon
    pub async fn create(
        &self,
        data: CouponCreate,
        created_by: Option<RecordId>,
    ) -> RepoResult<Coupon> {
        if data.end_date <= data.start_date {
            return Err(RepoError::Validation(
                "End date must be after start date".to_string(),
            ));
        }

        let code = data.code.trim().to_uppercase();
        if self.find_by_code_any(&code).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Coupon '{}' already exists",
                code
            )));
        }

        let coupon = Coupon {
            id: None,
            code,
            description: data.description,
            kind: data.kind,
            value: data.value,
            minimum_amount: data.minimum_amount.unwrap_or(0.0),
            maximum_amount: data.maximum_amount,
            usage_limit: data.usage_limit,
            usage_count: 0,
            user_limit: data.user_limit.unwrap_or(1),
            used_by: Vec::new(),
            start_date: data.start_date,
            end_date: data.end_date,
            is_active: true,
            created_by,
            created_at: Utc::now(),
        };

        let created: Option<Coupon> = self.base.db().create(TABLE).content(coupon).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create coupon".to_string()))
    }

    /// Update a coupon
    pub async fn update(&self, id: &str, data: CouponUpdate) -> RepoResult<Coupon> {
        let pure_id = strip_table_prefix(TABLE, id);
        let existing = self
            .find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Coupon {} not found", id)))?;

        let start = data.start_date.unwrap_or(existing.start_date);
        let end = data.end_date.unwrap_or(existing.end_date);
        if end <= start {
            return Err(RepoError::Validation(
                "End date must be after start date".to_string(),
            ));
        }

        let thing = make_record(TABLE, pure_id);
        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", thing))
            .bind(("data", data))
            .await?;

        self.find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Coupon {} not found", id)))
    }

    /// Hard delete a coupon
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let pure_id = strip_table_prefix(TABLE, id);
        let thing = make_record(TABLE, pure_id);
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Record a redemption: increment usage_count and the caller's used_by
    /// entry in one guarded transaction.
    ///
    /// The guards re-check the global usage limit and the per-user limit
    /// inside the transaction, so a plain load-modify-save race cannot push
    /// usage past either limit. Of two concurrent redemptions at
    /// user_limit=1, exactly one commits; the other fails with
    /// [`RepoError::Limit`].
    pub async fn redeem(
        &self,
        id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<Coupon> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        // Links are stored in string form, so the per-user guard compares
        // against the full "user:key" string
        let user = full_id("user", user_id);
        let result = self
            .base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                LET $c = array::first(SELECT * FROM type::thing("coupon", $cid));
                IF $c == NONE { THROW "coupon_not_found" };
                IF $c.usage_limit != NONE AND $c.usage_count >= $c.usage_limit {
                    THROW "usage_limit_exhausted"
                };
                LET $entry = array::first(array::filter($c.used_by, |$u| $u.user == $user));
                IF $entry != NONE AND $entry.used_count >= $c.user_limit {
                    THROW "user_limit_exhausted"
                };
                LET $others = array::filter($c.used_by, |$u| $u.user != $user);
                LET $count = IF $entry == NONE { 1 } ELSE { $entry.used_count + 1 };
                UPDATE type::thing("coupon", $cid) SET
                    usage_count += 1,
                    used_by = array::append($others, {
                        user: $user,
                        used_count: $count,
                        last_used: $now
                    });
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("cid", pure_id.clone()))
            .bind(("user", user))
            .bind(("now", now))
            .await
            // Statement-level errors (the THROW guards) surface on check()
            .and_then(|response| response.check());

        match result {
            Ok(_) => self
                .find_by_id(&pure_id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Coupon {} not found", id))),
            Err(e) => {
                let message = e.to_string();
                if message.contains("coupon_not_found") {
                    Err(RepoError::NotFound(format!("Coupon {} not found", id)))
                } else if message.contains("usage_limit_exhausted")
                    || message.contains("user_limit_exhausted")
                {
                    Err(RepoError::Limit("Coupon usage limit reached".to_string()))
                } else {
                    Err(RepoError::Database(message))
                }
            }
        }
    }

    /// Code lookup without the is_active filter (for duplicate checks)
    async fn find_by_code_any(&self, code: &str) -> RepoResult<Option<Coupon>> {
        let code_owned = code.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM coupon WHERE code = $code LIMIT 1")
            .bind(("code", code_owned))
            .await?;
        let coupons: Vec<Coupon> = result.take(0)?;
        Ok(coupons.into_iter().next())
    }
}
