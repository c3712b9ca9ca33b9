//! Discount Repository

use super::{BaseRepository, RepoError, RepoResult, make_record, strip_table_prefix};
use crate::db::models::{Discount, DiscountCreate, DiscountRule, DiscountUpdate};
use chrono::Utc;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "discount";

#[derive(Clone)]
pub struct DiscountRepository {
    base: BaseRepository,
}

impl DiscountRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all discounts ordered by priority
    pub async fn find_all(&self) -> RepoResult<Vec<Discount>> {
        let discounts: Vec<Discount> = self
            .base
            .db()
            .query("SELECT * FROM discount ORDER BY priority DESC")
            .await?
            .take(0)?;
        Ok(discounts)
    }

    /// Find active automatic discounts, highest priority first
    ///
    /// Time-window and per-user eligibility are checked by the selector on
    /// the fetched rows; the query narrows only on flags.
    pub async fn find_active_automatic(&self) -> RepoResult<Vec<Discount>> {
        let discounts: Vec<Discount> = self
            .base
            .db()
            .query("SELECT * FROM discount WHERE is_active = true AND is_automatic = true ORDER BY priority DESC")
            .await?
            .take(0)?;
        Ok(discounts)
    }

    /// Find active code-activated discounts matching a code
    pub async fn find_active_by_code(&self, code: &str) -> RepoResult<Vec<Discount>> {
        let code_owned = code.trim().to_uppercase();
        let discounts: Vec<Discount> = self
            .base
            .db()
            .query("SELECT * FROM discount WHERE is_active = true AND code = $code ORDER BY priority DESC")
            .bind(("code", code_owned))
            .await?
            .take(0)?;
        Ok(discounts)
    }

    /// Find active discounts flagged for storefront display
    pub async fn find_storefront(&self) -> RepoResult<Vec<Discount>> {
        let discounts: Vec<Discount> = self
            .base
            .db()
            .query("SELECT * FROM discount WHERE is_active = true AND is_automatic = true AND show_on_storefront = true ORDER BY priority DESC")
            .await?
            .take(0)?;
        Ok(discounts)
    }

    /// Find discount by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Discount>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let discount: Option<Discount> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(discount)
    }

    /// Create a new discount
    ///
    /// Rule payloads and the time window are validated here, at
    /// construction - a malformed rule never reaches the evaluator.
    pub async fn create(
        &self,
        data: DiscountCreate,
        created_by: Option<RecordId>,
    ) -> RepoResult<Discount> {
        validate_rules(&data.rules)?;
        if data.end_date <= data.start_date {
            return Err(RepoError::Validation(
                "End date must be after start date".to_string(),
            ));
        }
        if let Some(tr) = &data.time_restrictions {
            validate_time_restrictions(tr)?;
        }

        let discount = Discount {
            id: None,
            name: data.name,
            description: data.description,
            code: data.code.map(|c| c.trim().to_uppercase()),
            rules: data.rules,
            applicable_products: to_records("product", &data.applicable_products),
            applicable_categories: to_records("category", &data.applicable_categories),
            exclude_products: to_records("product", &data.exclude_products),
            exclude_categories: to_records("category", &data.exclude_categories),
            minimum_order_amount: data.minimum_order_amount.unwrap_or(0.0),
            maximum_order_amount: data.maximum_order_amount,
            minimum_quantity: data.minimum_quantity.unwrap_or(0),
            first_time_customers_only: data.first_time_customers_only.unwrap_or(false),
            usage_limit: data.usage_limit,
            usage_count: 0,
            usage_limit_per_customer: data.usage_limit_per_customer.unwrap_or(1),
            used_by: Vec::new(),
            start_date: data.start_date,
            end_date: data.end_date,
            time_restrictions: data.time_restrictions,
            can_combine_with_other_discounts: data
                .can_combine_with_other_discounts
                .unwrap_or(false),
            can_combine_with_coupons: data.can_combine_with_coupons.unwrap_or(true),
            priority: data.priority.unwrap_or(0),
            is_active: true,
            is_automatic: data.is_automatic.unwrap_or(true),
            show_on_storefront: data.show_on_storefront.unwrap_or(false),
            total_savings: 0.0,
            created_by,
            created_at: Utc::now(),
        };

        let created: Option<Discount> = self.base.db().create(TABLE).content(discount).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create discount".to_string()))
    }

    /// Update a discount
    pub async fn update(&self, id: &str, mut data: DiscountUpdate) -> RepoResult<Discount> {
        let pure_id = strip_table_prefix(TABLE, id);
        let existing = self
            .find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Discount {} not found", id)))?;

        if let Some(ref rules) = data.rules {
            validate_rules(rules)?;
        }
        if let Some(tr) = &data.time_restrictions {
            validate_time_restrictions(tr)?;
        }

        // Window stays ordered even when only one edge changes
        let start = data.start_date.unwrap_or(existing.start_date);
        let end = data.end_date.unwrap_or(existing.end_date);
        if end <= start {
            return Err(RepoError::Validation(
                "End date must be after start date".to_string(),
            ));
        }

        if let Some(ref code) = data.code {
            data.code = Some(code.trim().to_uppercase());
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
            .ok_or_else(|| RepoError::NotFound(format!("Discount {} not found", id)))
    }

    /// Hard delete a discount
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
}

fn to_records(table: &str, ids: &[String]) -> Vec<RecordId> {
    ids.iter().map(|id| make_record(table, id)).collect()
}

fn validate_rules(rules: &[DiscountRule]) -> RepoResult<()> {
    if rules.is_empty() {
        return Err(RepoError::Validation(
            "Discount requires at least one rule".to_string(),
        ));
    }
    for rule in rules {
        rule.validate().map_err(RepoError::Validation)?;
    }
    Ok(())
}

fn validate_time_restrictions(
    tr: &crate::db::models::TimeRestrictions,
) -> RepoResult<()> {
    if let Some(days) = &tr.days_of_week
        && days.iter().any(|d| *d > 6)
    {
        return Err(RepoError::Validation(
            "Days of week must be 0 (Sunday) through 6 (Saturday)".to_string(),
        ));
    }
    for time in [tr.start_time.as_deref(), tr.end_time.as_deref()]
        .into_iter()
        .flatten()
    {
        if chrono::NaiveTime::parse_from_str(time, "%H:%M").is_err() {
            return Err(RepoError::Validation(format!(
                "Time format must be HH:MM, got '{time}'"
            )));
        }
    }
    Ok(())
}
