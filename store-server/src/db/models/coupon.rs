//! Coupon Model
//!
//! A coupon is the simpler, always code-activated single-rule analogue of a
//! discount. Independent model, not a rule variant.

use super::discount::UsageEntry;
use super::serde_helpers;
use super::serde_record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type CouponId = RecordId;

/// Coupon value interpretation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    Percentage,
    Fixed,
}

/// Coupon entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    #[serde(default, with = "serde_record::option", skip_serializing_if = "Option::is_none")]
    pub id: Option<CouponId>,
    /// Unique, case-insensitive; stored uppercase
    pub code: String,
    pub description: Option<String>,
    pub kind: CouponKind,
    pub value: f64,
    /// Cart totals below this amount get no discount
    #[serde(default)]
    pub minimum_amount: f64,
    /// Cap on the computed amount for percentage coupons
    pub maximum_amount: Option<f64>,
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub usage_count: u32,
    /// Per-user redemption limit
    #[serde(default = "default_one")]
    pub user_limit: u32,
    #[serde(default)]
    pub used_by: Vec<UsageEntry>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    #[serde(default, with = "serde_record::option")]
    pub created_by: Option<RecordId>,
    pub created_at: DateTime<Utc>,
}

fn default_one() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Coupon {
    /// Currently redeemable: active, inside the window, global limit not
    /// exhausted
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active || self.start_date > now || self.end_date < now {
            return false;
        }
        match self.usage_limit {
            Some(limit) => self.usage_count < limit,
            None => true,
        }
    }

    /// Whether this user still has redemptions left
    pub fn can_user_use(&self, user_id: &str) -> bool {
        match self
            .used_by
            .iter()
            .find(|entry| entry.user.to_string() == user_id)
        {
            Some(entry) => entry.used_count < self.user_limit,
            None => true,
        }
    }
}

/// Create coupon payload
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CouponCreate {
    #[validate(length(min = 3, max = 20))]
    pub code: String,
    pub description: Option<String>,
    pub kind: CouponKind,
    #[validate(range(min = 0.0))]
    pub value: f64,
    #[validate(range(min = 0.0))]
    pub minimum_amount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub maximum_amount: Option<f64>,
    #[validate(range(min = 1))]
    pub usage_limit: Option<u32>,
    #[validate(range(min = 1))]
    pub user_limit: Option<u32>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Update coupon payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<CouponKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_coupon() -> Coupon {
        let now = Utc::now();
        Coupon {
            id: None,
            code: "SAVE10".to_string(),
            description: None,
            kind: CouponKind::Percentage,
            value: 10.0,
            minimum_amount: 0.0,
            maximum_amount: None,
            usage_limit: Some(2),
            usage_count: 0,
            user_limit: 1,
            used_by: Vec::new(),
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            is_active: true,
            created_by: None,
            created_at: now,
        }
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let mut coupon = make_coupon();
        assert!(coupon.is_valid_at(now));

        coupon.end_date = now - Duration::hours(1);
        assert!(!coupon.is_valid_at(now));
    }

    #[test]
    fn test_global_usage_limit() {
        let now = Utc::now();
        let mut coupon = make_coupon();
        coupon.usage_count = 2;
        assert!(!coupon.is_valid_at(now));

        coupon.usage_limit = None;
        assert!(coupon.is_valid_at(now));
    }

    #[test]
    fn test_per_user_limit() {
        let mut coupon = make_coupon();
        assert!(coupon.can_user_use("user:alice"));

        coupon.used_by.push(UsageEntry {
            user: RecordId::from_table_key("user", "alice"),
            used_count: 1,
            last_used: Some(Utc::now()),
        });
        assert!(!coupon.can_user_use("user:alice"));
        assert!(coupon.can_user_use("user:bob"));
    }
}
