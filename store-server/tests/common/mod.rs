//! Shared test setup: in-memory database with schema applied
#![allow(dead_code)]

use chrono::{Duration, Utc};
use store_server::db::models::{DiscountCreate, DiscountRule};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

pub async fn test_db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.expect("open in-memory db");
    db.use_ns("store").use_db("store").await.expect("select ns");
    store_server::db::define_schema(&db).await.expect("schema");
    db
}

/// A minimal wildcard-scope discount payload, one week wide around now
pub fn discount_payload(name: &str, rules: Vec<DiscountRule>) -> DiscountCreate {
    let now = Utc::now();
    DiscountCreate {
        name: name.to_string(),
        description: None,
        code: None,
        rules,
        applicable_products: Vec::new(),
        applicable_categories: Vec::new(),
        exclude_products: Vec::new(),
        exclude_categories: Vec::new(),
        minimum_order_amount: None,
        maximum_order_amount: None,
        minimum_quantity: None,
        first_time_customers_only: None,
        usage_limit: None,
        usage_limit_per_customer: None,
        start_date: now - Duration::days(3),
        end_date: now + Duration::days(4),
        time_restrictions: None,
        can_combine_with_other_discounts: Some(true),
        can_combine_with_coupons: None,
        priority: None,
        is_automatic: None,
        show_on_storefront: None,
    }
}
