//! Coupon redemption against the guarded update

mod common;

use chrono::{Duration, Utc};
use common::test_db;
use store_server::db::models::{CouponCreate, coupon::CouponKind};
use store_server::db::repository::{CouponRepository, RepoError};
use store_server::pricing::{CouponEngine, PricingItem};
use store_server::utils::AppError;

fn coupon_payload(code: &str) -> CouponCreate {
    let now = Utc::now();
    CouponCreate {
        code: code.to_string(),
        description: None,
        kind: CouponKind::Fixed,
        value: 15.0,
        minimum_amount: Some(50.0),
        maximum_amount: None,
        usage_limit: Some(10),
        user_limit: Some(1),
        start_date: now - Duration::days(1),
        end_date: now + Duration::days(1),
    }
}

fn one_item() -> Vec<PricingItem> {
    vec![PricingItem {
        product_id: "product:widget".to_string(),
        category_path: Vec::new(),
        unit_price: 60.0,
        quantity: 1,
    }]
}

#[tokio::test]
async fn code_lookup_is_case_insensitive() {
    let db = test_db().await;
    let repo = CouponRepository::new(db.clone());
    repo.create(coupon_payload("save15"), None).await.unwrap();

    let found = repo.find_active_by_code("  Save15 ").await.unwrap();
    assert_eq!(found.unwrap().code, "SAVE15");
}

#[tokio::test]
async fn apply_computes_amount_and_records_usage() {
    let db = test_db().await;
    let repo = CouponRepository::new(db.clone());
    repo.create(coupon_payload("SAVE15"), None).await.unwrap();

    let engine = CouponEngine::new(db.clone());
    let application = engine
        .apply("save15", "user:alice", &one_item(), 60.0)
        .await
        .unwrap();

    assert_eq!(application.discount_amount, 15.0);
    assert_eq!(application.final_total, 45.0);

    let coupon = repo.find_active_by_code("SAVE15").await.unwrap().unwrap();
    assert_eq!(coupon.usage_count, 1);
    assert_eq!(coupon.used_by.len(), 1);
    assert_eq!(coupon.used_by[0].used_count, 1);
    assert!(coupon.used_by[0].last_used.is_some());
}

#[tokio::test]
async fn below_minimum_is_rejected_with_no_counter_movement() {
    let db = test_db().await;
    let repo = CouponRepository::new(db.clone());
    repo.create(coupon_payload("SAVE15"), None).await.unwrap();

    let engine = CouponEngine::new(db.clone());
    // fixed value 15, minimum 50, cart total 40: rejected, not applied
    let err = engine
        .apply("SAVE15", "user:alice", &one_item(), 40.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let coupon = repo.find_active_by_code("SAVE15").await.unwrap().unwrap();
    assert_eq!(coupon.usage_count, 0);
    assert!(coupon.used_by.is_empty());
}

#[tokio::test]
async fn second_redemption_at_user_limit_one_fails() {
    let db = test_db().await;
    let repo = CouponRepository::new(db.clone());
    repo.create(coupon_payload("SAVE15"), None).await.unwrap();

    let engine = CouponEngine::new(db.clone());
    engine
        .apply("SAVE15", "user:alice", &one_item(), 60.0)
        .await
        .unwrap();

    let err = engine
        .apply("SAVE15", "user:alice", &one_item(), 60.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LimitExceeded(_)));

    // Exactly one redemption recorded
    let coupon = repo.find_active_by_code("SAVE15").await.unwrap().unwrap();
    assert_eq!(coupon.usage_count, 1);
    assert_eq!(coupon.used_by[0].used_count, 1);

    // A different user is unaffected
    engine
        .apply("SAVE15", "user:bob", &one_item(), 60.0)
        .await
        .unwrap();
}

#[tokio::test]
async fn concurrent_duplicate_redemptions_commit_exactly_once() {
    let db = test_db().await;
    let repo = CouponRepository::new(db.clone());
    let created = repo.create(coupon_payload("SAVE15"), None).await.unwrap();
    let coupon_id = created.id.as_ref().unwrap().to_string();

    // Drive the guarded update directly from two tasks; the transaction
    // serializes them and the in-transaction guard fails the loser
    let repo_a = CouponRepository::new(db.clone());
    let repo_b = CouponRepository::new(db.clone());
    let id_a = coupon_id.clone();
    let id_b = coupon_id.clone();
    let (first, second) = tokio::join!(
        tokio::spawn(async move { repo_a.redeem(&id_a, "user:alice", Utc::now()).await }),
        tokio::spawn(async move { repo_b.redeem(&id_b, "user:alice", Utc::now()).await }),
    );

    let results = [first.unwrap(), second.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();

    // Exactly one commits; the loser is stopped by the in-transaction guard
    // (or by a write conflict, depending on interleaving) - never both
    assert_eq!(successes, 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(RepoError::Limit(_)) | Err(RepoError::Database(_))))
    );

    let coupon = repo.find_by_id(&coupon_id).await.unwrap().unwrap();
    assert_eq!(coupon.usage_count, 1);
    assert_eq!(coupon.used_by.len(), 1);
    assert_eq!(coupon.used_by[0].used_count, 1);
}

#[tokio::test]
async fn global_usage_limit_exhausts() {
    let db = test_db().await;
    let repo = CouponRepository::new(db.clone());
    let mut payload = coupon_payload("SAVE15");
    payload.usage_limit = Some(2);
    payload.user_limit = Some(5);
    repo.create(payload, None).await.unwrap();

    let engine = CouponEngine::new(db);
    engine
        .apply("SAVE15", "user:alice", &one_item(), 60.0)
        .await
        .unwrap();
    engine
        .apply("SAVE15", "user:alice", &one_item(), 60.0)
        .await
        .unwrap();

    let err = engine
        .apply("SAVE15", "user:alice", &one_item(), 60.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LimitExceeded(_)));
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let db = test_db().await;
    let engine = CouponEngine::new(db);
    let err = engine
        .apply("NOPE", "user:alice", &one_item(), 60.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
