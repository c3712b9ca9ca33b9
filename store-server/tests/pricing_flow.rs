//! End-to-end pricing flow against a seeded in-memory store

mod common;

use common::{discount_payload, test_db};
use store_server::db::models::{CategoryCreate, CategoryUpdate, DiscountRule, ProductCreate};
use store_server::db::repository::{CategoryRepository, DiscountRepository, ProductRepository};
use store_server::pricing::{CategoryResolver, PricingEngine};
use store_server::utils::AppError;

fn product_payload(name: &str, price: f64, category: &str) -> ProductCreate {
    ProductCreate {
        name: name.to_string(),
        description: None,
        price,
        compare_price: None,
        sku: None,
        category: category.to_string(),
        brand: None,
        tags: Vec::new(),
        in_stock: None,
        is_featured: None,
        sort_order: None,
    }
}

#[tokio::test]
async fn ancestor_chain_resolves_nearest_first() {
    let db = test_db().await;
    let categories = CategoryRepository::new(db.clone());

    let root = categories
        .create(CategoryCreate {
            name: "Electronics".to_string(),
            description: None,
            parent: None,
            sort_order: None,
        })
        .await
        .unwrap();
    let root_id = root.id.as_ref().unwrap().to_string();

    let mid = categories
        .create(CategoryCreate {
            name: "Phones".to_string(),
            description: None,
            parent: Some(root_id.clone()),
            sort_order: None,
        })
        .await
        .unwrap();
    let mid_id = mid.id.as_ref().unwrap().to_string();

    let leaf = categories
        .create(CategoryCreate {
            name: "Smartphones".to_string(),
            description: None,
            parent: Some(mid_id.clone()),
            sort_order: None,
        })
        .await
        .unwrap();
    let leaf_id = leaf.id.as_ref().unwrap().to_string();

    assert_eq!(leaf.level, 2);

    let resolver = CategoryResolver::new(categories);
    let chain = resolver.ancestors(&leaf_id).await.unwrap();
    assert_eq!(chain, vec![mid_id, root_id]);
}

#[tokio::test]
async fn cyclic_parent_chain_fails_instead_of_hanging() {
    let db = test_db().await;
    let categories = CategoryRepository::new(db.clone());

    let a = categories
        .create(CategoryCreate {
            name: "A".to_string(),
            description: None,
            parent: None,
            sort_order: None,
        })
        .await
        .unwrap();
    let a_id = a.id.as_ref().unwrap().to_string();

    let b = categories
        .create(CategoryCreate {
            name: "B".to_string(),
            description: None,
            parent: Some(a_id.clone()),
            sort_order: None,
        })
        .await
        .unwrap();
    let b_id = b.id.as_ref().unwrap().to_string();

    // Corrupt the tree: A's parent becomes B, closing a cycle
    categories
        .update(
            &a_id,
            CategoryUpdate {
                name: None,
                description: None,
                parent: Some(b.id.clone().unwrap()),
                sort_order: None,
                is_active: None,
            },
        )
        .await
        .unwrap();

    let resolver = CategoryResolver::new(categories);
    let err = resolver.ancestors(&b_id).await.unwrap_err();
    assert!(matches!(err, AppError::DataIntegrity(_)));
}

#[tokio::test]
async fn quote_product_applies_category_scoped_discount_via_ancestor() {
    let db = test_db().await;
    let categories = CategoryRepository::new(db.clone());
    let products = ProductRepository::new(db.clone());
    let discounts = DiscountRepository::new(db.clone());

    let root = categories
        .create(CategoryCreate {
            name: "Electronics".to_string(),
            description: None,
            parent: None,
            sort_order: None,
        })
        .await
        .unwrap();
    let root_id = root.id.as_ref().unwrap().to_string();

    let leaf = categories
        .create(CategoryCreate {
            name: "Phones".to_string(),
            description: None,
            parent: Some(root_id.clone()),
            sort_order: None,
        })
        .await
        .unwrap();
    let leaf_id = leaf.id.as_ref().unwrap().to_string();

    let product = products
        .create(product_payload("Handset", 100.0, &leaf_id))
        .await
        .unwrap();
    let product_id = product.id.as_ref().unwrap().to_string();

    // Discount scoped to the ROOT category must reach the leaf product
    let mut payload = discount_payload(
        "Electronics Sale",
        vec![DiscountRule::Percentage { value: 20.0 }],
    );
    payload.applicable_categories = vec![root_id];
    discounts.create(payload, None).await.unwrap();

    let engine = PricingEngine::new(db);
    let breakdown = engine.quote_product(&product_id, None).await.unwrap();

    assert!(breakdown.has_discount);
    assert_eq!(breakdown.discounted_price, 80.0);
    assert_eq!(breakdown.applied_discounts.len(), 1);
    assert_eq!(breakdown.applied_discounts[0].name, "Electronics Sale");
}

#[tokio::test]
async fn excluded_category_blocks_discount_despite_product_inclusion() {
    let db = test_db().await;
    let categories = CategoryRepository::new(db.clone());
    let products = ProductRepository::new(db.clone());
    let discounts = DiscountRepository::new(db.clone());

    let clearance = categories
        .create(CategoryCreate {
            name: "Clearance".to_string(),
            description: None,
            parent: None,
            sort_order: None,
        })
        .await
        .unwrap();
    let clearance_id = clearance.id.as_ref().unwrap().to_string();

    let product = products
        .create(product_payload("Marked Down", 50.0, &clearance_id))
        .await
        .unwrap();
    let product_id = product.id.as_ref().unwrap().to_string();

    let mut payload =
        discount_payload("Targeted", vec![DiscountRule::Percentage { value: 50.0 }]);
    payload.applicable_products = vec![product_id.clone()];
    payload.exclude_categories = vec![clearance_id];
    discounts.create(payload, None).await.unwrap();

    let engine = PricingEngine::new(db);
    let breakdown = engine.quote_product(&product_id, None).await.unwrap();

    // Exclusion wins: full price, no badge
    assert!(!breakdown.has_discount);
    assert_eq!(breakdown.discounted_price, 50.0);
    assert!(breakdown.applied_discounts.is_empty());
}

#[tokio::test]
async fn malformed_rule_rejected_at_construction() {
    let db = test_db().await;
    let discounts = DiscountRepository::new(db);

    let payload = discount_payload(
        "Broken",
        vec![DiscountRule::Percentage { value: 250.0 }],
    );
    let err = discounts.create(payload, None).await.unwrap_err();
    assert!(err.to_string().contains("0..=100"));
}
