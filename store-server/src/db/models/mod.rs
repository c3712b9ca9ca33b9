//! Data Models
//!
//! Serde-mapped SurrealDB records plus typed create/update payloads.

pub mod serde_helpers;
pub mod serde_record;

pub mod cart;
pub mod category;
pub mod coupon;
pub mod discount;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem, CartItemAdd, CartItemUpdate, Variant};
pub use category::{Category, CategoryCreate, CategoryId, CategoryUpdate};
pub use coupon::{Coupon, CouponCreate, CouponId, CouponKind, CouponUpdate};
pub use discount::{
    BulkTier, BundleDiscountKind, BundleProduct, Discount, DiscountCreate, DiscountId,
    DiscountRule, DiscountUpdate, TimeRestrictions, UsageEntry,
};
pub use product::{Product, ProductCreate, ProductId, ProductUpdate};
pub use user::{LoginRequest, Role, User, UserCreate, UserPublic};
