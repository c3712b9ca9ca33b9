//! User Model

use super::serde_helpers;
use super::serde_record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// User role enum
///
/// Capabilities are NOT stored on the record; they are resolved from the
/// role at authorization-check time via [`crate::auth::permissions_for`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Seller,
    Customer,
    Support,
    Marketing,
    Finance,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
            Role::Customer => "customer",
            Role::Support => "support",
            Role::Marketing => "marketing",
            Role::Finance => "finance",
        }
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_record::option", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    /// Stored lowercase, unique
    pub email: String,
    /// Argon2 hash, never serialized to API responses
    pub password_hash: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

fn default_role() -> Role {
    Role::Customer
}

fn default_true() -> bool {
    true
}

/// Public view of a user (no credentials)
#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_ref().map(|id| id.to_string()),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct UserCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub role: Option<Role>,
}

/// Login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
