//! Category Model

use super::serde_helpers;
use super::serde_record;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type CategoryId = RecordId;

/// Category model
///
/// Categories form a tree through `parent`; the root has `parent = None`.
/// Ancestor chains are recomputed on every lookup, never cached, so a
/// parent reassignment is visible immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, with = "serde_record::option", skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub description: Option<String>,
    /// Parent category link (None for root categories)
    #[serde(default, with = "serde_record::option")]
    pub parent: Option<CategoryId>,
    /// Depth in the tree (0 for roots), maintained on create
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Category {
    pub fn new(name: String) -> Self {
        let slug = slugify(&name);
        Self {
            id: None,
            name,
            slug,
            description: None,
            parent: None,
            level: 0,
            sort_order: 0,
            is_active: true,
        }
    }
}

/// Lowercase, dash-separated slug from a display name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub description: Option<String>,
    /// Parent category id as string (e.g., "category:xxx")
    pub parent: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, with = "serde_record::option", skip_serializing_if = "Option::is_none")]
    pub parent: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Home & Kitchen"), "home-kitchen");
        assert_eq!(slugify("Electronics"), "electronics");
        assert_eq!(slugify("  Spaced  Out  "), "spaced-out");
    }
}
