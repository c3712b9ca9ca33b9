//! Role capability table
//!
//! Permissions are a pure lookup from role name, resolved at every
//! authorization check. Nothing is stored per user record, so changing this
//! table takes effect immediately for existing accounts.

/// Capabilities granted to a role.
///
/// The admin role is special-cased in [`super::CurrentUser::is_admin`] and
/// holds every permission; it is listed here only for completeness.
pub fn permissions_for(role: &str) -> &'static [&'static str] {
    match role {
        "admin" => &["all"],
        "seller" => &["products:*", "categories:read", "pricing:read"],
        "customer" => &["products:read", "categories:read", "pricing:read", "cart:use"],
        "support" => &["products:read", "coupons:read", "pricing:read"],
        "marketing" => &["discounts:*", "coupons:*", "products:read", "categories:read"],
        "finance" => &["coupons:read", "discounts:read", "pricing:read"],
        // Unknown roles get the customer baseline
        _ => &["products:read", "categories:read", "pricing:read", "cart:use"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marketing_manages_promotions() {
        let granted = permissions_for("marketing");
        assert!(granted.contains(&"discounts:*"));
        assert!(granted.contains(&"coupons:*"));
    }

    #[test]
    fn test_unknown_role_gets_customer_baseline() {
        assert_eq!(permissions_for("delivery"), permissions_for("customer"));
    }
}
