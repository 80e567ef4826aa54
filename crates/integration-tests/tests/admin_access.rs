//! Back-office access rules and cache invalidation across admin modules.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use slick_admin::cache::{AdminCache, keys};
use slick_admin::models::CurrentAdmin;
use slick_admin::services::ImageStore;
use slick_admin::services::admin_users::may_grant;
use slick_core::{
    AdminGrant, AdminPermissions, AdminRole, AdminUserId, Email, Permission, UserId,
};

fn admin(id: i32, role: AdminRole, is_active: bool) -> CurrentAdmin {
    CurrentAdmin {
        id: AdminUserId::new(id),
        user_id: UserId::new(100 + id),
        email: Email::parse(&format!("staff{id}@slick.ph")).unwrap(),
        full_name: None,
        grant: AdminGrant {
            role,
            permissions: AdminPermissions::for_role(role),
            is_active,
        },
    }
}

// =============================================================================
// Permissions
// =============================================================================

#[test]
fn test_role_defaults_through_session() {
    let stored = serde_json::to_value(admin(1, AdminRole::Moderator, true)).unwrap();
    let moderator: CurrentAdmin = serde_json::from_value(stored).unwrap();

    assert!(moderator.can(Permission::Products));
    assert!(moderator.can(Permission::Orders));
    assert!(!moderator.can(Permission::Users));
    assert!(!moderator.can(Permission::Analytics));
}

#[test]
fn test_admin_role_manages_users() {
    let staff = admin(2, AdminRole::Admin, true);
    assert!(staff.can(Permission::Users));
    assert!(staff.can(Permission::Analytics));
    assert!(!staff.is_super_admin());
}

#[test]
fn test_deactivated_admin_loses_everything() {
    let owner = admin(3, AdminRole::SuperAdmin, false);
    assert!(!owner.can(Permission::Products));
    assert!(!owner.is_super_admin());
}

#[test]
fn test_hand_edited_permissions_are_honoured() {
    let permissions: AdminPermissions =
        serde_json::from_value(json!({"products": true, "orders": false, "legacy": true}))
            .unwrap();
    let grant = AdminGrant {
        role: AdminRole::Moderator,
        permissions,
        is_active: true,
    };

    assert!(grant.has_permission(Permission::Products));
    assert!(!grant.has_permission(Permission::Orders));
}

// =============================================================================
// Grants
// =============================================================================

#[test]
fn test_grant_matrix() {
    let owner = admin(1, AdminRole::SuperAdmin, true);
    let staff = admin(2, AdminRole::Admin, true);

    for role in [AdminRole::Admin, AdminRole::Moderator] {
        assert!(may_grant(Some(&owner), role));
        assert!(may_grant(Some(&staff), role));
        assert!(may_grant(None, role));
    }
    assert!(may_grant(Some(&owner), AdminRole::SuperAdmin));
    assert!(!may_grant(Some(&staff), AdminRole::SuperAdmin));
    assert!(may_grant(None, AdminRole::SuperAdmin));
}

// =============================================================================
// Cache
// =============================================================================

async fn warm(cache: &AdminCache) {
    for id in [1, 2] {
        let admin_id = AdminUserId::new(id);
        cache
            .set(keys::products(admin_id), json!([]), Duration::from_secs(30))
            .await;
        cache
            .set(keys::dashboard(admin_id), json!({}), Duration::from_secs(60))
            .await;
    }
    cache
        .set(keys::ORDERS, json!([]), Duration::from_secs(30))
        .await;
}

#[tokio::test]
async fn test_product_change_clears_every_admins_views() {
    let cache = AdminCache::new();
    warm(&cache).await;

    cache.invalidate_catalog().await;

    for id in [1, 2] {
        let admin_id = AdminUserId::new(id);
        assert!(cache.get(&keys::products(admin_id)).await.is_none());
        assert!(cache.get(&keys::dashboard(admin_id)).await.is_none());
    }
    assert!(cache.get(keys::ORDERS).await.is_some());
}

#[tokio::test]
async fn test_order_change_keeps_product_lists() {
    let cache = AdminCache::new();
    warm(&cache).await;

    cache.invalidate_orders().await;

    assert!(cache.get(keys::ORDERS).await.is_none());
    assert!(cache.get(&keys::dashboard(AdminUserId::new(1))).await.is_none());
    assert!(cache.get(&keys::products(AdminUserId::new(1))).await.is_some());
}

#[tokio::test]
async fn test_toggle_clears_only_that_admin() {
    let cache = AdminCache::new();
    warm(&cache).await;

    cache.invalidate_admin(AdminUserId::new(2)).await;

    assert!(cache.get(&keys::products(AdminUserId::new(2))).await.is_none());
    assert!(cache.get(&keys::products(AdminUserId::new(1))).await.is_some());
    assert!(cache.get(keys::ORDERS).await.is_some());
}

#[tokio::test]
async fn test_expired_entry_is_a_miss() {
    let cache = AdminCache::new();
    cache
        .set(keys::ORDERS, json!([1]), Duration::from_millis(20))
        .await;
    assert!(cache.get(keys::ORDERS).await.is_some());

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(cache.get(keys::ORDERS).await.is_none());
}

// =============================================================================
// Uploads
// =============================================================================

#[tokio::test]
async fn test_uploads_get_distinct_paths() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImageStore::new(dir.path(), "http://localhost:3001/media");

    let first = store
        .save_product_image(Some("a.png"), Some("image/png"), b"first")
        .await
        .unwrap();
    let second = store
        .save_product_image(Some("a.png"), Some("image/png"), b"second")
        .await
        .unwrap();

    assert_ne!(first.path, second.path);
    assert_eq!(
        tokio::fs::read(dir.path().join(&second.path)).await.unwrap(),
        b"second"
    );
}
