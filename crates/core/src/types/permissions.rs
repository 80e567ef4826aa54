//! Back-office permission checks.
//!
//! An admin's access is its [`AdminRole`] plus a JSON map of permission
//! names to booleans. `super_admin` bypasses the map; everyone else needs
//! the specific permission or the `all` wildcard set to `true`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::AdminRole;

/// A named back-office capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Products,
    Orders,
    Users,
    Analytics,
    /// Wildcard granting every other permission.
    All,
}

impl Permission {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Users => "users",
            Self::Analytics => "analytics",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission map as stored in `admin_users.permissions`.
///
/// Unknown keys are preserved so hand-edited rows survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminPermissions(BTreeMap<String, bool>);

impl AdminPermissions {
    /// The map granted alongside a role when an admin is added.
    #[must_use]
    pub fn for_role(role: AdminRole) -> Self {
        let granted: &[Permission] = match role {
            AdminRole::SuperAdmin => &[Permission::All],
            AdminRole::Admin => &[
                Permission::Products,
                Permission::Orders,
                Permission::Users,
                Permission::Analytics,
            ],
            AdminRole::Moderator => &[Permission::Products, Permission::Orders],
        };
        granted.iter().copied().collect()
    }

    /// Whether the map itself grants `permission`, ignoring role.
    #[must_use]
    pub fn grants(&self, permission: Permission) -> bool {
        let flag = |p: Permission| self.0.get(p.as_str()).copied().unwrap_or(false);
        flag(permission) || flag(Permission::All)
    }

    pub fn insert(&mut self, permission: Permission, granted: bool) {
        self.0.insert(permission.as_str().to_owned(), granted);
    }
}

impl FromIterator<Permission> for AdminPermissions {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|p| (p.as_str().to_owned(), true))
                .collect(),
        )
    }
}

/// The parts of an `admin_users` row that decide access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminGrant {
    pub role: AdminRole,
    pub permissions: AdminPermissions,
    pub is_active: bool,
}

impl AdminGrant {
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        if !self.is_active {
            return false;
        }
        self.role == AdminRole::SuperAdmin || self.permissions.grants(permission)
    }
}

/// Permission check for a possibly absent admin record.
///
/// Visitors without an `admin_users` row have no permissions at all.
#[must_use]
pub fn has_permission(grant: Option<&AdminGrant>, permission: Permission) -> bool {
    grant.is_some_and(|g| g.has_permission(permission))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grant(role: AdminRole, permissions: AdminPermissions, is_active: bool) -> AdminGrant {
        AdminGrant {
            role,
            permissions,
            is_active,
        }
    }

    #[test]
    fn test_no_admin_record_has_nothing() {
        assert!(!has_permission(None, Permission::Products));
    }

    #[test]
    fn test_inactive_admin_has_nothing() {
        let g = grant(AdminRole::SuperAdmin, AdminPermissions::default(), false);
        assert!(!g.has_permission(Permission::Orders));
    }

    #[test]
    fn test_super_admin_ignores_map() {
        let g = grant(AdminRole::SuperAdmin, AdminPermissions::default(), true);
        assert!(has_permission(Some(&g), Permission::Users));
    }

    #[test]
    fn test_moderator_defaults() {
        let g = grant(
            AdminRole::Moderator,
            AdminPermissions::for_role(AdminRole::Moderator),
            true,
        );
        assert!(g.has_permission(Permission::Products));
        assert!(g.has_permission(Permission::Orders));
        assert!(!g.has_permission(Permission::Users));
        assert!(!g.has_permission(Permission::Analytics));
    }

    #[test]
    fn test_all_wildcard() {
        let mut permissions = AdminPermissions::default();
        permissions.insert(Permission::All, true);
        let g = grant(AdminRole::Admin, permissions, true);
        assert!(g.has_permission(Permission::Users));
    }

    #[test]
    fn test_explicit_false_denies() {
        let mut permissions = AdminPermissions::for_role(AdminRole::Admin);
        permissions.insert(Permission::Users, false);
        let g = grant(AdminRole::Admin, permissions, true);
        assert!(!g.has_permission(Permission::Users));
        assert!(g.has_permission(Permission::Analytics));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(AdminPermissions::for_role(AdminRole::SuperAdmin)).unwrap();
        assert_eq!(json, serde_json::json!({ "all": true }));

        let parsed: AdminPermissions =
            serde_json::from_value(serde_json::json!({ "orders": true, "legacy": true })).unwrap();
        assert!(parsed.grants(Permission::Orders));
        assert!(!parsed.grants(Permission::Products));
    }
}
