//! Session-stored admin identity.

use serde::{Deserialize, Serialize};

use slick_core::{AdminGrant, AdminRole, AdminUserId, Email, Permission, UserId};

/// The admin record captured at login.
///
/// Role and permissions are snapshotted; changes made by another admin take
/// effect at the next login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: AdminUserId,
    pub user_id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    #[serde(flatten)]
    pub grant: AdminGrant,
}

impl CurrentAdmin {
    #[must_use]
    pub fn can(&self, permission: Permission) -> bool {
        self.grant.has_permission(permission)
    }

    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.grant.is_active && self.grant.role == AdminRole::SuperAdmin
    }
}

pub mod keys {
    pub const CURRENT_ADMIN: &str = "current_admin";
}
