//! Admin user listing type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use slick_core::{AdminGrant, AdminPermissions, AdminRole, AdminUserId, UserId};

/// An `admin_users` row joined with the account's profile.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub user_id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub role: AdminRole,
    pub permissions: AdminPermissions,
    pub is_active: bool,
    pub created_by: Option<AdminUserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminUser {
    #[must_use]
    pub fn grant(&self) -> AdminGrant {
        AdminGrant {
            role: self.role,
            permissions: self.permissions.clone(),
            is_active: self.is_active,
        }
    }
}
