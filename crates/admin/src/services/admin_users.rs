//! Granting back-office access to existing accounts.

use slick_core::{AdminRole, Email, UserId};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::db::{AdminUserRepository, NewAdminUser, RepositoryError, UserRepository};
use crate::models::{AdminUser, CurrentAdmin};

#[derive(Debug, Error)]
pub enum GrantError {
    #[error("Invalid email address")]
    InvalidEmail(#[from] slick_core::EmailError),

    #[error("User not found with that email address")]
    UserNotFound,

    #[error("User is already an admin")]
    AlreadyAdmin,

    #[error("Only super admins can grant the super_admin role")]
    SuperAdminRequired,

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for GrantError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::AlreadyAdmin,
            other => Self::Repository(other),
        }
    }
}

/// Whether `granted_by` may hand out `role`. `None` is a trusted operator
/// (the CLI) and may grant anything.
#[must_use]
pub fn may_grant(granted_by: Option<&CurrentAdmin>, role: AdminRole) -> bool {
    role != AdminRole::SuperAdmin || granted_by.is_none_or(CurrentAdmin::is_super_admin)
}

pub struct AdminUserService<'a> {
    users: UserRepository<'a>,
    admins: AdminUserRepository<'a>,
}

impl<'a> AdminUserService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            admins: AdminUserRepository::new(pool),
        }
    }

    /// Make the account behind `email` an active admin with the role's
    /// default permissions.
    ///
    /// # Errors
    ///
    /// Returns `GrantError::SuperAdminRequired` if a non-super admin grants
    /// `super_admin`, `GrantError::UserNotFound` if no profile has the email
    /// and `GrantError::AlreadyAdmin` if the account already has a record.
    pub async fn grant(
        &self,
        email: &str,
        role: AdminRole,
        granted_by: Option<&CurrentAdmin>,
    ) -> Result<AdminUser, GrantError> {
        if !may_grant(granted_by, role) {
            return Err(GrantError::SuperAdminRequired);
        }

        let email = Email::parse(email)?;
        let account = self
            .users
            .find_by_profile_email(&email)
            .await?
            .ok_or(GrantError::UserNotFound)?;

        self.grant_user(account.user_id, role, granted_by).await
    }

    /// Make an account an active admin, by account ID.
    ///
    /// # Errors
    ///
    /// Returns `GrantError::SuperAdminRequired` if a non-super admin grants
    /// `super_admin` and `GrantError::AlreadyAdmin` if the account already
    /// has a record.
    pub async fn grant_user(
        &self,
        user_id: UserId,
        role: AdminRole,
        granted_by: Option<&CurrentAdmin>,
    ) -> Result<AdminUser, GrantError> {
        if !may_grant(granted_by, role) {
            return Err(GrantError::SuperAdminRequired);
        }

        if self.admins.get_by_user(user_id).await?.is_some() {
            return Err(GrantError::AlreadyAdmin);
        }

        let created_by = granted_by.map(|admin| admin.id);
        let admin = self
            .admins
            .create(&NewAdminUser::with_defaults(user_id, role, created_by))
            .await?;

        info!(
            admin_id = %admin.id,
            user_id = %admin.user_id,
            role = %admin.role,
            granted_by = ?created_by,
            "Admin access granted"
        );
        Ok(admin)
    }
}
