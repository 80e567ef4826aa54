//! Admin authentication service.
//!
//! Staff sign in with the same email and password they use on the
//! storefront. A login only succeeds for accounts with an active
//! `admin_users` row; that row is snapshotted into the session.

mod error;

pub use error::AdminAuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use slick_core::Email;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::db::{AdminUserRepository, UserRepository};
use crate::models::CurrentAdmin;

/// Minimum password length, shared with storefront registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub struct AdminAuthService<'a> {
    users: UserRepository<'a>,
    admins: AdminUserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            admins: AdminUserRepository::new(pool),
        }
    }

    /// Verify credentials and load the admin record.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` for an unknown email or a
    /// wrong password, `AdminAuthError::NotAnAdmin` when the account has no
    /// admin record and `AdminAuthError::Inactive` when it is deactivated.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentAdmin, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let account = self
            .users
            .credentials(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;

        let admin = self
            .admins
            .get_by_user(account.user_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %account.user_id, "Login attempt by non-admin account");
                AdminAuthError::NotAnAdmin
            })?;

        if !admin.is_active {
            warn!(admin_id = %admin.id, "Login attempt by inactive admin");
            return Err(AdminAuthError::Inactive);
        }

        info!(admin_id = %admin.id, role = %admin.role, "Admin logged in");

        Ok(CurrentAdmin {
            id: admin.id,
            user_id: account.user_id,
            email: account.email,
            full_name: admin.full_name.clone().or(account.full_name),
            grant: admin.grant(),
        })
    }
}

/// # Errors
///
/// Returns `AdminAuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AdminAuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminAuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with Argon2id and a random salt.
///
/// # Errors
///
/// Returns `AdminAuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AdminAuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AdminAuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_a_hashing_error() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AdminAuthError::PasswordHash)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }
}
