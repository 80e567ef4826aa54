//! Admin user bootstrap commands.
//!
//! These run as a trusted operator: any role may be granted, including
//! `super_admin`, and `created_by` is left empty.

use slick_core::{AdminRole, Email};
use sqlx::PgPool;
use tracing::{info, warn};

use slick_admin::db::{RepositoryError, UserRepository};
use slick_admin::models::AdminUser;
use slick_admin::services::auth::{hash_password, validate_password};
use slick_admin::services::{AdminUserService, GrantError};

use super::CommandError;

fn report(admin: &AdminUser) {
    info!(
        "Admin ready! ID: {}, Email: {}, Role: {}",
        admin.id, admin.email, admin.role
    );
}

/// Skip, rather than fail, when the account is already an admin.
fn already_admin_is_ok(result: Result<AdminUser, GrantError>) -> Result<(), CommandError> {
    match result {
        Ok(admin) => {
            report(&admin);
            Ok(())
        }
        Err(GrantError::AlreadyAdmin) => {
            warn!("User is already an admin; nothing to do");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Promote the account with this profile email.
///
/// # Errors
///
/// Returns `CommandError::Grant` if no account has the email.
pub async fn grant(pool: &PgPool, email: &str, role: AdminRole) -> Result<(), CommandError> {
    info!("Granting {role} to {email}");
    let result = AdminUserService::new(pool).grant(email, role, None).await;
    already_admin_is_ok(result)
}

/// Promote the oldest account.
///
/// # Errors
///
/// Returns `CommandError::Invalid` if there are no accounts yet.
pub async fn grant_first(pool: &PgPool, role: AdminRole) -> Result<(), CommandError> {
    let account = UserRepository::new(pool).oldest().await?.ok_or_else(|| {
        CommandError::Invalid(
            "No users found. Register an account on the storefront first.".to_owned(),
        )
    })?;

    info!("Setting up admin for user: {}", account.email);
    let result = AdminUserService::new(pool)
        .grant_user(account.user_id, role, None)
        .await;
    already_admin_is_ok(result)
}

/// Create an account with a password and make it an admin.
///
/// # Errors
///
/// Returns `CommandError::Invalid` for a malformed email or a taken one,
/// and `CommandError::Auth` for a short password.
pub async fn create(
    pool: &PgPool,
    email: &str,
    password: &str,
    name: Option<&str>,
    role: AdminRole,
) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let account = UserRepository::new(pool)
        .create(&email, &password_hash, name)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                CommandError::Invalid(format!("An account already exists for {email}"))
            }
            other => other.into(),
        })?;
    info!(user_id = %account.user_id, "Account created");

    let admin = AdminUserService::new(pool)
        .grant_user(account.user_id, role, None)
        .await?;
    report(&admin);
    Ok(())
}
