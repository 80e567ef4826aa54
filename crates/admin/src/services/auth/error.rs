//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has no `admin_users` row.
    #[error("account is not an admin")]
    NotAnAdmin,

    /// The admin record has been deactivated.
    #[error("admin account is inactive")]
    Inactive,

    #[error("password validation failed: {0}")]
    WeakPassword(String),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing error")]
    PasswordHash,
}
