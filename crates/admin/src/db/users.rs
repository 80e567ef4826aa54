//! Read-mostly access to customer accounts from the back office.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use slick_core::{Email, UserId};

use super::RepositoryError;

/// An account with the fields needed to sign an admin in.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub user_id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub password_hash: String,
}

/// An account as found by email or age.
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    id: i32,
    email: String,
    full_name: Option<String>,
    password_hash: String,
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i32,
    email: String,
    full_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            user_id: UserId::new(row.id),
            email: row.email,
            full_name: row.full_name,
            created_at: row.created_at,
        }
    }
}

pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored email is invalid.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn credentials(
        &self,
        email: &Email,
    ) -> Result<Option<AccountCredentials>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r"
            SELECT u.id, u.email, p.full_name, u.password_hash
            FROM users u
            LEFT JOIN profiles p ON p.id = u.id
            WHERE u.email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| {
            let email = Email::parse(&row.email).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email for user {}: {e}", row.id))
            })?;
            Ok(AccountCredentials {
                user_id: UserId::new(row.id),
                email,
                full_name: row.full_name,
                password_hash: row.password_hash,
            })
        })
        .transpose()
    }

    /// Find an account through its profile email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn find_by_profile_email(
        &self,
        email: &Email,
    ) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT u.id, p.email, p.full_name, u.created_at
            FROM profiles p
            JOIN users u ON u.id = p.id
            WHERE lower(p.email) = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    /// The first account ever registered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn oldest(&self) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT u.id, u.email, p.full_name, u.created_at
            FROM users u
            LEFT JOIN profiles p ON p.id = u.id
            ORDER BY u.created_at, u.id
            LIMIT 1
            ",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    /// Create an account and its profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    #[instrument(skip(self, password_hash))]
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        full_name: Option<&str>,
    ) -> Result<Account, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, NULL::text AS full_name, created_at
            ",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "email already exists"))?;

        sqlx::query("INSERT INTO profiles (id, email, full_name) VALUES ($1, $2, $3)")
            .bind(row.id)
            .bind(email)
            .bind(full_name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Account {
            full_name: full_name.map(str::to_owned),
            ..Account::from(row)
        })
    }
}
