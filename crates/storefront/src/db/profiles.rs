//! Profile repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use slick_core::UserId;

use super::RepositoryError;
use crate::models::Profile;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i32,
    email: String,
    full_name: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: UserId::new(row.id),
            email: row.email,
            full_name: row.full_name,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields a customer may change on their profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate<'a> {
    pub full_name: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
}

pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT id, email, full_name, avatar_url, created_at, updated_at
            FROM profiles
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    /// Insert or update the profile for `id`, bumping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    #[instrument(skip(self, update))]
    pub async fn upsert(
        &self,
        id: UserId,
        email: &str,
        update: ProfileUpdate<'_>,
    ) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            INSERT INTO profiles (id, email, full_name, avatar_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email,
                full_name = EXCLUDED.full_name,
                avatar_url = EXCLUDED.avatar_url,
                updated_at = now()
            RETURNING id, email, full_name, avatar_url, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(email)
        .bind(update.full_name)
        .bind(update.avatar_url)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}
