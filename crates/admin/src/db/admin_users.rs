//! `admin_users` repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use slick_core::{AdminPermissions, AdminRole, AdminUserId, UserId};

use super::RepositoryError;
use crate::models::AdminUser;

#[derive(sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    user_id: i32,
    email: String,
    full_name: Option<String>,
    role: AdminRole,
    permissions: Json<AdminPermissions>,
    is_active: bool,
    created_by: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AdminUserRow> for AdminUser {
    fn from(row: AdminUserRow) -> Self {
        Self {
            id: AdminUserId::new(row.id),
            user_id: UserId::new(row.user_id),
            email: row.email,
            full_name: row.full_name,
            role: row.role,
            permissions: row.permissions.0,
            is_active: row.is_active,
            created_by: row.created_by.map(AdminUserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const ADMIN_USER_SELECT: &str = r"
    SELECT a.id, a.user_id, COALESCE(p.email, u.email) AS email, p.full_name,
           a.role, a.permissions, a.is_active, a.created_by, a.created_at, a.updated_at
    FROM admin_users a
    JOIN users u ON u.id = a.user_id
    LEFT JOIN profiles p ON p.id = a.user_id
";

/// A grant to insert.
#[derive(Debug, Clone)]
pub struct NewAdminUser {
    pub user_id: UserId,
    pub role: AdminRole,
    pub permissions: AdminPermissions,
    pub created_by: Option<AdminUserId>,
}

impl NewAdminUser {
    /// An active grant carrying the role's default permissions.
    #[must_use]
    pub fn with_defaults(
        user_id: UserId,
        role: AdminRole,
        created_by: Option<AdminUserId>,
    ) -> Self {
        Self {
            user_id,
            role,
            permissions: AdminPermissions::for_role(role),
            created_by,
        }
    }
}

pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All admins, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminUserRow>(&format!(
            "{ADMIN_USER_SELECT} ORDER BY a.created_at DESC, a.id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(AdminUser::from).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!("{ADMIN_USER_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(AdminUser::from))
    }

    /// The admin record for an account, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "{ADMIN_USER_SELECT} WHERE a.user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(AdminUser::from))
    }

    /// Insert an active admin record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the account is already an admin.
    #[instrument(skip(self, new), fields(user_id = %new.user_id, role = %new.role))]
    pub async fn create(&self, new: &NewAdminUser) -> Result<AdminUser, RepositoryError> {
        let (id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO admin_users (user_id, role, permissions, is_active, created_by)
            VALUES ($1, $2, $3, TRUE, $4)
            RETURNING id
            ",
        )
        .bind(new.user_id)
        .bind(new.role)
        .bind(Json(&new.permissions))
        .bind(new.created_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "User is already an admin"))?;

        self.get(AdminUserId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Flip `is_active`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the admin does not exist.
    #[instrument(skip(self))]
    pub async fn toggle_active(&self, id: AdminUserId) -> Result<AdminUser, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE admin_users
            SET is_active = NOT is_active, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }
}
