//! Authentication extractors for admin.
//!
//! The session holds the admin captured at login, but every request re-reads
//! the `admin_users` row: a deactivated or deleted admin loses access on
//! their next request and role or permission changes apply immediately.
//! Handlers take [`RequireAdminAuth`] and check a [`Permission`] with
//! [`RequireAdminAuth::require`]; admin management takes
//! [`RequireSuperAdmin`].

use axum::{extract::FromRequestParts, http::request::Parts};
use slick_core::Permission;
use tower_sessions::Session;
use tracing::{Span, warn};

use crate::db::AdminUserRepository;
use crate::error::AppError;
use crate::models::{AdminUser, CurrentAdmin, session_keys};
use crate::state::AppState;

/// Extractor for a signed-in, still active admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(admin: RequireAdminAuth) -> Result<Json<Vec<Order>>> {
///     admin.require(Permission::Orders)?;
///     // ...
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

impl RequireAdminAuth {
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if the admin lacks `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.0.can(permission) {
            Ok(())
        } else {
            warn!(admin_id = %self.0.id, %permission, "Permission denied");
            Err(AppError::Forbidden(format!(
                "You do not have the {permission} permission"
            )))
        }
    }
}

fn signed_out() -> AppError {
    AppError::Unauthorized("Please sign in to continue".to_owned())
}

/// The session and the admin stored in it at login.
async fn session_snapshot(parts: &Parts) -> Result<(Session, CurrentAdmin), AppError> {
    let session = parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::Internal("session layer is not installed".to_owned()))?;

    let snapshot = session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?
        .ok_or_else(signed_out)?;

    Ok((session, snapshot))
}

/// The session admin with role, permissions and name taken from the current
/// `admin_users` row. `None` when the row is gone or deactivated.
fn refresh(snapshot: &CurrentAdmin, row: Option<AdminUser>) -> Option<CurrentAdmin> {
    let row = row.filter(|row| row.is_active)?;
    let grant = row.grant();
    Some(CurrentAdmin {
        id: snapshot.id,
        user_id: snapshot.user_id,
        email: snapshot.email.clone(),
        full_name: row.full_name.or_else(|| snapshot.full_name.clone()),
        grant,
    })
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (session, snapshot) = session_snapshot(parts).await?;
        let row = AdminUserRepository::new(state.pool()).get(snapshot.id).await?;

        let Some(admin) = refresh(&snapshot, row) else {
            warn!(admin_id = %snapshot.id, "Admin access revoked, ending session");
            clear_current_admin(&session).await?;
            return Err(AppError::Forbidden("You do not have admin access".to_owned()));
        };

        if admin.grant != snapshot.grant {
            session.insert(session_keys::CURRENT_ADMIN, &admin).await?;
        }

        Span::current().record("user_id", admin.id.as_i32());
        Ok(Self(admin))
    }
}

/// Extractor for a signed-in, active `super_admin`.
pub struct RequireSuperAdmin(pub CurrentAdmin);

impl TryFrom<CurrentAdmin> for RequireSuperAdmin {
    type Error = AppError;

    fn try_from(admin: CurrentAdmin) -> Result<Self, Self::Error> {
        if admin.is_super_admin() {
            return Ok(Self(admin));
        }
        warn!(admin_id = %admin.id, role = %admin.grant.role, "Super admin required");
        Err(AppError::Forbidden(
            "Only super admins can manage admin accounts".to_owned(),
        ))
    }
}

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAdminAuth(admin) = RequireAdminAuth::from_request_parts(parts, state).await?;
        Self::try_from(admin)
    }
}

/// Store the admin in the session under a fresh session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
