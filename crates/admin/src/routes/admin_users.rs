//! Admin user management.
//!
//! Anyone with the `users` permission can list admins. Granting access and
//! activating or deactivating an admin are reserved for super admins.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use slick_core::{AdminRole, AdminUserId, Permission};
use tracing::{info, instrument};

use crate::db::AdminUserRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{RequireAdminAuth, RequireSuperAdmin};
use crate::models::AdminUser;
use crate::services::AdminUserService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub email: String,
    pub role: AdminRole,
}

#[instrument(skip_all, fields(admin_id = %admin.0.id))]
pub async fn index(
    admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminUser>>> {
    admin.require(Permission::Users)?;

    let admins = AdminUserRepository::new(state.pool()).list().await?;
    Ok(Json(admins))
}

#[instrument(skip_all, fields(admin_id = %admin.0.id, role = %request.role))]
pub async fn create(
    admin: RequireSuperAdmin,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GrantRequest>,
) -> Result<(StatusCode, Json<AdminUser>)> {
    let granted = AdminUserService::new(state.pool())
        .grant(&request.email, request.role, Some(&admin.0))
        .await?;

    Ok((StatusCode::CREATED, Json(granted)))
}

/// Flip `is_active` on another admin. Admins cannot deactivate themselves.
///
/// The target's open sessions lose access on their next request.
#[instrument(skip(admin, state), fields(admin_id = %admin.0.id))]
pub async fn toggle(
    admin: RequireSuperAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AdminUserId>,
) -> Result<Json<AdminUser>> {
    if id == admin.0.id {
        return Err(AppError::BadRequest(
            "You cannot deactivate your own account".to_owned(),
        ));
    }

    let updated = AdminUserRepository::new(state.pool())
        .toggle_active(id)
        .await?;
    state.cache().invalidate_admin(id).await;

    info!(target_id = %id, is_active = updated.is_active, "Admin toggled");
    Ok(Json(updated))
}
