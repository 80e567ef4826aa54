//! Profile handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use crate::db::ProfileRepository;
use crate::db::profiles::ProfileUpdate;
use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::Profile;
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Profile>> {
    if let Some(profile) = ProfileRepository::new(state.pool()).get(user.id).await? {
        return Ok(Json(profile));
    }
    let account = AuthService::new(state.pool()).current_user(user.id).await?;
    Ok(Json(Profile::fallback(&account)))
}

#[instrument(skip(state, user, request), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> Result<Json<Profile>> {
    let update = ProfileUpdate {
        full_name: non_blank(request.full_name.as_deref()),
        avatar_url: non_blank(request.avatar_url.as_deref()),
    };
    let profile = ProfileRepository::new(state.pool())
        .upsert(user.id, user.email.as_str(), update)
        .await?;
    tracing::info!("Profile updated");
    Ok(Json(profile))
}
