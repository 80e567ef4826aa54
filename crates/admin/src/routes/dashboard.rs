//! Dashboard handler.

use axum::{Json, extract::State};
use chrono::Utc;
use tracing::instrument;

use crate::cache::{DASHBOARD_TTL, keys};
use crate::db::DashboardRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::DashboardStats;
use crate::state::AppState;

/// Any active admin may see the dashboard.
#[instrument(skip_all, fields(admin_id = %admin.0.id))]
pub async fn show(
    admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    let key = keys::dashboard(admin.0.id);
    if let Some(stats) = state.cache().get_as::<DashboardStats>(&key).await {
        return Ok(Json(stats));
    }

    let stats = DashboardRepository::new(state.pool())
        .stats(Utc::now())
        .await?;
    state.cache().set_as(key, &stats, DASHBOARD_TTL).await;

    Ok(Json(stats))
}
