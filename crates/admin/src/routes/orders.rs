//! Order management handlers. All require the `orders` permission.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use slick_core::{OrderId, OrderStatus, Permission};
use tracing::{info, instrument};

use crate::cache::{ORDERS_TTL, keys};
use crate::db::OrderRepository;
use crate::error::Result;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAdminAuth;
use crate::models::{Order, OrderWithItems};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub note: Option<String>,
}

#[instrument(skip_all, fields(admin_id = %admin.0.id))]
pub async fn index(
    admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderWithItems>>> {
    admin.require(Permission::Orders)?;

    if let Some(orders) = state.cache().get_as::<Vec<OrderWithItems>>(keys::ORDERS).await {
        return Ok(Json(orders));
    }

    let orders = OrderRepository::new(state.pool()).list_with_items().await?;
    state.cache().set_as(keys::ORDERS, &orders, ORDERS_TTL).await;

    Ok(Json(orders))
}

/// Set any status from any status.
#[instrument(skip(admin, state, request), fields(admin_id = %admin.0.id, status = %request.status))]
pub async fn update_status(
    admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(request): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    admin.require(Permission::Orders)?;

    let order = OrderRepository::new(state.pool())
        .update_status(id, request.status, request.note.as_deref())
        .await?;
    state.cache().invalidate_orders().await;

    info!(order_id = %id, order_number = %order.order_number, "Order status updated");
    Ok(Json(order))
}

#[instrument(skip(admin, state), fields(admin_id = %admin.0.id))]
pub async fn destroy(
    admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<StatusCode> {
    admin.require(Permission::Orders)?;

    OrderRepository::new(state.pool()).delete(id).await?;
    state.cache().invalidate_orders().await;

    info!(order_id = %id, "Order deleted");
    Ok(StatusCode::NO_CONTENT)
}
