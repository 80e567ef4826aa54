//! Checkout handler.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use slick_core::{CheckoutForm, OrderId};

use crate::error::{Result, add_breadcrumb};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::OrderWithItems;
use crate::services::{CheckoutService, cart};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub order_number: String,
    pub order: OrderWithItems,
}

/// Place an order for the session cart, then empty the cart.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    ApiJson(form): ApiJson<CheckoutForm>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let cart = cart::load(&session).await?;

    let order = CheckoutService::new(state.pool())
        .place_order(&user, &cart, &form)
        .await?;

    // The order is committed; a failure here leaves a stale cart, not a lost order.
    if let Err(e) = cart::clear(&session).await {
        tracing::warn!(error = %e, order_id = %order.order.id, "Failed to clear cart after checkout");
    }
    add_breadcrumb("checkout", "Order placed", &[("order_number", order.order.order_number.as_str())]);

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order_id: order.order.id,
            order_number: order.order.order_number.clone(),
            order,
        }),
    ))
}
