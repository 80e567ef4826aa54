//! Cart handlers.
//!
//! Every handler answers with the full cart so the client never has to
//! re-fetch after a mutation.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use slick_core::{Cart, CartLineKey, MAX_LINE_QUANTITY, NewCartLine, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::{ApiJson, ApiPath};
use crate::services::cart::{self, CartView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub size: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

fn cart_response(cart: &Cart) -> Response {
    Json(CartView::from(cart)).into_response()
}

fn parse_key(key: &str) -> Result<CartLineKey> {
    key.parse()
        .map_err(|_| AppError::BadRequest("Invalid cart item".to_owned()))
}

/// Quantities at or below zero remove the line; above the line maximum is refused.
fn check_quantity(quantity: i64) -> Result<i64> {
    if quantity > i64::from(MAX_LINE_QUANTITY) {
        return Err(AppError::BadRequest(format!(
            "Quantity cannot be more than {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(quantity)
}

fn line_not_found() -> AppError {
    AppError::NotFound("Cart item not found".to_owned())
}

#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Response> {
    let cart = cart::load(&session).await?;
    Ok(cart_response(&cart))
}

/// Add one unit of a product size.
///
/// The product must be active and the size must exist with stock left.
/// The price is snapshotted when the line is first created.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    ApiJson(request): ApiJson<AddItemRequest>,
) -> Result<Response> {
    let size = request.size.trim();
    let product = ProductRepository::new(state.pool())
        .get_active(request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    let variant = product
        .variant(size)
        .ok_or_else(|| AppError::NotFound("Size not available".to_owned()))?;
    if !variant.in_stock() {
        return Err(AppError::Conflict("This size is out of stock".to_owned()));
    }

    let mut cart = cart::load(&session).await?;
    let quantity = cart.add(NewCartLine {
        product_id: product.product.id,
        name: product.product.name.clone(),
        slug: product.product.slug.clone(),
        size: variant.size.clone(),
        unit_price: product.product.price,
    });
    cart::save(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[("slug", product.product.slug.as_str()), ("size", variant.size.as_str())],
    );
    tracing::debug!(product_id = %product.product.id, size, quantity, "Cart line added");

    Ok(cart_response(&cart))
}

#[instrument(skip(session))]
pub async fn update(
    session: Session,
    ApiPath(key): ApiPath<String>,
    ApiJson(request): ApiJson<UpdateItemRequest>,
) -> Result<Response> {
    let key = parse_key(&key)?;
    let quantity = check_quantity(request.quantity)?;
    let mut cart = cart::load(&session).await?;

    if !cart.update_quantity(&key, quantity) {
        return Err(line_not_found());
    }
    cart::save(&session, &cart).await?;

    Ok(cart_response(&cart))
}

#[instrument(skip(session))]
pub async fn remove(session: Session, ApiPath(key): ApiPath<String>) -> Result<Response> {
    let key = parse_key(&key)?;
    let mut cart = cart::load(&session).await?;

    if !cart.remove(&key) {
        return Err(line_not_found());
    }
    cart::save(&session, &cart).await?;

    Ok(cart_response(&cart))
}

#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Response> {
    cart::clear(&session).await?;
    Ok(cart_response(&Cart::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_quantity_bounds() {
        assert_eq!(check_quantity(0).ok(), Some(0));
        assert_eq!(check_quantity(-4).ok(), Some(-4));
        assert_eq!(
            check_quantity(i64::from(MAX_LINE_QUANTITY)).ok(),
            Some(i64::from(MAX_LINE_QUANTITY))
        );
        assert!(matches!(
            check_quantity(3_000_000_000),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_parse_key() {
        assert!(parse_key("12-9").is_ok());
        assert!(matches!(parse_key("twelve"), Err(AppError::BadRequest(_))));
    }
}
