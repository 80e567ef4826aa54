//! Product management handlers. All require the `products` permission.

use axum::{Json, extract::State, http::StatusCode};
use slick_core::{Permission, ProductId, VariantId};
use tracing::{info, instrument};

use crate::cache::{PRODUCTS_TTL, keys};
use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAdminAuth;
use crate::models::{ProductInput, ProductWithVariants};
use crate::state::AppState;

fn required_fields(input: &ProductInput) -> Result<(&str, &str)> {
    input
        .name_and_slug()
        .ok_or_else(|| AppError::BadRequest("Please fill in all required fields".to_owned()))
}

fn product_not_found() -> AppError {
    AppError::NotFound("Product not found".to_owned())
}

#[instrument(skip_all, fields(admin_id = %admin.0.id))]
pub async fn index(
    admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductWithVariants>>> {
    admin.require(Permission::Products)?;

    let key = keys::products(admin.0.id);
    if let Some(products) = state.cache().get_as::<Vec<ProductWithVariants>>(&key).await {
        return Ok(Json(products));
    }

    let products = ProductRepository::new(state.pool())
        .list_with_variants()
        .await?;
    state.cache().set_as(key, &products, PRODUCTS_TTL).await;

    Ok(Json(products))
}

#[instrument(skip(admin, state))]
pub async fn show(
    admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<ProductWithVariants>> {
    admin.require(Permission::Products)?;

    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(product_not_found)
}

#[instrument(skip_all, fields(admin_id = %admin.0.id))]
pub async fn create(
    admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<ProductWithVariants>)> {
    admin.require(Permission::Products)?;
    let (name, slug) = required_fields(&input)?;

    let product = ProductRepository::new(state.pool())
        .create(name, slug, &input)
        .await?;
    state.cache().invalidate_catalog().await;

    info!(
        product_id = %product.product.id,
        variants = product.variants.len(),
        "Product created"
    );
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(admin, state, input), fields(admin_id = %admin.0.id))]
pub async fn update(
    admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<ProductWithVariants>> {
    admin.require(Permission::Products)?;
    let (name, slug) = required_fields(&input)?;

    let product = ProductRepository::new(state.pool())
        .update(id, name, slug, &input)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => product_not_found(),
            other => other.into(),
        })?;
    state.cache().invalidate_catalog().await;

    info!(product_id = %id, "Product updated");
    Ok(Json(product))
}

#[instrument(skip(admin, state), fields(admin_id = %admin.0.id))]
pub async fn destroy(
    admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<StatusCode> {
    admin.require(Permission::Products)?;

    ProductRepository::new(state.pool()).delete(id).await?;
    state.cache().invalidate_catalog().await;

    info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(admin, state), fields(admin_id = %admin.0.id))]
pub async fn destroy_variant(
    admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath((id, variant_id)): ApiPath<(ProductId, VariantId)>,
) -> Result<StatusCode> {
    admin.require(Permission::Products)?;

    ProductRepository::new(state.pool())
        .delete_variant(id, variant_id)
        .await?;
    state.cache().invalidate_catalog().await;

    info!(product_id = %id, %variant_id, "Variant deleted");
    Ok(StatusCode::NO_CONTENT)
}
