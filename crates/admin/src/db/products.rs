//! Catalog management.
//!
//! Unlike the storefront, every status is visible here. Product and variant
//! writes for a single request happen in one transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{instrument, warn};

use slick_core::{Money, ProductId, ProductStatus, VariantId};

use super::RepositoryError;
use crate::models::{Product, ProductInput, ProductWithVariants, Variant, VariantInput};

const SLUG_TAKEN: &str = "A product with this slug already exists";

const PRODUCT_COLUMNS: &str =
    "id, name, slug, description, price, brand, status, image_url, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    description: Option<String>,
    price: Decimal,
    brand: Option<String>,
    status: ProductStatus,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Money::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            price,
            brand: row.brand,
            status: row.status,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VariantRow {
    id: i32,
    product_id: i32,
    size: String,
    stock: i32,
}

impl From<VariantRow> for Variant {
    fn from(row: VariantRow) -> Self {
        Self {
            id: VariantId::new(row.id),
            product_id: ProductId::new(row.product_id),
            size: row.size,
            stock: row.stock,
        }
    }
}

/// Blank optional text becomes `NULL`.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every product with its variants, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list_with_variants(&self) -> Result<Vec<ProductWithVariants>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        let products = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        self.attach_variants(products).await
    }

    /// The newest `limit` products, without variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn recent(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Option<ProductWithVariants>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut products = self.attach_variants(vec![Product::try_from(row)?]).await?;
        Ok(products.pop())
    }

    /// Whether a product already uses `slug`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM products WHERE slug = $1)")
                .bind(slug)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert a product and the variants that have a size and stock.
    ///
    /// `name` and `slug` must already be validated and trimmed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken. Nothing is
    /// written on any error.
    #[instrument(skip(self, input), fields(slug = %slug))]
    pub async fn create(
        &self,
        name: &str,
        slug: &str,
        input: &ProductInput,
    ) -> Result<ProductWithVariants, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO products (name, slug, description, price, brand, status, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(name)
        .bind(slug)
        .bind(non_blank(input.description.as_deref()))
        .bind(input.price)
        .bind(non_blank(input.brand.as_deref()))
        .bind(input.status)
        .bind(non_blank(input.image_url.as_deref()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, SLUG_TAKEN))?;

        let product = Product::try_from(row)?;

        let mut variants = Vec::new();
        for variant in input.variants_for_create() {
            variants.push(insert_variant(&mut tx, product.id, variant).await?);
        }

        tx.commit().await?;

        Ok(ProductWithVariants { product, variants })
    }

    /// Replace a product's fields and apply its variants.
    ///
    /// Variants with an `id` are updated in place; new ones are inserted, or
    /// merged into an existing variant of the same size. Variants missing
    /// from the input are left alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist, or
    /// `RepositoryError::Conflict` if the new slug is taken.
    #[instrument(skip(self, input), fields(slug = %slug))]
    pub async fn update(
        &self,
        id: ProductId,
        name: &str,
        slug: &str,
        input: &ProductInput,
    ) -> Result<ProductWithVariants, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE products
            SET name = $2, slug = $3, description = $4, price = $5, brand = $6,
                status = $7, image_url = $8, updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(non_blank(input.description.as_deref()))
        .bind(input.price)
        .bind(non_blank(input.brand.as_deref()))
        .bind(input.status)
        .bind(non_blank(input.image_url.as_deref()))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, SLUG_TAKEN))?
        .ok_or(RepositoryError::NotFound)?;

        let product = Product::try_from(row)?;

        for variant in input.variants_for_update() {
            match variant.id {
                Some(variant_id) => {
                    let result = sqlx::query(
                        r"
                        UPDATE product_variants
                        SET size = $3, stock = $4
                        WHERE id = $1 AND product_id = $2
                        ",
                    )
                    .bind(variant_id)
                    .bind(product.id)
                    .bind(variant.size.trim())
                    .bind(variant.stock.max(0))
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        RepositoryError::conflict_on_unique(e, "Duplicate size for this product")
                    })?;

                    if result.rows_affected() == 0 {
                        warn!(%variant_id, product_id = %product.id, "Skipping unknown variant");
                    }
                }
                None => {
                    insert_variant(&mut tx, product.id, variant).await?;
                }
            }
        }

        tx.commit().await?;

        self.get(product.id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product; its variants go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the variant does not belong to
    /// the product.
    #[instrument(skip(self))]
    pub async fn delete_variant(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM product_variants WHERE id = $1 AND product_id = $2")
                .bind(variant_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn attach_variants(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductWithVariants>, RepositoryError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = products.iter().map(|p| p.id.as_i32()).collect();
        let rows = sqlx::query_as::<_, VariantRow>(
            r"
            SELECT id, product_id, size, stock
            FROM product_variants
            WHERE product_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_product: HashMap<ProductId, Vec<Variant>> = HashMap::new();
        for row in rows {
            let variant = Variant::from(row);
            by_product.entry(variant.product_id).or_default().push(variant);
        }

        Ok(products
            .into_iter()
            .map(|product| {
                let variants = by_product.remove(&product.id).unwrap_or_default();
                ProductWithVariants { product, variants }
            })
            .collect())
    }
}

async fn insert_variant(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    variant: &VariantInput,
) -> Result<Variant, RepositoryError> {
    let row = sqlx::query_as::<_, VariantRow>(
        r"
        INSERT INTO product_variants (product_id, size, stock)
        VALUES ($1, $2, $3)
        ON CONFLICT (product_id, size) DO UPDATE SET stock = EXCLUDED.stock
        RETURNING id, product_id, size, stock
        ",
    )
    .bind(product_id)
    .bind(variant.size.trim())
    .bind(variant.stock.max(0))
    .fetch_one(&mut **tx)
    .await?;

    Ok(row.into())
}
