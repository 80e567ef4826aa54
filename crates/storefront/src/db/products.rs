//! Catalog queries for the storefront.
//!
//! Only `active` products are visible here; drafts and archived products
//! are reachable through the admin API only.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use slick_core::{Money, ProductId, ProductStatus, VariantId};

use super::RepositoryError;
use crate::models::{Product, ProductDetail, Variant};

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
        })
    }
}

#[derive(sqlx::FromRow)]
struct VariantRow {
    id: i32,
    size: String,
    stock: i32,
}

impl From<VariantRow> for Variant {
    fn from(row: VariantRow) -> Self {
        Self {
            id: VariantId::new(row.id),
            size: row.size,
            stock: row.stock,
        }
    }
}

/// Build an `ILIKE` pattern matching `term` anywhere, with wildcards escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products, newest first.
    ///
    /// When `search` is given, only products whose name or brand contains it
    /// (case-insensitive) are returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_active(&self, search: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, description, price, brand, status, image_url, created_at
            FROM products
            WHERE status = 'active'
              AND ($1::text IS NULL OR name ILIKE $1 OR brand ILIKE $1)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get an active product and its variants by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn get_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ProductDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, description, price, brand, status, image_url, created_at
            FROM products
            WHERE slug = $1 AND status = 'active'
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let product = Product::try_from(row)?;
        let variants = self.variants(product.id).await?;

        Ok(Some(ProductDetail { product, variants }))
    }

    /// Get an active product and its variants by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn get_active(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, description, price, brand, status, image_url, created_at
            FROM products
            WHERE id = $1 AND status = 'active'
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let product = Product::try_from(row)?;
        let variants = self.variants(product.id).await?;

        Ok(Some(ProductDetail { product, variants }))
    }

    async fn variants(&self, product_id: ProductId) -> Result<Vec<Variant>, RepositoryError> {
        let rows = sqlx::query_as::<_, VariantRow>(
            r"
            SELECT id, size, stock
            FROM product_variants
            WHERE product_id = $1
            ORDER BY id
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Variant::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("air"), "%air%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("v_1"), "%v\\_1%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
