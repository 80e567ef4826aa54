//! Catalog types for back-office management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slick_core::{Money, ProductId, ProductStatus, VariantId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Money,
    pub brand: Option<String>,
    pub status: ProductStatus,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub size: String,
    pub stock: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<Variant>,
}

/// A variant in a create or update request. `id` is set for existing variants.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantInput {
    pub id: Option<VariantId>,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub stock: i32,
}

/// Body of `POST /api/products` and `PUT /api/products/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Money,
    pub brand: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
    pub image_url: Option<String>,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
}

impl ProductInput {
    /// Required text fields, trimmed. `None` if any is blank.
    #[must_use]
    pub fn name_and_slug(&self) -> Option<(&str, &str)> {
        let name = self.name.trim();
        let slug = self.slug.trim();
        (!name.is_empty() && !slug.is_empty()).then_some((name, slug))
    }

    /// Variants worth inserting on create: a size and some stock.
    pub fn variants_for_create(&self) -> impl Iterator<Item = &VariantInput> {
        self.variants
            .iter()
            .filter(|v| !v.size.trim().is_empty() && v.stock > 0)
    }

    /// Variants to apply on update: anything with a size.
    pub fn variants_for_update(&self) -> impl Iterator<Item = &VariantInput> {
        self.variants.iter().filter(|v| !v.size.trim().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> ProductInput {
        serde_json::from_value(json!({
            "name": "SLICK PRO",
            "slug": "slick-pro",
            "price": "14999",
            "variants": [
                {"size": "9", "stock": 10},
                {"size": "  ", "stock": 5},
                {"size": "10", "stock": 0},
                {"id": 4, "size": "11", "stock": 2}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_status_defaults_to_draft() {
        assert_eq!(input().status, ProductStatus::Draft);
    }

    #[test]
    fn test_create_skips_blank_and_empty_variants() {
        let input = input();
        let sizes: Vec<&str> = input.variants_for_create().map(|v| v.size.as_str()).collect();
        assert_eq!(sizes, ["9", "11"]);
    }

    #[test]
    fn test_update_keeps_zero_stock_variants() {
        let input = input();
        let sizes: Vec<&str> = input.variants_for_update().map(|v| v.size.as_str()).collect();
        assert_eq!(sizes, ["9", "10", "11"]);
    }

    #[test]
    fn test_name_and_slug_required() {
        let mut input = input();
        assert_eq!(input.name_and_slug(), Some(("SLICK PRO", "slick-pro")));
        input.slug = "   ".into();
        assert_eq!(input.name_and_slug(), None);
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = serde_json::from_value::<ProductInput>(json!({
            "name": "X", "slug": "x", "price": "-1"
        }));
        assert!(result.is_err());
    }
}
