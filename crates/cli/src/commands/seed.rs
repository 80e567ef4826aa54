//! Catalog seeding.
//!
//! Without `--file` the four showcase sneakers are inserted, each active
//! with sizes 7 to 11 and ten pairs per size. A YAML catalog uses the same
//! shape as the admin product API:
//!
//! ```yaml
//! products:
//!   - name: SLICK TRAIL
//!     slug: slick-trail
//!     price: "9999"
//!     brand: Slick
//!     status: active
//!     variants:
//!       - { size: "9", stock: 4 }
//! ```
//!
//! Products whose slug already exists are skipped, so seeding is repeatable.

use std::path::Path;

use serde::Deserialize;
use slick_core::{Money, ProductStatus};
use sqlx::PgPool;
use tracing::info;

use slick_admin::db::ProductRepository;
use slick_admin::models::{ProductInput, VariantInput};

use super::CommandError;

const SHOWCASE: [(&str, &str, u32); 4] = [
    ("SLICK RUNNER V1", "slick-runner-v1", 8999),
    ("SLICK AIR", "slick-air", 11999),
    ("SLICK CLASSIC", "slick-classic", 7999),
    ("SLICK PRO", "slick-pro", 14999),
];
const SHOWCASE_SIZES: [&str; 5] = ["7", "8", "9", "10", "11"];
const SHOWCASE_STOCK: i32 = 10;

#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub products: Vec<ProductInput>,
}

/// The built-in showcase catalog.
#[must_use]
pub fn showcase_catalog() -> Catalog {
    let products = SHOWCASE
        .into_iter()
        .map(|(name, slug, pesos)| ProductInput {
            name: name.to_owned(),
            slug: slug.to_owned(),
            description: None,
            price: Money::pesos(pesos),
            brand: Some("Slick".to_owned()),
            status: ProductStatus::Active,
            image_url: None,
            variants: SHOWCASE_SIZES
                .into_iter()
                .map(|size| VariantInput {
                    id: None,
                    size: size.to_owned(),
                    stock: SHOWCASE_STOCK,
                })
                .collect(),
        })
        .collect();

    Catalog { products }
}

/// Parse a YAML catalog.
///
/// # Errors
///
/// Returns `CommandError::Yaml` for malformed YAML.
pub fn parse_catalog(yaml: &str) -> Result<Catalog, CommandError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// # Errors
///
/// Returns `CommandError::Io` if the file cannot be read.
pub async fn load_catalog(path: &Path) -> Result<Catalog, CommandError> {
    info!(path = %path.display(), "Loading catalog from file");
    let content = tokio::fs::read_to_string(path).await?;
    parse_catalog(&content)
}

/// Insert every product whose slug is not taken yet.
///
/// # Errors
///
/// Returns `CommandError::Invalid` for a product without a name or slug, or
/// a repository error if an insert fails.
pub async fn run(pool: &PgPool, catalog: &Catalog) -> Result<(), CommandError> {
    let products = ProductRepository::new(pool);
    let mut inserted = 0_usize;
    let mut skipped = 0_usize;

    for input in &catalog.products {
        let (name, slug) = input.name_and_slug().ok_or_else(|| {
            CommandError::Invalid("every product needs a name and a slug".to_owned())
        })?;

        if products.slug_exists(slug).await? {
            info!(slug, "Already exists, skipping");
            skipped += 1;
            continue;
        }

        let created = products.create(name, slug, input).await?;
        info!(
            slug,
            id = %created.product.id,
            variants = created.variants.len(),
            "Inserted"
        );
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    info!("  Products skipped (already exist): {skipped}");
    Ok(())
}
