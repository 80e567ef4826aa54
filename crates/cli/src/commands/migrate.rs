//! Database migration command.
//!
//! Migration files live in `crates/storefront/migrations/` and are embedded
//! at build time.

use sqlx::PgPool;

use super::CommandError;

/// Apply pending migrations.
///
/// # Errors
///
/// Returns `CommandError::Migration` if a migration fails.
pub async fn run(pool: &PgPool) -> Result<(), CommandError> {
    tracing::info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(pool).await?;
    tracing::info!("Migrations complete!");
    Ok(())
}
