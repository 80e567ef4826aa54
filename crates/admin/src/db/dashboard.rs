//! Queries behind the dashboard.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::instrument;

use super::{OrderRepository, ProductRepository, RepositoryError};
use crate::models::DashboardStats;
use crate::models::dashboard::STATS_WINDOW;

/// Profiles created within this window count as new customers.
pub const NEW_CUSTOMER_DAYS: i64 = 30;

const RECENT_PRODUCTS: i64 = 2;

pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Gather and compute the dashboard figures as of `now`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    #[instrument(skip(self))]
    pub async fn stats(&self, now: DateTime<Utc>) -> Result<DashboardStats, RepositoryError> {
        let window = i64::try_from(STATS_WINDOW).unwrap_or(i64::MAX);
        let orders = OrderRepository::new(self.pool).recent(window).await?;
        let products = ProductRepository::new(self.pool)
            .recent(RECENT_PRODUCTS)
            .await?;
        let new_customers = self
            .customers_since(now - Duration::days(NEW_CUSTOMER_DAYS))
            .await?;
        let products_in_stock = self.active_stock().await?;

        Ok(DashboardStats::compute(
            &orders,
            &products,
            new_customers,
            products_in_stock,
        ))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn customers_since(&self, since: DateTime<Utc>) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles WHERE created_at >= $1")
            .bind(since)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Units in stock across all active products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn active_stock(&self) -> Result<i64, RepositoryError> {
        let (total,): (i64,) = sqlx::query_as(
            r"
            SELECT COALESCE(SUM(v.stock), 0)::bigint
            FROM product_variants v
            JOIN products p ON p.id = v.product_id
            WHERE p.status = 'active'
            ",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(total)
    }
}
