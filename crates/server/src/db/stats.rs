//! Dashboard statistics.
//!
//! "Today" and "this month" start at local midnight in the configured
//! time zone, so a store in São Paulo does not roll its day over at 21:00.

use sqlx::PgPool;

use menuhub_core::{OrderStatus, RecordStatus, StoreId};

use super::RepositoryError;
use crate::models::stats::{CustomerStats, DashboardStats, GlobalStats};

/// Repository for aggregate figures.
pub struct StatsRepository<'a> {
    pool: &'a PgPool,
    timezone: &'a str,
}

impl<'a> StatsRepository<'a> {
    /// Create a stats repository computing days in `timezone`.
    #[must_use]
    pub const fn new(pool: &'a PgPool, timezone: &'a str) -> Self {
        Self { pool, timezone }
    }

    /// Check that the configured zone is one `PostgreSQL` can resolve.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` for an unknown zone, or
    /// `RepositoryError::Database` if the query fails.
    pub async fn verify_timezone(&self) -> Result<(), RepositoryError> {
        let known: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_timezone_names WHERE name = $1)")
                .bind(self.timezone)
                .fetch_one(self.pool)
                .await?;
        if known {
            Ok(())
        } else {
            Err(RepositoryError::Invalid(format!(
                "unknown time zone: {}",
                self.timezone
            )))
        }
    }

    /// Figures for one store's dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn dashboard(&self, store: StoreId) -> Result<DashboardStats, RepositoryError> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r"
            WITH today AS (
                SELECT total FROM orders
                WHERE store_id = $1
                  AND created_at >= date_trunc('day', NOW() AT TIME ZONE $2) AT TIME ZONE $2
            )
            SELECT
                COALESCE((SELECT SUM(total) FROM today), 0)::NUMERIC(10, 2) AS today_sales,
                (SELECT COUNT(*) FROM today) AS today_orders,
                (SELECT COUNT(*) FROM orders WHERE store_id = $1 AND status <> $3) AS active_orders,
                COALESCE((SELECT ROUND(AVG(total), 2) FROM today), 0)::NUMERIC(10, 2)
                    AS average_order_value
            ",
        )
        .bind(store)
        .bind(self.timezone)
        .bind(OrderStatus::Delivered)
        .fetch_one(self.pool)
        .await?;
        Ok(stats)
    }

    /// Customer figures for one store.
    ///
    /// A customer is active when flagged active and has ordered in the last
    /// 30 days.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn customers(&self, store: StoreId) -> Result<CustomerStats, RepositoryError> {
        let stats = sqlx::query_as::<_, CustomerStats>(
            r"
            SELECT
                (SELECT COUNT(*) FROM customers WHERE store_id = $1) AS total_customers,
                (SELECT COUNT(*) FROM customers
                    WHERE store_id = $1
                      AND created_at >= date_trunc('month', NOW() AT TIME ZONE $2) AT TIME ZONE $2
                ) AS new_this_month,
                (SELECT COUNT(*) FROM customers
                    WHERE store_id = $1 AND is_active
                      AND last_order_at >= NOW() - INTERVAL '30 days'
                ) AS active_customers,
                (SELECT COUNT(*) FROM customer_interactions WHERE store_id = $1)
                    AS total_interactions
            ",
        )
        .bind(store)
        .bind(self.timezone)
        .fetch_one(self.pool)
        .await?;
        Ok(stats)
    }

    /// Platform-wide figures.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn global(&self) -> Result<GlobalStats, RepositoryError> {
        let stats = sqlx::query_as::<_, GlobalStats>(
            r"
            WITH today AS (
                SELECT total FROM orders
                WHERE created_at >= date_trunc('day', NOW() AT TIME ZONE $1) AT TIME ZONE $1
            )
            SELECT
                (SELECT COUNT(*) FROM companies) AS total_companies,
                (SELECT COUNT(*) FROM stores) AS total_stores,
                (SELECT COUNT(*) FROM stores WHERE status = $2) AS active_stores,
                COALESCE((SELECT SUM(total) FROM today), 0)::NUMERIC(10, 2) AS today_sales,
                (SELECT COUNT(*) FROM today) AS today_orders
            ",
        )
        .bind(self.timezone)
        .bind(RecordStatus::Active)
        .fetch_one(self.pool)
        .await?;
        Ok(stats)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    async fn pool() -> PgPool {
        let url = std::env::var("MENUHUB_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("MENUHUB_DATABASE_URL or DATABASE_URL must be set");
        crate::db::create_pool(&SecretString::from(url)).await.unwrap()
    }

    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_verify_timezone() {
        let pool = pool().await;
        assert!(
            StatsRepository::new(&pool, "America/Sao_Paulo")
                .verify_timezone()
                .await
                .is_ok()
        );
        assert!(StatsRepository::new(&pool, "UTC").verify_timezone().await.is_ok());
        assert!(matches!(
            StatsRepository::new(&pool, "Nowhere/Atlantis")
                .verify_timezone()
                .await,
            Err(RepositoryError::Invalid(_))
        ));
    }
}
