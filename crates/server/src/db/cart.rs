//! Server-side cart repository.
//!
//! A cart is identified by an opaque session key chosen by the client and
//! the store it belongs to. Rows hold only the customer's choices; prices
//! are computed from the live menu whenever the cart is read.

use sqlx::PgPool;

use menuhub_core::checkout::{LineRequest, MAX_LINE_QUANTITY};
use menuhub_core::{CartItemId, StoreId};

use super::RepositoryError;
use crate::models::cart::CartItem;

/// Repository for cart lines.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lines of a cart in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(
        &self,
        store: StoreId,
        session: &str,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(
            r"
            SELECT * FROM cart_items
            WHERE store_id = $1 AND session_key = $2
            ORDER BY created_at, id
            ",
        )
        .bind(store)
        .bind(session)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Add a line. An identical line already in the cart has its quantity
    /// raised instead, up to the per-line limit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        store: StoreId,
        session: &str,
        line: &LineRequest,
    ) -> Result<CartItem, RepositoryError> {
        let quantity = i32::try_from(line.quantity).unwrap_or(i32::MAX);
        let max = i32::try_from(MAX_LINE_QUANTITY).unwrap_or(i32::MAX);
        let mut addon_ids = line.addon_ids.clone();
        addon_ids.sort_unstable();

        let mut tx = self.pool.begin().await?;

        let merged = sqlx::query_as::<_, CartItem>(
            r"
            UPDATE cart_items SET
                quantity = LEAST(quantity + $5, $6),
                updated_at = NOW()
            WHERE store_id = $1 AND session_key = $2 AND product_id = $3
              AND addon_ids = $4
              AND special_instructions IS NOT DISTINCT FROM $7
            RETURNING *
            ",
        )
        .bind(store)
        .bind(session)
        .bind(line.product_id)
        .bind(&addon_ids)
        .bind(quantity)
        .bind(max)
        .bind(line.special_instructions.as_deref())
        .fetch_optional(&mut *tx)
        .await?;

        let item = match merged {
            Some(item) => item,
            None => sqlx::query_as::<_, CartItem>(
                r"
                INSERT INTO cart_items (
                    session_key, store_id, product_id, quantity, addon_ids, special_instructions
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                ",
            )
            .bind(session)
            .bind(store)
            .bind(line.product_id)
            .bind(quantity)
            .bind(&addon_ids)
            .bind(line.special_instructions.as_deref())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write(e, "cart item"))?,
        };

        tx.commit().await?;
        Ok(item)
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in this cart.
    /// Returns `RepositoryError::Invalid` if the quantity is out of range.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_quantity(
        &self,
        store: StoreId,
        session: &str,
        item: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, RepositoryError> {
        let quantity = i32::try_from(quantity).unwrap_or(i32::MAX);
        sqlx::query_as::<_, CartItem>(
            r"
            UPDATE cart_items SET quantity = $4, updated_at = NOW()
            WHERE store_id = $1 AND session_key = $2 AND id = $3
            RETURNING *
            ",
        )
        .bind(store)
        .bind(session)
        .bind(item)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "cart item"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in this cart.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn remove(
        &self,
        store: StoreId,
        session: &str,
        item: CartItemId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"DELETE FROM cart_items WHERE store_id = $1 AND session_key = $2 AND id = $3",
        )
        .bind(store)
        .bind(session)
        .bind(item)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Empty a cart. Returns the number of lines removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, store: StoreId, session: &str) -> Result<u64, RepositoryError> {
        let result =
            sqlx::query(r"DELETE FROM cart_items WHERE store_id = $1 AND session_key = $2")
                .bind(store)
                .bind(session)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}
