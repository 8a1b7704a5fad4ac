//! Order repository.

use chrono::Utc;
use sqlx::PgPool;
use sqlx::types::Json;

use menuhub_core::checkout::generate_order_number;
use menuhub_core::{CustomerId, InteractionKind, OrderId, OrderStatus, StoreId};

use super::RepositoryError;
use crate::models::order::{NewOrder, Order, OrderItem, OrderWithItems};

/// Attempts at drawing an unused order number before giving up.
const ORDER_NUMBER_ATTEMPTS: usize = 3;

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A store's orders, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        store: StoreId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT * FROM orders
            WHERE store_id = $1 AND ($2::order_status IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(store)
        .bind(status)
        .fetch_all(self.pool)
        .await?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let items = sqlx::query_as::<_, OrderItem>(
            r"SELECT * FROM order_items WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(orders
            .into_iter()
            .map(|order| OrderWithItems {
                items: items
                    .iter()
                    .filter(|item| item.order_id == order.id)
                    .cloned()
                    .collect(),
                order,
            })
            .collect())
    }

    /// Get one order of a store with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(
        &self,
        store: StoreId,
        id: OrderId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let order =
            sqlx::query_as::<_, Order>(r"SELECT * FROM orders WHERE store_id = $1 AND id = $2")
                .bind(store)
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(
            r"SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    /// Place an order.
    ///
    /// In one transaction: upserts the customer by phone and bumps their
    /// counters, writes the order and its items, and logs an `order`
    /// interaction on the customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if no unused order number could
    /// be drawn.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &NewOrder) -> Result<OrderWithItems, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let customer_id: CustomerId = sqlx::query_scalar(
            r"
            INSERT INTO customers (
                store_id, name, phone, email, address, total_orders, total_spent, last_order_at
            )
            VALUES ($1, $2, $3, $4, $5, 1, $6, NOW())
            ON CONFLICT (store_id, phone) DO UPDATE SET
                name = EXCLUDED.name,
                email = COALESCE(EXCLUDED.email, customers.email),
                address = COALESCE(EXCLUDED.address, customers.address),
                total_orders = customers.total_orders + 1,
                total_spent = customers.total_spent + EXCLUDED.total_spent,
                last_order_at = NOW(),
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(input.store_id)
        .bind(&input.customer.name)
        .bind(&input.customer.phone)
        .bind(input.customer.email.as_ref())
        .bind(input.customer.delivery_address.as_deref())
        .bind(input.totals.total)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "customer"))?;

        let mut order = None;
        for _ in 0..ORDER_NUMBER_ATTEMPTS {
            let number = generate_order_number(Utc::now(), &mut rand::rng());
            order = sqlx::query_as::<_, Order>(
                r"
                INSERT INTO orders (
                    store_id, order_number, customer_id, customer_name, customer_phone,
                    customer_email, delivery_address, table_number, order_type, status,
                    payment_method, subtotal, delivery_fee, total, special_instructions,
                    estimated_delivery_time
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                ON CONFLICT (order_number) DO NOTHING
                RETURNING *
                ",
            )
            .bind(input.store_id)
            .bind(&number)
            .bind(customer_id)
            .bind(&input.customer.name)
            .bind(&input.customer.phone)
            .bind(input.customer.email.as_ref())
            .bind(input.customer.delivery_address.as_deref())
            .bind(input.customer.table_number.as_deref())
            .bind(input.order_type)
            .bind(OrderStatus::Received)
            .bind(input.payment_method)
            .bind(input.totals.subtotal)
            .bind(input.totals.delivery_fee)
            .bind(input.totals.total)
            .bind(input.special_instructions.as_deref())
            .bind(input.estimated_delivery_time.as_deref())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write(e, "order"))?;
            if order.is_some() {
                break;
            }
            tracing::warn!(order_number = %number, "Order number collision, retrying");
        }
        let order = order.ok_or_else(|| {
            RepositoryError::Conflict("could not allocate an order number".to_string())
        })?;

        let mut items = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let item = sqlx::query_as::<_, OrderItem>(
                r"
                INSERT INTO order_items (
                    order_id, product_id, product_name, quantity, unit_price, addons, subtotal,
                    special_instructions
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
                ",
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(i32::try_from(line.quantity).unwrap_or(i32::MAX))
            .bind(line.unit_price)
            .bind(Json(&line.addons))
            .bind(line.subtotal)
            .bind(line.special_instructions.as_deref())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write(e, "order item"))?;
            items.push(item);
        }

        sqlx::query(
            r"
            INSERT INTO customer_interactions (customer_id, store_id, kind, description)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(customer_id)
        .bind(input.store_id)
        .bind(InteractionKind::Order)
        .bind(format!("Pedido {} - {}", order.order_number, order.total))
        .execute(&mut *tx)
        .await?;

        if let Some(session) = input.cart_session.as_deref() {
            sqlx::query("DELETE FROM cart_items WHERE store_id = $1 AND session_key = $2")
                .bind(input.store_id)
                .bind(session)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!(
            store_id = %order.store_id,
            order_number = %order.order_number,
            total = %order.total,
            "Order placed"
        );
        Ok(OrderWithItems { order, items })
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is not in the store.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        store: StoreId,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(
            r"
            UPDATE orders SET status = $3, updated_at = NOW()
            WHERE store_id = $1 AND id = $2
            RETURNING *
            ",
        )
        .bind(store)
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Move an order to the next status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is not in the store.
    /// Returns `RepositoryError::Invalid` if the order is already delivered.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn advance(&self, store: StoreId, id: OrderId) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: OrderStatus = sqlx::query_scalar(
            r"SELECT status FROM orders WHERE store_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(store)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let next = current
            .next()
            .ok_or_else(|| RepositoryError::Invalid(format!("order is already {current}")))?;

        let order = sqlx::query_as::<_, Order>(
            r"UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order)
    }
}
