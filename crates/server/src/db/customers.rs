//! Customer repository.

use sqlx::PgPool;

use menuhub_core::{CustomerId, Phone, StoreId};

use super::RepositoryError;
use crate::models::customer::{
    Customer, CustomerSearch, CustomerWithInteractions, Interaction, NewCustomer, NewInteraction,
    RECENT_INTERACTIONS, UpdateCustomer,
};

/// Repository for customers and their interactions.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A store's customers, most recent buyers first, each with their
    /// latest interactions.
    ///
    /// The search term matches name, phone or email, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        store: StoreId,
        search: &CustomerSearch,
    ) -> Result<Vec<CustomerWithInteractions>, RepositoryError> {
        let customers = sqlx::query_as::<_, Customer>(
            r"
            SELECT * FROM customers
            WHERE store_id = $1
              AND ($2::TEXT IS NULL OR name ILIKE $2 OR phone ILIKE $2 OR email ILIKE $2)
            ORDER BY last_order_at DESC NULLS LAST, created_at DESC, id DESC
            ",
        )
        .bind(store)
        .bind(search.pattern())
        .fetch_all(self.pool)
        .await?;
        if customers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<CustomerId> = customers.iter().map(|c| c.id).collect();
        let recent = sqlx::query_as::<_, Interaction>(
            r"
            SELECT id, customer_id, store_id, kind, description, created_at
            FROM (
                SELECT i.*, ROW_NUMBER() OVER (
                    PARTITION BY customer_id ORDER BY created_at DESC, id DESC
                ) AS rank
                FROM customer_interactions i
                WHERE customer_id = ANY($1)
            ) ranked
            WHERE rank <= $2
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(&ids)
        .bind(RECENT_INTERACTIONS)
        .fetch_all(self.pool)
        .await?;

        Ok(customers
            .into_iter()
            .map(|customer| CustomerWithInteractions {
                interactions: recent
                    .iter()
                    .filter(|i| i.customer_id == customer.id)
                    .cloned()
                    .collect(),
                customer,
            })
            .collect())
    }

    /// Get a customer with their full interaction history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_interactions(
        &self,
        store: StoreId,
        id: CustomerId,
    ) -> Result<Option<CustomerWithInteractions>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(
            r"SELECT * FROM customers WHERE store_id = $1 AND id = $2",
        )
        .bind(store)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        let Some(customer) = customer else {
            return Ok(None);
        };
        let interactions = self.interactions(store, id).await?;
        Ok(Some(CustomerWithInteractions {
            customer,
            interactions,
        }))
    }

    /// Look a customer up by normalized phone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_phone(
        &self,
        store: StoreId,
        phone: &Phone,
    ) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(
            r"SELECT * FROM customers WHERE store_id = $1 AND phone = $2",
        )
        .bind(store)
        .bind(phone)
        .fetch_optional(self.pool)
        .await?;
        Ok(customer)
    }

    /// Create a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone is already registered
    /// for this store.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        store: StoreId,
        input: &NewCustomer,
    ) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(
            r"
            INSERT INTO customers (store_id, name, phone, email, address, notes, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            ",
        )
        .bind(store)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(input.email.as_ref())
        .bind(input.address.as_deref())
        .bind(input.notes.as_deref())
        .bind(&input.tags)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "customer phone"))
    }

    /// Update the given fields of a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer is not in the store.
    /// Returns `RepositoryError::Conflict` if the new phone is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        store: StoreId,
        id: CustomerId,
        input: &UpdateCustomer,
    ) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(
            r"
            UPDATE customers SET
                name = COALESCE($3, name),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                address = COALESCE($6, address),
                notes = COALESCE($7, notes),
                is_active = COALESCE($8, is_active),
                tags = COALESCE($9, tags),
                updated_at = NOW()
            WHERE store_id = $1 AND id = $2
            RETURNING *
            ",
        )
        .bind(store)
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.phone.as_ref())
        .bind(input.email.as_ref())
        .bind(input.address.as_deref())
        .bind(input.notes.as_deref())
        .bind(input.is_active)
        .bind(input.tags.as_ref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "customer phone"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a customer. Their orders stay, unlinked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer is not in the store.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, store: StoreId, id: CustomerId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r"DELETE FROM customers WHERE store_id = $1 AND id = $2")
            .bind(store)
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// A customer's interactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn interactions(
        &self,
        store: StoreId,
        customer: CustomerId,
    ) -> Result<Vec<Interaction>, RepositoryError> {
        let interactions = sqlx::query_as::<_, Interaction>(
            r"
            SELECT * FROM customer_interactions
            WHERE store_id = $1 AND customer_id = $2
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(store)
        .bind(customer)
        .fetch_all(self.pool)
        .await?;
        Ok(interactions)
    }

    /// Record an interaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer is not in the store.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_interaction(
        &self,
        store: StoreId,
        customer: CustomerId,
        input: &NewInteraction,
    ) -> Result<Interaction, RepositoryError> {
        sqlx::query_as::<_, Interaction>(
            r"
            INSERT INTO customer_interactions (customer_id, store_id, kind, description)
            SELECT id, store_id, $3, $4 FROM customers WHERE store_id = $1 AND id = $2
            RETURNING *
            ",
        )
        .bind(store)
        .bind(customer)
        .bind(input.kind)
        .bind(&input.description)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
