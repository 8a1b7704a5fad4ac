//! Store repository.

use std::collections::HashMap;

use sqlx::PgPool;
use sqlx::types::Json;

use menuhub_core::{CompanyId, Slug, StoreId, UserKey, UserRole};

use super::RepositoryError;
use crate::models::ai_agent::AiAgentConfig;
use crate::models::company::Company;
use crate::models::store::{Store, StoreDetail, StoreInput, UpdateStore};
use crate::models::user::User;

/// Repository for stores.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every store with its company and manager, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_with_company(&self) -> Result<Vec<StoreDetail>, RepositoryError> {
        let stores =
            sqlx::query_as::<_, Store>(r"SELECT * FROM stores ORDER BY created_at DESC, id DESC")
                .fetch_all(self.pool)
                .await?;
        self.attach(stores).await
    }

    /// List the stores of one company.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_company(&self, company: CompanyId) -> Result<Vec<Store>, RepositoryError> {
        let stores = sqlx::query_as::<_, Store>(
            r"SELECT * FROM stores WHERE company_id = $1 ORDER BY name, id",
        )
        .bind(company)
        .fetch_all(self.pool)
        .await?;
        Ok(stores)
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(r"SELECT * FROM stores WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(store)
    }

    /// Get a store with its company and manager.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_company(&self, id: StoreId) -> Result<Option<StoreDetail>, RepositoryError> {
        let Some(store) = self.get(id).await? else {
            return Ok(None);
        };
        Ok(self.attach(vec![store]).await?.into_iter().next())
    }

    /// Get a store by its public slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Store>, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(r"SELECT * FROM stores WHERE slug = $1")
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;
        Ok(store)
    }

    /// Get the store a user manages. A user managing several stores gets the
    /// oldest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_manager(&self, manager: &UserKey) -> Result<Option<Store>, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(
            r"SELECT * FROM stores WHERE manager_id = $1 ORDER BY created_at, id LIMIT 1",
        )
        .bind(manager)
        .fetch_optional(self.pool)
        .await?;
        Ok(store)
    }

    /// Stores a user may administer.
    ///
    /// - `super_admin`: every store
    /// - `owner`: stores of companies they own
    /// - `manager`: the stores they manage
    /// - `admin`: none
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn accessible_for(&self, user: &User) -> Result<Vec<StoreDetail>, RepositoryError> {
        let stores = match user.role {
            UserRole::SuperAdmin => {
                return self.list_with_company().await;
            }
            UserRole::Owner => {
                sqlx::query_as::<_, Store>(
                    r"
                    SELECT s.* FROM stores s
                    JOIN companies c ON c.id = s.company_id
                    WHERE c.owner_id = $1
                    ORDER BY s.name, s.id
                    ",
                )
                .bind(&user.id)
                .fetch_all(self.pool)
                .await?
            }
            UserRole::Manager => {
                sqlx::query_as::<_, Store>(
                    r"SELECT * FROM stores WHERE manager_id = $1 ORDER BY name, id",
                )
                .bind(&user.id)
                .fetch_all(self.pool)
                .await?
            }
            UserRole::Admin => Vec::new(),
        };
        self.attach(stores).await
    }

    /// Create a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken or the company
    /// or manager does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &StoreInput) -> Result<Store, RepositoryError> {
        let store = &input.store;
        sqlx::query_as::<_, Store>(
            r"
            INSERT INTO stores (
                company_id, name, slug, description, address, phone, email, status,
                manager_id, logo_url, banner_url, opening_hours,
                delivery_fee, minimum_order, estimated_delivery_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            ",
        )
        .bind(store.company_id)
        .bind(&store.name)
        .bind(&input.slug)
        .bind(store.description.as_deref())
        .bind(store.address.as_deref())
        .bind(store.phone.as_deref())
        .bind(store.email.as_ref())
        .bind(store.status)
        .bind(store.manager_id.as_ref())
        .bind(store.logo_url.as_deref())
        .bind(store.banner_url.as_deref())
        .bind(store.opening_hours.as_ref())
        .bind(store.delivery_fee)
        .bind(store.minimum_order)
        .bind(&input.estimated_delivery_time)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "store slug"))
    }

    /// Update the given fields of a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: StoreId, input: &UpdateStore) -> Result<Store, RepositoryError> {
        sqlx::query_as::<_, Store>(
            r"
            UPDATE stores SET
                company_id = COALESCE($2, company_id),
                name = COALESCE($3, name),
                slug = COALESCE($4, slug),
                description = COALESCE($5, description),
                address = COALESCE($6, address),
                phone = COALESCE($7, phone),
                email = COALESCE($8, email),
                status = COALESCE($9, status),
                manager_id = COALESCE($10, manager_id),
                logo_url = COALESCE($11, logo_url),
                banner_url = COALESCE($12, banner_url),
                opening_hours = COALESCE($13, opening_hours),
                delivery_fee = COALESCE($14, delivery_fee),
                minimum_order = COALESCE($15, minimum_order),
                estimated_delivery_time = COALESCE($16, estimated_delivery_time),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(input.company_id)
        .bind(input.name.as_deref())
        .bind(input.slug.as_ref())
        .bind(input.description.as_deref())
        .bind(input.address.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.email.as_ref())
        .bind(input.status)
        .bind(input.manager_id.as_ref())
        .bind(input.logo_url.as_deref())
        .bind(input.banner_url.as_deref())
        .bind(input.opening_hours.as_ref())
        .bind(input.delivery_fee)
        .bind(input.minimum_order)
        .bind(input.estimated_delivery_time.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "store slug"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a store and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: StoreId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r"DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Get a store's AI agent settings, or the defaults if none are saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    /// Returns `RepositoryError::DataCorruption` if the stored JSON is not a
    /// valid configuration.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn get_ai_agent(&self, id: StoreId) -> Result<AiAgentConfig, RepositoryError> {
        let stored =
            sqlx::query_scalar::<_, Option<serde_json::Value>>(r"SELECT ai_agent_config FROM stores WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        match stored {
            None | Some(serde_json::Value::Null) => Ok(AiAgentConfig::default()),
            Some(value) => serde_json::from_value(value).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid ai agent config: {e}"))
            }),
        }
    }

    /// Save a store's AI agent settings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_ai_agent(
        &self,
        id: StoreId,
        config: &AiAgentConfig,
    ) -> Result<AiAgentConfig, RepositoryError> {
        let result = sqlx::query(
            r"UPDATE stores SET ai_agent_config = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(Json(config))
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(config.clone())
    }

    /// Load companies and managers for a batch of stores.
    async fn attach(&self, stores: Vec<Store>) -> Result<Vec<StoreDetail>, RepositoryError> {
        let company_ids: Vec<CompanyId> = stores.iter().filter_map(|s| s.company_id).collect();
        let manager_ids: Vec<UserKey> = stores.iter().filter_map(|s| s.manager_id.clone()).collect();

        let companies: HashMap<CompanyId, Company> = if company_ids.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<_, Company>(r"SELECT * FROM companies WHERE id = ANY($1)")
                .bind(&company_ids)
                .fetch_all(self.pool)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };

        let managers: HashMap<String, User> = if manager_ids.is_empty() {
            HashMap::new()
        } else {
            let keys: Vec<&str> = manager_ids.iter().map(UserKey::as_str).collect();
            sqlx::query_as::<_, User>(r"SELECT * FROM users WHERE id = ANY($1)")
                .bind(&keys)
                .fetch_all(self.pool)
                .await?
                .into_iter()
                .map(|u| (u.id.as_str().to_owned(), u))
                .collect()
        };

        Ok(stores
            .into_iter()
            .map(|store| StoreDetail {
                company: store.company_id.and_then(|id| companies.get(&id).cloned()),
                manager: store
                    .manager_id
                    .as_ref()
                    .and_then(|key| managers.get(key.as_str()).cloned()),
                store,
            })
            .collect())
    }
}
