//! Menu repository: sections, products and the public menu.

use sqlx::{PgPool, Postgres, Transaction};

use menuhub_core::ordering::next_display_order;
use menuhub_core::{MenuProductId, MenuSectionId, RecordStatus, Slug, StoreId};

use super::RepositoryError;
use crate::models::company::Company;
use crate::models::menu::{
    MenuProduct, MenuSection, NewSection, ProductFields, PublicMenu, ReorderRequest, UpdateSection,
};
use crate::models::store::Store;

/// Repository for menu sections and products.
pub struct MenuRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuRepository<'a> {
    /// Create a new menu repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Sections
    // =========================================================================

    /// List a store's sections in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sections(&self, store: StoreId) -> Result<Vec<MenuSection>, RepositoryError> {
        let sections = sqlx::query_as::<_, MenuSection>(
            r"SELECT * FROM menu_sections WHERE store_id = $1 ORDER BY display_order, id",
        )
        .bind(store)
        .fetch_all(self.pool)
        .await?;
        Ok(sections)
    }

    /// Create a section, appending it when no display order is given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the store does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_section(
        &self,
        store: StoreId,
        input: &NewSection,
    ) -> Result<MenuSection, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let display_order = match input.display_order {
            Some(order) => order,
            None => {
                let existing: Vec<i32> = sqlx::query_scalar(
                    r"SELECT display_order FROM menu_sections WHERE store_id = $1",
                )
                .bind(store)
                .fetch_all(&mut *tx)
                .await?;
                next_display_order(existing)
            }
        };

        let section = sqlx::query_as::<_, MenuSection>(
            r"
            INSERT INTO menu_sections (store_id, name, description, display_order, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(store)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(display_order)
        .bind(input.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "menu section"))?;

        tx.commit().await?;
        Ok(section)
    }

    /// Update the given fields of a section.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the section is not in the store.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_section(
        &self,
        store: StoreId,
        id: MenuSectionId,
        input: &UpdateSection,
    ) -> Result<MenuSection, RepositoryError> {
        sqlx::query_as::<_, MenuSection>(
            r"
            UPDATE menu_sections SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                display_order = COALESCE($5, display_order),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE store_id = $1 AND id = $2
            RETURNING *
            ",
        )
        .bind(store)
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.description.as_deref())
        .bind(input.display_order)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a section and its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the section is not in the store.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_section(
        &self,
        store: StoreId,
        id: MenuSectionId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(r"DELETE FROM menu_sections WHERE store_id = $1 AND id = $2")
            .bind(store)
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Reorder a store's sections in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the request does not match the
    /// store's sections.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn reorder_sections(
        &self,
        store: StoreId,
        request: &ReorderRequest<MenuSectionId>,
    ) -> Result<Vec<MenuSection>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, (MenuSectionId, i32)>(
            r"
            SELECT id, display_order FROM menu_sections
            WHERE store_id = $1
            ORDER BY display_order, id
            FOR UPDATE
            ",
        )
        .bind(store)
        .fetch_all(&mut *tx)
        .await?;

        let plan = request
            .plan(&current)
            .map_err(|e| RepositoryError::Invalid(e.to_string()))?;
        for (id, order) in &plan {
            sqlx::query(
                r"UPDATE menu_sections SET display_order = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(order)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(store_id = %store, changed = plan.len(), "Reordered menu sections");
        self.sections(store).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List a store's products, optionally limited to one section.
    ///
    /// Products are ordered by their section's order, then their own.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn products(
        &self,
        store: StoreId,
        section: Option<MenuSectionId>,
    ) -> Result<Vec<MenuProduct>, RepositoryError> {
        let products = sqlx::query_as::<_, MenuProduct>(
            r"
            SELECT p.* FROM menu_products p
            JOIN menu_sections s ON s.id = p.section_id
            WHERE p.store_id = $1 AND ($2::INTEGER IS NULL OR p.section_id = $2)
            ORDER BY s.display_order, s.id, p.display_order, p.id
            ",
        )
        .bind(store)
        .bind(section)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Get a product of a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product(
        &self,
        store: StoreId,
        id: MenuProductId,
    ) -> Result<Option<MenuProduct>, RepositoryError> {
        let product = sqlx::query_as::<_, MenuProduct>(
            r"SELECT * FROM menu_products WHERE store_id = $1 AND id = $2",
        )
        .bind(store)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Get a product by ID alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_by_id(
        &self,
        id: MenuProductId,
    ) -> Result<Option<MenuProduct>, RepositoryError> {
        let product = sqlx::query_as::<_, MenuProduct>(r"SELECT * FROM menu_products WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// Create a product, appending it to its section when no display order
    /// is given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the section is not in the store
    /// or the promotion prices are inconsistent.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_product(
        &self,
        store: StoreId,
        fields: &ProductFields,
    ) -> Result<MenuProduct, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        ensure_section_in_store(&mut tx, store, fields.section_id).await?;

        let display_order = match fields.display_order {
            Some(order) => order,
            None => {
                let existing: Vec<i32> = sqlx::query_scalar(
                    r"SELECT display_order FROM menu_products WHERE section_id = $1",
                )
                .bind(fields.section_id)
                .fetch_all(&mut *tx)
                .await?;
                next_display_order(existing)
            }
        };

        let product = sqlx::query_as::<_, MenuProduct>(
            r"
            INSERT INTO menu_products (
                store_id, section_id, name, description, price, original_price, image_url,
                is_available, is_promotion, display_order, preparation_time, calories,
                allergens, ingredients, tags
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            ",
        )
        .bind(store)
        .bind(fields.section_id)
        .bind(&fields.name)
        .bind(fields.description.as_deref())
        .bind(fields.price)
        .bind(fields.original_price)
        .bind(fields.image_url.as_deref())
        .bind(fields.is_available)
        .bind(fields.is_promotion)
        .bind(display_order)
        .bind(&fields.preparation_time)
        .bind(fields.calories)
        .bind(&fields.allergens)
        .bind(fields.ingredients.as_deref())
        .bind(&fields.tags)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "menu product"))?;

        tx.commit().await?;
        Ok(product)
    }

    /// Replace a product's fields with an already merged set.
    ///
    /// Without a `display_order` the product goes after the last product of
    /// its (possibly new) section.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the store.
    /// Returns `RepositoryError::Invalid` if the new section is not in the store.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_product(
        &self,
        store: StoreId,
        id: MenuProductId,
        fields: &ProductFields,
    ) -> Result<MenuProduct, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        ensure_section_in_store(&mut tx, store, fields.section_id).await?;

        let display_order = match fields.display_order {
            Some(order) => order,
            None => {
                let existing: Vec<i32> = sqlx::query_scalar(
                    r"SELECT display_order FROM menu_products WHERE section_id = $1 AND id <> $2",
                )
                .bind(fields.section_id)
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;
                next_display_order(existing)
            }
        };

        let product = sqlx::query_as::<_, MenuProduct>(
            r"
            UPDATE menu_products SET
                section_id = $3,
                name = $4,
                description = $5,
                price = $6,
                original_price = $7,
                image_url = $8,
                is_available = $9,
                is_promotion = $10,
                display_order = $11,
                preparation_time = $12,
                calories = $13,
                allergens = $14,
                ingredients = $15,
                tags = $16,
                updated_at = NOW()
            WHERE store_id = $1 AND id = $2
            RETURNING *
            ",
        )
        .bind(store)
        .bind(id)
        .bind(fields.section_id)
        .bind(&fields.name)
        .bind(fields.description.as_deref())
        .bind(fields.price)
        .bind(fields.original_price)
        .bind(fields.image_url.as_deref())
        .bind(fields.is_available)
        .bind(fields.is_promotion)
        .bind(display_order)
        .bind(&fields.preparation_time)
        .bind(fields.calories)
        .bind(&fields.allergens)
        .bind(fields.ingredients.as_deref())
        .bind(&fields.tags)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "menu product"))?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(product)
    }

    /// Delete a product. Past orders keep their copy of its name and price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the store.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_product(
        &self,
        store: StoreId,
        id: MenuProductId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(r"DELETE FROM menu_products WHERE store_id = $1 AND id = $2")
            .bind(store)
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Reorder the products of one section in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the section is not in the store.
    /// Returns `RepositoryError::Invalid` if the request does not match the
    /// section's products.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn reorder_products(
        &self,
        store: StoreId,
        section: MenuSectionId,
        request: &ReorderRequest<MenuProductId>,
    ) -> Result<Vec<MenuProduct>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        ensure_section_in_store(&mut tx, store, section)
            .await
            .map_err(|e| match e {
                RepositoryError::Invalid(_) => RepositoryError::NotFound,
                other => other,
            })?;

        let current = sqlx::query_as::<_, (MenuProductId, i32)>(
            r"
            SELECT id, display_order FROM menu_products
            WHERE section_id = $1
            ORDER BY display_order, id
            FOR UPDATE
            ",
        )
        .bind(section)
        .fetch_all(&mut *tx)
        .await?;

        let plan = request
            .plan(&current)
            .map_err(|e| RepositoryError::Invalid(e.to_string()))?;
        for (id, order) in &plan {
            sqlx::query(
                r"UPDATE menu_products SET display_order = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(order)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(section_id = %section, changed = plan.len(), "Reordered menu products");
        self.products(store, Some(section)).await
    }

    // =========================================================================
    // Public menu
    // =========================================================================

    /// The public menu of an active store: active sections and their
    /// products in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn store_menu(&self, slug: &Slug) -> Result<Option<PublicMenu>, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(
            r"SELECT * FROM stores WHERE slug = $1 AND status = $2",
        )
        .bind(slug)
        .bind(RecordStatus::Active)
        .fetch_optional(self.pool)
        .await?;
        let Some(store) = store else {
            return Ok(None);
        };

        let company = match store.company_id {
            Some(id) => {
                sqlx::query_as::<_, Company>(r"SELECT * FROM companies WHERE id = $1")
                    .bind(id)
                    .fetch_optional(self.pool)
                    .await?
            }
            None => None,
        };

        let sections = sqlx::query_as::<_, MenuSection>(
            r"
            SELECT * FROM menu_sections
            WHERE store_id = $1 AND is_active
            ORDER BY display_order, id
            ",
        )
        .bind(store.id)
        .fetch_all(self.pool)
        .await?;

        let products = sqlx::query_as::<_, MenuProduct>(
            r"SELECT * FROM menu_products WHERE store_id = $1 ORDER BY display_order, id",
        )
        .bind(store.id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(PublicMenu::assemble(store, company, sections, products)))
    }
}

/// Fail with `Invalid` unless the section belongs to the store.
async fn ensure_section_in_store(
    tx: &mut Transaction<'_, Postgres>,
    store: StoreId,
    section: MenuSectionId,
) -> Result<(), RepositoryError> {
    let exists: bool = sqlx::query_scalar(
        r"SELECT EXISTS (SELECT 1 FROM menu_sections WHERE id = $1 AND store_id = $2)",
    )
    .bind(section)
    .bind(store)
    .fetch_one(&mut **tx)
    .await?;
    if exists {
        Ok(())
    } else {
        Err(RepositoryError::Invalid(format!(
            "section {section} does not belong to this store"
        )))
    }
}
