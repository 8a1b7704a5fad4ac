//! Addon group and addon repository.

use sqlx::PgPool;

use menuhub_core::ordering::next_display_order;
use menuhub_core::{AddonGroupId, AddonId, MenuProductId};

use super::RepositoryError;
use crate::models::addon::{
    Addon, AddonGroup, AddonGroupWithAddons, NewAddon, NewAddonGroup, UpdateAddon,
};

/// Repository for addon groups and their addons.
pub struct AddonRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddonRepository<'a> {
    /// Create a new addon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A product's addon groups with their addons, both in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn groups_with_addons(
        &self,
        product: MenuProductId,
    ) -> Result<Vec<AddonGroupWithAddons>, RepositoryError> {
        let mut by_product = self.groups_for_products(&[product]).await?;
        Ok(by_product.pop().map(|(_, groups)| groups).unwrap_or_default())
    }

    /// Addon groups for several products at once, for pricing a cart.
    ///
    /// Returns one entry per product that has at least one group.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn groups_for_products(
        &self,
        products: &[MenuProductId],
    ) -> Result<Vec<(MenuProductId, Vec<AddonGroupWithAddons>)>, RepositoryError> {
        let groups = sqlx::query_as::<_, AddonGroup>(
            r"
            SELECT * FROM addon_groups
            WHERE product_id = ANY($1)
            ORDER BY product_id, display_order, id
            ",
        )
        .bind(products)
        .fetch_all(self.pool)
        .await?;
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let group_ids: Vec<AddonGroupId> = groups.iter().map(|g| g.id).collect();
        let addons = sqlx::query_as::<_, Addon>(
            r"
            SELECT * FROM addons
            WHERE group_id = ANY($1)
            ORDER BY display_order, id
            ",
        )
        .bind(&group_ids)
        .fetch_all(self.pool)
        .await?;

        let mut out: Vec<(MenuProductId, Vec<AddonGroupWithAddons>)> = Vec::new();
        for group in groups {
            let group_addons = addons
                .iter()
                .filter(|addon| addon.group_id == group.id)
                .cloned()
                .collect();
            let entry = AddonGroupWithAddons {
                group,
                addons: group_addons,
            };
            match out.last_mut() {
                Some((product, list)) if *product == entry.group.product_id => list.push(entry),
                _ => out.push((entry.group.product_id, vec![entry])),
            }
        }
        Ok(out)
    }

    /// Get a group by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn group(&self, id: AddonGroupId) -> Result<Option<AddonGroup>, RepositoryError> {
        let group = sqlx::query_as::<_, AddonGroup>(r"SELECT * FROM addon_groups WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(group)
    }

    /// Create a group on a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_group(
        &self,
        product: MenuProductId,
        input: &NewAddonGroup,
    ) -> Result<AddonGroup, RepositoryError> {
        let display_order = match input.display_order {
            Some(order) => order,
            None => {
                let existing: Vec<i32> = sqlx::query_scalar(
                    r"SELECT display_order FROM addon_groups WHERE product_id = $1",
                )
                .bind(product)
                .fetch_all(self.pool)
                .await?;
                next_display_order(existing)
            }
        };

        sqlx::query_as::<_, AddonGroup>(
            r"
            INSERT INTO addon_groups (
                product_id, name, description, is_required, min_selections, max_selections,
                display_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            ",
        )
        .bind(product)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.is_required)
        .bind(input.min_selections)
        .bind(input.max_selections)
        .bind(display_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "addon group"))
    }

    /// Replace a group's fields with an already merged set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the group does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_group(
        &self,
        id: AddonGroupId,
        input: &NewAddonGroup,
    ) -> Result<AddonGroup, RepositoryError> {
        sqlx::query_as::<_, AddonGroup>(
            r"
            UPDATE addon_groups SET
                name = $2,
                description = $3,
                is_required = $4,
                min_selections = $5,
                max_selections = $6,
                display_order = COALESCE($7, display_order)
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.is_required)
        .bind(input.min_selections)
        .bind(input.max_selections)
        .bind(input.display_order)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "addon group"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a group and its addons.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the group does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_group(&self, id: AddonGroupId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r"DELETE FROM addon_groups WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Add an addon to a group.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the group does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_addon(
        &self,
        group: AddonGroupId,
        input: &NewAddon,
    ) -> Result<Addon, RepositoryError> {
        let display_order = match input.display_order {
            Some(order) => order,
            None => {
                let existing: Vec<i32> =
                    sqlx::query_scalar(r"SELECT display_order FROM addons WHERE group_id = $1")
                        .bind(group)
                        .fetch_all(self.pool)
                        .await?;
                next_display_order(existing)
            }
        };

        sqlx::query_as::<_, Addon>(
            r"
            INSERT INTO addons (group_id, name, description, price, is_available, display_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(group)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.is_available)
        .bind(display_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "addon"))
    }

    /// Update the given fields of an addon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the addon does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_addon(
        &self,
        id: AddonId,
        input: &UpdateAddon,
    ) -> Result<Addon, RepositoryError> {
        sqlx::query_as::<_, Addon>(
            r"
            UPDATE addons SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                is_available = COALESCE($5, is_available),
                display_order = COALESCE($6, display_order)
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.is_available)
        .bind(input.display_order)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "addon"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an addon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the addon does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_addon(&self, id: AddonId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r"DELETE FROM addons WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
