//! Company repository.

use sqlx::PgPool;

use menuhub_core::{CompanyId, UserKey};

use super::RepositoryError;
use crate::models::company::{Company, CompanyDetail, NewCompany, UpdateCompany};
use crate::models::store::Store;
use crate::models::user::User;

/// Repository for companies.
pub struct CompanyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompanyRepository<'a> {
    /// Create a new company repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all companies, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Company>, RepositoryError> {
        let companies =
            sqlx::query_as::<_, Company>(r"SELECT * FROM companies ORDER BY created_at DESC, id DESC")
                .fetch_all(self.pool)
                .await?;
        Ok(companies)
    }

    /// List companies owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: &UserKey) -> Result<Vec<Company>, RepositoryError> {
        let companies = sqlx::query_as::<_, Company>(
            r"SELECT * FROM companies WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;
        Ok(companies)
    }

    /// Get a company by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CompanyId) -> Result<Option<Company>, RepositoryError> {
        let company = sqlx::query_as::<_, Company>(r"SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(company)
    }

    /// Get a company with its stores and owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_stores(
        &self,
        id: CompanyId,
    ) -> Result<Option<CompanyDetail>, RepositoryError> {
        let Some(company) = self.get(id).await? else {
            return Ok(None);
        };

        let stores = sqlx::query_as::<_, Store>(
            r"SELECT * FROM stores WHERE company_id = $1 ORDER BY name, id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let owner = match &company.owner_id {
            Some(key) => {
                sqlx::query_as::<_, User>(r"SELECT * FROM users WHERE id = $1")
                    .bind(key)
                    .fetch_optional(self.pool)
                    .await?
            }
            None => None,
        };

        Ok(Some(CompanyDetail {
            company,
            stores,
            owner,
        }))
    }

    /// Create a company.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owner does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &NewCompany) -> Result<Company, RepositoryError> {
        sqlx::query_as::<_, Company>(
            r"
            INSERT INTO companies (name, description, email, phone, address, status, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            ",
        )
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.email.as_ref())
        .bind(input.phone.as_deref())
        .bind(input.address.as_deref())
        .bind(input.status)
        .bind(input.owner_id.as_ref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "company"))
    }

    /// Update the given fields of a company.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the company does not exist.
    /// Returns `RepositoryError::Conflict` if the owner does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: CompanyId,
        input: &UpdateCompany,
    ) -> Result<Company, RepositoryError> {
        sqlx::query_as::<_, Company>(
            r"
            UPDATE companies SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                address = COALESCE($6, address),
                status = COALESCE($7, status),
                owner_id = COALESCE($8, owner_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.description.as_deref())
        .bind(input.email.as_ref())
        .bind(input.phone.as_deref())
        .bind(input.address.as_deref())
        .bind(input.status)
        .bind(input.owner_id.as_ref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "company"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a company and, by cascade, its stores.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the company does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: CompanyId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r"DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
