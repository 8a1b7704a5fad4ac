//! User repository.

use sqlx::PgPool;

use menuhub_core::{UserKey, UserRole};

use super::RepositoryError;
use crate::models::user::{UpsertUser, User};

/// Repository for platform users.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, key: &UserKey) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(r"SELECT * FROM users WHERE id = $1")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users =
            sqlx::query_as::<_, User>(r"SELECT * FROM users ORDER BY created_at DESC, id")
                .fetch_all(self.pool)
                .await?;
        Ok(users)
    }

    /// Insert a user or update the given fields of an existing one.
    ///
    /// A new user without a role becomes `admin`; an existing user's role
    /// only changes when one is given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email belongs to another user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert(&self, key: &UserKey, input: &UpsertUser) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (id, email, first_name, last_name, restaurant_name, role)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, $7))
            ON CONFLICT (id) DO UPDATE SET
                email = COALESCE(EXCLUDED.email, users.email),
                first_name = COALESCE(EXCLUDED.first_name, users.first_name),
                last_name = COALESCE(EXCLUDED.last_name, users.last_name),
                restaurant_name = COALESCE(EXCLUDED.restaurant_name, users.restaurant_name),
                role = COALESCE($6, users.role),
                updated_at = NOW()
            RETURNING *
            ",
        )
        .bind(key)
        .bind(input.email.as_ref())
        .bind(input.first_name.as_deref())
        .bind(input.last_name.as_deref())
        .bind(input.restaurant_name.as_deref())
        .bind(input.role)
        .bind(UserRole::default())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "user email"))
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_role(&self, key: &UserKey, role: UserRole) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(key)
        .bind(role)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
