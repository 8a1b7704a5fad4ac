//! Platform users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menuhub_core::{Email, UserKey, UserRole};

use super::{InputError, MAX_NAME_LENGTH, optional_text};

/// A platform user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserKey,
    pub email: Option<Email>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub restaurant_name: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `PUT /api/users/{key}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUser {
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub restaurant_name: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl UpsertUser {
    /// Trim names and drop blanks.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if a name is too long.
    pub fn normalized(self) -> Result<Self, InputError> {
        Ok(Self {
            email: self.email,
            first_name: optional_text(self.first_name.as_deref(), "firstName", MAX_NAME_LENGTH)?,
            last_name: optional_text(self.last_name.as_deref(), "lastName", MAX_NAME_LENGTH)?,
            restaurant_name: optional_text(
                self.restaurant_name.as_deref(),
                "restaurantName",
                MAX_NAME_LENGTH,
            )?,
            role: self.role,
        })
    }
}
