//! Companies (restaurant groups).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menuhub_core::{CompanyId, Email, RecordStatus, UserKey};

use super::store::Store;
use super::user::User;
use super::{InputError, MAX_NAME_LENGTH, MAX_TEXT_LENGTH, optional_text, required_text};

/// A company owning zero or more stores.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub description: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: RecordStatus,
    pub owner_id: Option<UserKey>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A company with its stores and owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub stores: Vec<Store>,
    pub owner: Option<User>,
}

/// Body of `POST /api/companies`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub owner_id: Option<UserKey>,
}

impl NewCompany {
    /// Trim fields and check required ones.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for a blank name or oversized text.
    pub fn normalized(self) -> Result<Self, InputError> {
        Ok(Self {
            name: required_text(&self.name, "name", MAX_NAME_LENGTH)?,
            description: optional_text(self.description.as_deref(), "description", MAX_TEXT_LENGTH)?,
            phone: optional_text(self.phone.as_deref(), "phone", MAX_NAME_LENGTH)?,
            address: optional_text(self.address.as_deref(), "address", MAX_TEXT_LENGTH)?,
            ..self
        })
    }
}

/// Body of `PUT /api/companies/{id}`. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompany {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: Option<RecordStatus>,
    #[serde(default)]
    pub owner_id: Option<UserKey>,
}

impl UpdateCompany {
    /// Trim fields; a present name must not be blank.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for a blank name or oversized text.
    pub fn normalized(self) -> Result<Self, InputError> {
        Ok(Self {
            name: self
                .name
                .as_deref()
                .map(|n| required_text(n, "name", MAX_NAME_LENGTH))
                .transpose()?,
            description: optional_text(self.description.as_deref(), "description", MAX_TEXT_LENGTH)?,
            phone: optional_text(self.phone.as_deref(), "phone", MAX_NAME_LENGTH)?,
            address: optional_text(self.address.as_deref(), "address", MAX_TEXT_LENGTH)?,
            ..self
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_company_defaults_and_trims() {
        let body: NewCompany =
            serde_json::from_str(r#"{"name":"  Grupo Sabor ","email":"Contato@Sabor.com"}"#).unwrap();
        let company = body.normalized().unwrap();
        assert_eq!(company.name, "Grupo Sabor");
        assert_eq!(company.status, RecordStatus::Active);
        assert_eq!(company.email.unwrap().as_str(), "contato@sabor.com");
    }

    #[test]
    fn test_new_company_requires_name() {
        let body: NewCompany = serde_json::from_str(r#"{"name":"   "}"#).unwrap();
        assert!(body.normalized().is_err());
    }

    #[test]
    fn test_update_company_rejects_blank_name() {
        let body: UpdateCompany = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert!(body.normalized().is_err());
        let body: UpdateCompany = serde_json::from_str(r#"{"status":"inactive"}"#).unwrap();
        let update = body.normalized().unwrap();
        assert!(update.name.is_none());
        assert_eq!(update.status, Some(RecordStatus::Inactive));
    }
}
