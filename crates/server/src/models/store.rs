//! Stores (restaurant locations).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menuhub_core::checkout::StoreTerms;
use menuhub_core::{CompanyId, Email, Price, RecordStatus, Slug, StoreId, UserKey};

use super::company::Company;
use super::user::User;
use super::{InputError, MAX_NAME_LENGTH, MAX_TEXT_LENGTH, optional_text, required_text};

/// Default delivery time estimate shown on new stores.
pub const DEFAULT_DELIVERY_TIME: &str = "30-45 min";

/// A store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub company_id: Option<CompanyId>,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Email>,
    pub status: RecordStatus,
    pub manager_id: Option<UserKey>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub opening_hours: Option<serde_json::Value>,
    pub delivery_fee: Price,
    pub minimum_order: Price,
    pub estimated_delivery_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    /// Pricing terms used at checkout.
    #[must_use]
    pub const fn terms(&self) -> StoreTerms {
        StoreTerms {
            delivery_fee: self.delivery_fee,
            minimum_order: self.minimum_order,
        }
    }

    /// Whether the store accepts public orders.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == RecordStatus::Active
    }
}

/// A store with its company and manager.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetail {
    #[serde(flatten)]
    pub store: Store,
    pub company: Option<Company>,
    pub manager: Option<User>,
}

/// Body of `POST /api/stores`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStore {
    pub name: String,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    /// Derived from the name when absent.
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub manager_id: Option<UserKey>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<serde_json::Value>,
    #[serde(default)]
    pub delivery_fee: Price,
    #[serde(default)]
    pub minimum_order: Price,
    #[serde(default)]
    pub estimated_delivery_time: Option<String>,
}

/// A validated `NewStore` with its slug resolved.
#[derive(Debug, Clone)]
pub struct StoreInput {
    pub store: NewStore,
    pub slug: Slug,
    pub estimated_delivery_time: String,
}

impl NewStore {
    /// Trim fields, derive the slug and default the delivery estimate.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for a blank name, a name that yields no slug,
    /// oversized text, or opening hours that are not a JSON object.
    pub fn validated(self) -> Result<StoreInput, InputError> {
        let name = required_text(&self.name, "name", MAX_NAME_LENGTH)?;
        let slug = match self.slug.clone() {
            Some(slug) => slug,
            None => Slug::from_name(&name)
                .map_err(|e| InputError(format!("cannot derive slug from name: {e}")))?,
        };
        check_opening_hours(self.opening_hours.as_ref())?;
        let estimated_delivery_time =
            optional_text(self.estimated_delivery_time.as_deref(), "estimatedDeliveryTime", 40)?
                .unwrap_or_else(|| DEFAULT_DELIVERY_TIME.to_owned());

        let store = Self {
            name,
            description: optional_text(self.description.as_deref(), "description", MAX_TEXT_LENGTH)?,
            address: optional_text(self.address.as_deref(), "address", MAX_TEXT_LENGTH)?,
            phone: optional_text(self.phone.as_deref(), "phone", MAX_NAME_LENGTH)?,
            logo_url: optional_text(self.logo_url.as_deref(), "logoUrl", MAX_TEXT_LENGTH)?,
            banner_url: optional_text(self.banner_url.as_deref(), "bannerUrl", MAX_TEXT_LENGTH)?,
            ..self
        };
        Ok(StoreInput {
            store,
            slug,
            estimated_delivery_time,
        })
    }
}

/// Body of `PUT /api/stores/{id}`. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStore {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub status: Option<RecordStatus>,
    #[serde(default)]
    pub manager_id: Option<UserKey>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<serde_json::Value>,
    #[serde(default)]
    pub delivery_fee: Option<Price>,
    #[serde(default)]
    pub minimum_order: Option<Price>,
    #[serde(default)]
    pub estimated_delivery_time: Option<String>,
}

impl UpdateStore {
    /// Trim fields; a present name must not be blank.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for a blank name, oversized text or malformed
    /// opening hours.
    pub fn normalized(self) -> Result<Self, InputError> {
        check_opening_hours(self.opening_hours.as_ref())?;
        Ok(Self {
            name: self
                .name
                .as_deref()
                .map(|n| required_text(n, "name", MAX_NAME_LENGTH))
                .transpose()?,
            description: optional_text(self.description.as_deref(), "description", MAX_TEXT_LENGTH)?,
            address: optional_text(self.address.as_deref(), "address", MAX_TEXT_LENGTH)?,
            phone: optional_text(self.phone.as_deref(), "phone", MAX_NAME_LENGTH)?,
            logo_url: optional_text(self.logo_url.as_deref(), "logoUrl", MAX_TEXT_LENGTH)?,
            banner_url: optional_text(self.banner_url.as_deref(), "bannerUrl", MAX_TEXT_LENGTH)?,
            estimated_delivery_time: optional_text(
                self.estimated_delivery_time.as_deref(),
                "estimatedDeliveryTime",
                40,
            )?,
            ..self
        })
    }
}

/// Opening hours are stored as a JSON object keyed by weekday.
fn check_opening_hours(hours: Option<&serde_json::Value>) -> Result<(), InputError> {
    match hours {
        None | Some(serde_json::Value::Object(_) | serde_json::Value::Null) => Ok(()),
        Some(_) => Err(InputError("openingHours must be an object".to_owned())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_derives_slug_and_defaults() {
        let body: NewStore = serde_json::from_str(
            r#"{"name":"Pizzaria São Jorge","deliveryFee":"5.00","minimumOrder":25}"#,
        )
        .unwrap();
        let input = body.validated().unwrap();
        assert_eq!(input.slug.as_str(), "pizzaria-sao-jorge");
        assert_eq!(input.estimated_delivery_time, DEFAULT_DELIVERY_TIME);
        assert_eq!(input.store.delivery_fee, Price::from_cents(500));
        assert_eq!(input.store.minimum_order, Price::from_cents(2_500));
    }

    #[test]
    fn test_new_store_keeps_explicit_slug() {
        let body: NewStore =
            serde_json::from_str(r#"{"name":"Loja","slug":"loja-centro"}"#).unwrap();
        assert_eq!(body.validated().unwrap().slug.as_str(), "loja-centro");
    }

    #[test]
    fn test_new_store_rejects_bad_slug_and_hours() {
        assert!(serde_json::from_str::<NewStore>(r#"{"name":"Loja","slug":"Loja Centro"}"#).is_err());
        let body: NewStore =
            serde_json::from_str(r#"{"name":"Loja","openingHours":"9-18"}"#).unwrap();
        assert!(body.validated().is_err());
    }

    #[test]
    fn test_negative_fee_rejected() {
        assert!(serde_json::from_str::<NewStore>(r#"{"name":"Loja","deliveryFee":"-1"}"#).is_err());
    }
}
