//! Per-store customer records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menuhub_core::{CustomerId, Email, InteractionId, InteractionKind, Phone, Price, StoreId};

use super::{InputError, MAX_NAME_LENGTH, MAX_TEXT_LENGTH, optional_text, required_text};

/// Interactions returned inline with each customer in a listing.
pub const RECENT_INTERACTIONS: i64 = 5;

/// A customer of one store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub store_id: StoreId,
    pub name: String,
    pub phone: Phone,
    pub email: Option<Email>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub total_orders: i32,
    pub total_spent: Price,
    pub last_order_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Something that happened with a customer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: InteractionId,
    pub customer_id: CustomerId,
    pub store_id: StoreId,
    pub kind: InteractionKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A customer with interactions, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWithInteractions {
    #[serde(flatten)]
    pub customer: Customer,
    pub interactions: Vec<Interaction>,
}

/// Body of `POST /api/stores/{id}/customers`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub phone: Phone,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewCustomer {
    /// Trim fields and check required ones.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for a blank name or oversized text.
    pub fn normalized(self) -> Result<Self, InputError> {
        Ok(Self {
            name: required_text(&self.name, "name", MAX_NAME_LENGTH)?,
            address: optional_text(self.address.as_deref(), "address", MAX_TEXT_LENGTH)?,
            notes: optional_text(self.notes.as_deref(), "notes", MAX_TEXT_LENGTH)?,
            tags: clean_tags(self.tags)?,
            ..self
        })
    }
}

/// Body of `PUT /api/stores/{id}/customers/{cid}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<Phone>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl UpdateCustomer {
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
            address: optional_text(self.address.as_deref(), "address", MAX_TEXT_LENGTH)?,
            notes: optional_text(self.notes.as_deref(), "notes", MAX_TEXT_LENGTH)?,
            tags: self.tags.map(clean_tags).transpose()?,
            ..self
        })
    }
}

/// Body of `POST /api/stores/{id}/customers/{cid}/interactions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInteraction {
    #[serde(default, alias = "type")]
    pub kind: InteractionKind,
    pub description: String,
}

impl NewInteraction {
    /// Trim the description.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for a blank or oversized description.
    pub fn normalized(self) -> Result<Self, InputError> {
        Ok(Self {
            description: required_text(&self.description, "description", MAX_TEXT_LENGTH)?,
            ..self
        })
    }
}

/// Query string of `GET /api/stores/{id}/customers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerSearch {
    #[serde(default)]
    pub search: Option<String>,
}

impl CustomerSearch {
    /// The search term as an `ILIKE` pattern, with wildcards escaped.
    #[must_use]
    pub fn pattern(&self) -> Option<String> {
        let term = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let escaped: String = term
            .chars()
            .flat_map(|c| match c {
                '%' | '_' | '\\' => vec!['\\', c],
                _ => vec![c],
            })
            .collect();
        Some(format!("%{escaped}%"))
    }
}

fn clean_tags(tags: Vec<String>) -> Result<Vec<String>, InputError> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if let Some(tag) = optional_text(Some(&tag), "tags", MAX_NAME_LENGTH)?
            && !cleaned.contains(&tag)
        {
            cleaned.push(tag);
        }
    }
    Ok(cleaned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_customer_normalizes_phone() {
        let body: NewCustomer = serde_json::from_str(
            r#"{"name":" Maria ","phone":"+55 (11) 91234-5678","tags":["vip"," vip ",""]}"#,
        )
        .unwrap();
        let customer = body.normalized().unwrap();
        assert_eq!(customer.name, "Maria");
        assert_eq!(customer.phone.as_str(), "5511912345678");
        assert_eq!(customer.tags, vec!["vip"]);
    }

    #[test]
    fn test_new_customer_rejects_bad_phone() {
        assert!(serde_json::from_str::<NewCustomer>(r#"{"name":"Maria","phone":"abc"}"#).is_err());
    }

    #[test]
    fn test_interaction_accepts_type_alias() {
        let body: NewInteraction =
            serde_json::from_str(r#"{"type":"call","description":" Ligou "}"#).unwrap();
        let interaction = body.normalized().unwrap();
        assert_eq!(interaction.kind, InteractionKind::Call);
        assert_eq!(interaction.description, "Ligou");
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let search = CustomerSearch {
            search: Some(" 50%_off ".to_owned()),
        };
        assert_eq!(search.pattern().unwrap(), r"%50\%\_off%");
        assert!(CustomerSearch::default().pattern().is_none());
    }
}
