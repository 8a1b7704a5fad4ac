//! Addon groups and addons offered on a product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menuhub_core::checkout::{AddonGroupRule, AddonOption};
use menuhub_core::{AddonGroupId, AddonId, MenuProductId, Price};

use super::{InputError, MAX_NAME_LENGTH, MAX_TEXT_LENGTH, optional_text, required_text};

/// A group of options such as "Size" or "Extras".
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AddonGroup {
    pub id: AddonGroupId,
    pub product_id: MenuProductId,
    pub name: String,
    pub description: Option<String>,
    pub is_required: bool,
    pub min_selections: i32,
    pub max_selections: i32,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// One option inside a group.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub id: AddonId,
    pub group_id: AddonGroupId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub is_available: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// A group together with its addons.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonGroupWithAddons {
    #[serde(flatten)]
    pub group: AddonGroup,
    pub addons: Vec<Addon>,
}

impl AddonGroupWithAddons {
    /// Selection rules used when pricing a cart line.
    #[must_use]
    pub fn to_rule(&self) -> AddonGroupRule {
        AddonGroupRule {
            id: self.group.id,
            name: self.group.name.clone(),
            is_required: self.group.is_required,
            min_selections: u32::try_from(self.group.min_selections).unwrap_or(0),
            max_selections: u32::try_from(self.group.max_selections).unwrap_or(1),
            addons: self
                .addons
                .iter()
                .map(|addon| AddonOption {
                    id: addon.id,
                    name: addon.name.clone(),
                    price: addon.price,
                    is_available: addon.is_available,
                })
                .collect(),
        }
    }
}

/// Body of `POST /api/menu-products/{pid}/addon-groups`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddonGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub min_selections: i32,
    #[serde(default = "default_max_selections")]
    pub max_selections: i32,
    #[serde(default)]
    pub display_order: Option<i32>,
}

impl NewAddonGroup {
    /// Trim fields and check the selection range.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for a blank name or an invalid selection range.
    pub fn normalized(self) -> Result<Self, InputError> {
        check_selections(self.min_selections, self.max_selections)?;
        Ok(Self {
            name: required_text(&self.name, "name", MAX_NAME_LENGTH)?,
            description: optional_text(self.description.as_deref(), "description", MAX_TEXT_LENGTH)?,
            ..self
        })
    }
}

/// Body of `PUT /api/addon-groups/{gid}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddonGroup {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_required: Option<bool>,
    #[serde(default)]
    pub min_selections: Option<i32>,
    #[serde(default)]
    pub max_selections: Option<i32>,
    #[serde(default)]
    pub display_order: Option<i32>,
}

impl UpdateAddonGroup {
    /// Merge onto the stored group and validate.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if the merged group is invalid.
    pub fn merge(self, current: &AddonGroup) -> Result<NewAddonGroup, InputError> {
        NewAddonGroup {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self.description.or_else(|| current.description.clone()),
            is_required: self.is_required.unwrap_or(current.is_required),
            min_selections: self.min_selections.unwrap_or(current.min_selections),
            max_selections: self.max_selections.unwrap_or(current.max_selections),
            display_order: Some(self.display_order.unwrap_or(current.display_order)),
        }
        .normalized()
    }
}

/// Body of `POST /api/addon-groups/{gid}/addons`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddon {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Price,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub display_order: Option<i32>,
}

impl NewAddon {
    /// Trim fields and check required ones.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for a blank name or oversized text.
    pub fn normalized(self) -> Result<Self, InputError> {
        Ok(Self {
            name: required_text(&self.name, "name", MAX_NAME_LENGTH)?,
            description: optional_text(self.description.as_deref(), "description", MAX_TEXT_LENGTH)?,
            ..self
        })
    }
}

/// Body of `PUT /api/addons/{aid}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddon {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub display_order: Option<i32>,
}

impl UpdateAddon {
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
            ..self
        })
    }
}

const fn default_true() -> bool {
    true
}

const fn default_max_selections() -> i32 {
    1
}

fn check_selections(min: i32, max: i32) -> Result<(), InputError> {
    if min < 0 {
        return Err(InputError("minSelections cannot be negative".to_owned()));
    }
    if max < 1 {
        return Err(InputError("maxSelections must be at least 1".to_owned()));
    }
    if min > max {
        return Err(InputError(
            "minSelections cannot exceed maxSelections".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn group(is_required: bool, min: i32, max: i32) -> AddonGroup {
        AddonGroup {
            id: AddonGroupId::new(1),
            product_id: MenuProductId::new(1),
            name: "Tamanho".to_owned(),
            description: None,
            is_required,
            min_selections: min,
            max_selections: max,
            display_order: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_group_defaults() {
        let body: NewAddonGroup = serde_json::from_str(r#"{"name":"Extras"}"#).unwrap();
        let group = body.normalized().unwrap();
        assert!(!group.is_required);
        assert_eq!(group.min_selections, 0);
        assert_eq!(group.max_selections, 1);
    }

    #[test]
    fn test_selection_range_checked() {
        let body: NewAddonGroup =
            serde_json::from_str(r#"{"name":"Extras","minSelections":3,"maxSelections":2}"#)
                .unwrap();
        assert!(body.normalized().is_err());
        let body: NewAddonGroup =
            serde_json::from_str(r#"{"name":"Extras","maxSelections":0}"#).unwrap();
        assert!(body.normalized().is_err());
    }

    #[test]
    fn test_update_group_merges_range() {
        let current = group(false, 0, 3);
        let update = UpdateAddonGroup {
            min_selections: Some(4),
            ..UpdateAddonGroup::default()
        };
        assert!(update.merge(&current).is_err());
        let update = UpdateAddonGroup {
            min_selections: Some(2),
            ..UpdateAddonGroup::default()
        };
        assert_eq!(update.merge(&current).unwrap().min_selections, 2);
    }

    #[test]
    fn test_to_rule() {
        let with_addons = AddonGroupWithAddons {
            group: group(true, 0, 1),
            addons: vec![Addon {
                id: AddonId::new(5),
                group_id: AddonGroupId::new(1),
                name: "Grande".to_owned(),
                description: None,
                price: Price::from_cents(800),
                is_available: true,
                display_order: 0,
                created_at: Utc::now(),
            }],
        };
        let rule = with_addons.to_rule();
        assert_eq!(rule.effective_min(), 1);
        assert_eq!(rule.max_selections, 1);
        assert_eq!(rule.addons.len(), 1);
    }
}
