//! Menu sections and products.

use std::fmt::Display;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menuhub_core::ordering::{ReorderError, displayed_sequence, move_item, plan_reorder};
use menuhub_core::promotion::{discount_percent, validate_promotion};
use menuhub_core::{MenuProductId, MenuSectionId, Price, StoreId};

use super::company::Company;
use super::store::Store;
use super::{InputError, MAX_NAME_LENGTH, MAX_TEXT_LENGTH, optional_text, required_text};

/// Default preparation estimate for new products.
pub const DEFAULT_PREPARATION_TIME: &str = "15-20 min";

/// Most allergens or tags a product may carry.
const MAX_LABELS: usize = 30;

// =============================================================================
// Sections
// =============================================================================

/// A menu section.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MenuSection {
    pub id: MenuSectionId,
    pub store_id: StoreId,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/stores/{id}/menu-sections`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSection {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Appended after the last section when absent.
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl NewSection {
    /// Trim fields and check required ones.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for a blank name, oversized text or a negative
    /// display order.
    pub fn normalized(self) -> Result<Self, InputError> {
        check_display_order(self.display_order)?;
        Ok(Self {
            name: required_text(&self.name, "name", MAX_NAME_LENGTH)?,
            description: optional_text(self.description.as_deref(), "description", MAX_TEXT_LENGTH)?,
            ..self
        })
    }
}

/// Body of `PUT /api/stores/{id}/menu-sections/{sid}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl UpdateSection {
    /// Trim fields; a present name must not be blank.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for a blank name, oversized text or a negative
    /// display order.
    pub fn normalized(self) -> Result<Self, InputError> {
        check_display_order(self.display_order)?;
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

// =============================================================================
// Products
// =============================================================================

/// A menu product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MenuProduct {
    pub id: MenuProductId,
    pub store_id: StoreId,
    pub section_id: MenuSectionId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub original_price: Option<Price>,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub is_promotion: bool,
    pub display_order: i32,
    pub preparation_time: String,
    pub calories: Option<i32>,
    pub allergens: Vec<String>,
    pub ingredients: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenuProduct {
    /// Discount shown on the menu, if the product is on promotion.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u8> {
        match (self.is_promotion, self.original_price) {
            (true, Some(original)) => Some(discount_percent(self.price, original)),
            _ => None,
        }
    }
}

/// Writable product columns after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub section_id: MenuSectionId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub original_price: Option<Price>,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub is_promotion: bool,
    pub display_order: Option<i32>,
    pub preparation_time: String,
    pub calories: Option<i32>,
    pub allergens: Vec<String>,
    pub ingredients: Option<String>,
    pub tags: Vec<String>,
}

/// Body of `POST /api/stores/{id}/menu-products`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub section_id: MenuSectionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub is_promotion: bool,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub preparation_time: Option<String>,
    #[serde(default)]
    pub calories: Option<i32>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewProduct {
    /// Validate into the columns to insert.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for blank names, oversized text, negative
    /// calories or display order, or inconsistent promotion prices.
    pub fn validated(self) -> Result<ProductFields, InputError> {
        check_display_order(self.display_order)?;
        check_calories(self.calories)?;
        let original_price = validate_promotion(self.price, self.original_price, self.is_promotion)
            .map_err(|e| InputError(e.to_string()))?;
        Ok(ProductFields {
            section_id: self.section_id,
            name: required_text(&self.name, "name", MAX_NAME_LENGTH)?,
            description: optional_text(self.description.as_deref(), "description", MAX_TEXT_LENGTH)?,
            price: self.price,
            original_price,
            image_url: optional_text(self.image_url.as_deref(), "imageUrl", MAX_TEXT_LENGTH)?,
            is_available: self.is_available,
            is_promotion: self.is_promotion,
            display_order: self.display_order,
            preparation_time: optional_text(self.preparation_time.as_deref(), "preparationTime", 40)?
                .unwrap_or_else(|| DEFAULT_PREPARATION_TIME.to_owned()),
            calories: self.calories,
            allergens: clean_labels(self.allergens, "allergens")?,
            ingredients: optional_text(self.ingredients.as_deref(), "ingredients", MAX_TEXT_LENGTH)?,
            tags: clean_labels(self.tags, "tags")?,
        })
    }
}

/// Body of `PUT /api/stores/{id}/menu-products/{pid}`. Absent fields keep
/// their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[serde(default)]
    pub section_id: Option<MenuSectionId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub is_promotion: Option<bool>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub preparation_time: Option<String>,
    #[serde(default)]
    pub calories: Option<i32>,
    #[serde(default)]
    pub allergens: Option<Vec<String>>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl UpdateProduct {
    /// Merge onto the stored product and validate the result.
    ///
    /// Promotion prices are checked on the merged row, so turning a
    /// promotion off clears the original price. A product moved to another
    /// section without an explicit `displayOrder` is left unplaced so the
    /// repository appends it to the target section.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if the merged product is invalid.
    pub fn merge(self, current: &MenuProduct) -> Result<ProductFields, InputError> {
        let merged = NewProduct {
            section_id: self.section_id.unwrap_or(current.section_id),
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self.description.or_else(|| current.description.clone()),
            price: self.price.unwrap_or(current.price),
            original_price: self.original_price.or(current.original_price),
            image_url: self.image_url.or_else(|| current.image_url.clone()),
            is_available: self.is_available.unwrap_or(current.is_available),
            is_promotion: self.is_promotion.unwrap_or(current.is_promotion),
            display_order: match (self.display_order, self.section_id) {
                (Some(order), _) => Some(order),
                (None, Some(section)) if section != current.section_id => None,
                (None, _) => Some(current.display_order),
            },
            preparation_time: Some(
                self.preparation_time
                    .unwrap_or_else(|| current.preparation_time.clone()),
            ),
            calories: self.calories.or(current.calories),
            allergens: self.allergens.unwrap_or_else(|| current.allergens.clone()),
            ingredients: self.ingredients.or_else(|| current.ingredients.clone()),
            tags: self.tags.unwrap_or_else(|| current.tags.clone()),
        };
        merged.validated()
    }
}

// =============================================================================
// Reorder
// =============================================================================

/// Body of the reorder endpoints.
///
/// Either the complete new sequence, or a single drag-and-drop move.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ReorderRequest<Id> {
    Sequence { ids: Vec<Id> },
    Move { id: Id, position: usize },
}

impl<Id> ReorderRequest<Id>
where
    Id: Copy + Ord + Hash + Display,
{
    /// Resolve the request against the stored `(id, display_order)` rows
    /// and return the rows whose order changes.
    ///
    /// # Errors
    ///
    /// Returns `ReorderError` if the request does not match the stored list.
    pub fn plan(&self, current: &[(Id, i32)]) -> Result<Vec<(Id, i32)>, ReorderError> {
        let desired = match self {
            Self::Sequence { ids } => ids.clone(),
            Self::Move { id, position } => {
                move_item(&displayed_sequence(current), *id, *position)?
            }
        };
        plan_reorder(current, &desired)
    }
}

// =============================================================================
// Public menu
// =============================================================================

/// A product as shown on the public menu.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProduct {
    #[serde(flatten)]
    pub product: MenuProduct,
    pub discount_percent: Option<u8>,
}

impl From<MenuProduct> for PublicProduct {
    fn from(product: MenuProduct) -> Self {
        Self {
            discount_percent: product.discount_percent(),
            product,
        }
    }
}

/// A section with its products, both in display order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionWithProducts {
    #[serde(flatten)]
    pub section: MenuSection,
    pub products: Vec<PublicProduct>,
}

/// Everything the public menu page renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMenu {
    pub store: Store,
    pub company: Option<Company>,
    pub sections: Vec<SectionWithProducts>,
}

impl PublicMenu {
    /// Group products under their sections, keeping each list's order.
    ///
    /// Products whose section is not in `sections` are dropped.
    #[must_use]
    pub fn assemble(
        store: Store,
        company: Option<Company>,
        sections: Vec<MenuSection>,
        products: Vec<MenuProduct>,
    ) -> Self {
        let mut grouped: Vec<SectionWithProducts> = sections
            .into_iter()
            .map(|section| SectionWithProducts {
                section,
                products: Vec::new(),
            })
            .collect();
        for product in products {
            if let Some(entry) = grouped
                .iter_mut()
                .find(|entry| entry.section.id == product.section_id)
            {
                entry.products.push(product.into());
            }
        }
        Self {
            store,
            company,
            sections: grouped,
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

const fn default_true() -> bool {
    true
}

fn check_display_order(order: Option<i32>) -> Result<(), InputError> {
    match order {
        Some(n) if n < 0 => Err(InputError("displayOrder cannot be negative".to_owned())),
        _ => Ok(()),
    }
}

fn check_calories(calories: Option<i32>) -> Result<(), InputError> {
    match calories {
        Some(n) if n < 0 => Err(InputError("calories cannot be negative".to_owned())),
        _ => Ok(()),
    }
}

/// Trim labels, drop blanks and duplicates.
fn clean_labels(labels: Vec<String>, field: &str) -> Result<Vec<String>, InputError> {
    let mut cleaned: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        if let Some(label) = optional_text(Some(&label), field, MAX_NAME_LENGTH)?
            && !cleaned.contains(&label)
        {
            cleaned.push(label);
        }
    }
    if cleaned.len() > MAX_LABELS {
        return Err(InputError(format!("{field} accepts at most {MAX_LABELS} entries")));
    }
    Ok(cleaned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product() -> MenuProduct {
        NewProduct {
            section_id: MenuSectionId::new(1),
            name: "Pizza".to_owned(),
            description: None,
            price: Price::from_cents(4_000),
            original_price: Some(Price::from_cents(5_000)),
            image_url: None,
            is_available: true,
            is_promotion: true,
            display_order: None,
            preparation_time: None,
            calories: None,
            allergens: Vec::new(),
            ingredients: None,
            tags: Vec::new(),
        }
        .validated()
        .map(|f| MenuProduct {
            id: MenuProductId::new(7),
            store_id: StoreId::new(1),
            section_id: f.section_id,
            name: f.name,
            description: f.description,
            price: f.price,
            original_price: f.original_price,
            image_url: f.image_url,
            is_available: f.is_available,
            is_promotion: f.is_promotion,
            display_order: 0,
            preparation_time: f.preparation_time,
            calories: f.calories,
            allergens: f.allergens,
            ingredients: f.ingredients,
            tags: f.tags,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .unwrap()
    }

    #[test]
    fn test_new_product_defaults() {
        let body: NewProduct =
            serde_json::from_str(r#"{"sectionId":3,"name":" X-Burger ","price":"22.90"}"#).unwrap();
        let fields = body.validated().unwrap();
        assert_eq!(fields.name, "X-Burger");
        assert!(fields.is_available);
        assert!(!fields.is_promotion);
        assert_eq!(fields.preparation_time, DEFAULT_PREPARATION_TIME);
    }

    #[test]
    fn test_promotion_requires_higher_original() {
        let body: NewProduct = serde_json::from_str(
            r#"{"sectionId":3,"name":"X","price":"20","isPromotion":true,"originalPrice":"18"}"#,
        )
        .unwrap();
        assert!(body.validated().is_err());
        let body: NewProduct =
            serde_json::from_str(r#"{"sectionId":3,"name":"X","price":"20","isPromotion":true}"#)
                .unwrap();
        assert!(body.validated().is_err());
    }

    #[test]
    fn test_original_price_dropped_without_promotion() {
        let body: NewProduct =
            serde_json::from_str(r#"{"sectionId":3,"name":"X","price":"20","originalPrice":"30"}"#)
                .unwrap();
        assert_eq!(body.validated().unwrap().original_price, None);
    }

    #[test]
    fn test_merge_turning_promotion_off_clears_original() {
        let current = product();
        assert_eq!(current.discount_percent(), Some(20));
        let update = UpdateProduct {
            is_promotion: Some(false),
            ..UpdateProduct::default()
        };
        let fields = update.merge(&current).unwrap();
        assert!(!fields.is_promotion);
        assert_eq!(fields.original_price, None);
        assert_eq!(fields.price, current.price);
    }

    #[test]
    fn test_merge_price_above_original_rejected() {
        let update = UpdateProduct {
            price: Some(Price::from_cents(6_000)),
            ..UpdateProduct::default()
        };
        assert!(update.merge(&product()).is_err());
    }

    #[test]
    fn test_merge_section_move_drops_position() {
        let mut current = product();
        current.display_order = 4;

        let moved = UpdateProduct {
            section_id: Some(MenuSectionId::new(2)),
            ..UpdateProduct::default()
        };
        let fields = moved.merge(&current).unwrap();
        assert_eq!(fields.section_id, MenuSectionId::new(2));
        assert_eq!(fields.display_order, None);

        let placed = UpdateProduct {
            section_id: Some(MenuSectionId::new(2)),
            display_order: Some(1),
            ..UpdateProduct::default()
        };
        assert_eq!(placed.merge(&current).unwrap().display_order, Some(1));

        let same_section = UpdateProduct {
            section_id: Some(MenuSectionId::new(1)),
            ..UpdateProduct::default()
        };
        assert_eq!(same_section.merge(&current).unwrap().display_order, Some(4));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let current = product();
        let update = UpdateProduct {
            name: Some("Pizza".to_owned()),
            price: Some(current.price),
            ..UpdateProduct::default()
        };
        let first = update.clone().merge(&current).unwrap();
        let second = update.merge(&current).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_labels_are_cleaned() {
        let cleaned =
            clean_labels(vec![" glúten ".into(), String::new(), "glúten".into()], "allergens")
                .unwrap();
        assert_eq!(cleaned, vec!["glúten"]);
    }

    #[test]
    fn test_reorder_request_shapes() {
        let seq: ReorderRequest<MenuSectionId> = serde_json::from_str(r#"{"ids":[3,1,2]}"#).unwrap();
        assert_eq!(
            seq,
            ReorderRequest::Sequence {
                ids: vec![MenuSectionId::new(3), MenuSectionId::new(1), MenuSectionId::new(2)]
            }
        );
        let mv: ReorderRequest<MenuSectionId> =
            serde_json::from_str(r#"{"id":2,"position":0}"#).unwrap();
        assert_eq!(
            mv,
            ReorderRequest::Move {
                id: MenuSectionId::new(2),
                position: 0
            }
        );
        assert!(serde_json::from_str::<ReorderRequest<MenuSectionId>>(r#"{"position":0}"#).is_err());
    }

    #[test]
    fn test_reorder_plan_move() {
        let current = [
            (MenuSectionId::new(1), 0),
            (MenuSectionId::new(2), 1),
            (MenuSectionId::new(3), 2),
        ];
        let request = ReorderRequest::Move {
            id: MenuSectionId::new(3),
            position: 0,
        };
        assert_eq!(
            request.plan(&current).unwrap(),
            vec![
                (MenuSectionId::new(3), 0),
                (MenuSectionId::new(1), 1),
                (MenuSectionId::new(2), 2)
            ]
        );
        let partial = ReorderRequest::Sequence {
            ids: vec![MenuSectionId::new(2), MenuSectionId::new(1)],
        };
        assert_eq!(partial.plan(&current), Err(ReorderError::Missing(1)));
    }

    #[test]
    fn test_public_menu_groups_products() {
        let now = Utc::now();
        let section = |id: i32| MenuSection {
            id: MenuSectionId::new(id),
            store_id: StoreId::new(1),
            name: format!("S{id}"),
            description: None,
            display_order: id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let mut orphan = product();
        orphan.section_id = MenuSectionId::new(99);
        let mut first = product();
        first.section_id = MenuSectionId::new(2);
        let store = Store {
            id: StoreId::new(1),
            company_id: None,
            name: "Loja".to_owned(),
            slug: menuhub_core::Slug::parse("loja").unwrap(),
            description: None,
            address: None,
            phone: None,
            email: None,
            status: menuhub_core::RecordStatus::Active,
            manager_id: None,
            logo_url: None,
            banner_url: None,
            opening_hours: None,
            delivery_fee: Price::ZERO,
            minimum_order: Price::ZERO,
            estimated_delivery_time: "30-45 min".to_owned(),
            created_at: now,
            updated_at: now,
        };

        let menu = PublicMenu::assemble(store, None, vec![section(1), section(2)], vec![first, orphan]);
        assert_eq!(menu.sections.len(), 2);
        assert!(menu.sections[0].products.is_empty());
        assert_eq!(menu.sections[1].products.len(), 1);
        assert_eq!(menu.sections[1].products[0].discount_percent, Some(20));

        let json = serde_json::to_value(&menu).unwrap();
        assert_eq!(json["sections"][1]["products"][0]["discountPercent"], 20);
        assert_eq!(json["sections"][1]["products"][0]["originalPrice"], "50.00");
    }
}
