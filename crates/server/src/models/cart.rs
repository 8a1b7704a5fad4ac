//! Server-side carts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menuhub_core::checkout::{LineRequest, PricedLine, Totals};
use menuhub_core::{AddonId, CartItemId, MenuProductId, Price, StoreId};

use super::InputError;

/// Longest accepted cart session key.
const MAX_SESSION_KEY_LENGTH: usize = 128;

/// A stored cart line. Only what the customer asked for is kept; prices
/// are recomputed from the menu on every read.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub session_key: String,
    pub store_id: StoreId,
    pub product_id: MenuProductId,
    pub quantity: i32,
    pub addon_ids: Vec<AddonId>,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    /// The line as it would be priced at checkout.
    #[must_use]
    pub fn to_request(&self) -> LineRequest {
        LineRequest {
            product_id: self.product_id,
            quantity: u32::try_from(self.quantity).unwrap_or(0),
            addon_ids: self.addon_ids.clone(),
            special_instructions: self.special_instructions.clone(),
        }
    }
}

/// Body of `PUT /api/menu/{slug}/cart/{session}/{item}`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartQuantity {
    pub quantity: u32,
}

/// A cart line with its current price.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartItemId,
    #[serde(flatten)]
    pub line: PricedLine,
}

/// A stored line that can no longer be priced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailableCartLine {
    pub id: CartItemId,
    pub product_id: MenuProductId,
    /// `None` once the product has been deleted from the menu.
    pub product_name: Option<String>,
    pub quantity: u32,
    pub addon_ids: Vec<AddonId>,
    pub reason: String,
}

/// A priced cart. Only `items` count towards the totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub unavailable: Vec<UnavailableCartLine>,
    #[serde(flatten)]
    pub totals: Totals,
    pub minimum_order: Price,
    pub meets_minimum: bool,
    /// Amount still missing to reach the minimum order.
    pub shortfall: Price,
}

/// Validate an opaque cart session key from the URL.
///
/// # Errors
///
/// Returns `InputError` if the key is blank, too long, or has characters
/// outside `[A-Za-z0-9_-]`.
pub fn session_key(raw: &str) -> Result<String, InputError> {
    let key = raw.trim();
    let valid = !key.is_empty()
        && key.len() <= MAX_SESSION_KEY_LENGTH
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if valid {
        Ok(key.to_owned())
    } else {
        Err(InputError("invalid cart session".to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key() {
        assert_eq!(
            session_key("3f2b9c1e-aa10-4c7e-9d0f-1a2b3c4d5e6f").unwrap(),
            "3f2b9c1e-aa10-4c7e-9d0f-1a2b3c4d5e6f"
        );
        assert!(session_key("").is_err());
        assert!(session_key("a b").is_err());
        assert!(session_key(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_cart_item_to_request() {
        let item = CartItem {
            id: CartItemId::new(1),
            session_key: "s".to_owned(),
            store_id: StoreId::new(1),
            product_id: MenuProductId::new(9),
            quantity: 2,
            addon_ids: vec![AddonId::new(4)],
            special_instructions: Some("sem cebola".to_owned()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let request = item.to_request();
        assert_eq!(request.quantity, 2);
        assert_eq!(request.addon_ids, vec![AddonId::new(4)]);
    }
}
