//! Orders and checkout bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use menuhub_core::checkout::{
    CustomerDetails, LineRequest, MAX_NOTE_LENGTH, PricedLine, SelectedAddon, Totals,
    ValidCustomer, WizardInput,
};
use menuhub_core::{
    CustomerId, MenuProductId, OrderId, OrderItemId, OrderStatus, OrderType, PaymentMethod, Price,
    StoreId,
};

use super::{InputError, optional_text};

/// A placed order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub store_id: StoreId,
    pub order_number: String,
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub delivery_address: Option<String>,
    pub table_number: Option<String>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub total: Price,
    pub special_instructions: Option<String>,
    pub estimated_delivery_time: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of a placed order, with the product name and prices as charged.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<MenuProductId>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Price,
    pub addons: Json<Vec<SelectedAddon>>,
    pub subtotal: Price,
    pub special_instructions: Option<String>,
}

/// An order with its items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Body of `POST /api/menu/{slug}/checkout`, `POST /api/menu/{slug}/quote`
/// and `POST /api/stores/{id}/orders`.
///
/// `items` may be left empty when `cartSession` names a stored cart.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub customer: CustomerDetails,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub items: Vec<LineRequest>,
    #[serde(default)]
    pub cart_session: Option<String>,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

impl CheckoutRequest {
    /// Order-level note, trimmed.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if the note is too long.
    pub fn note(&self) -> Result<Option<String>, InputError> {
        optional_text(
            self.special_instructions.as_deref(),
            "specialInstructions",
            MAX_NOTE_LENGTH,
        )
    }

    /// What the checkout wizard needs to judge this request.
    #[must_use]
    pub fn wizard_input(&self, line_count: usize, subtotal: Price, minimum_order: Price) -> WizardInput<'_> {
        WizardInput {
            line_count,
            subtotal,
            minimum_order,
            order_type: self.order_type,
            customer: &self.customer,
            payment_method: self.payment_method,
        }
    }
}

/// A fully validated order ready to be written.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub store_id: StoreId,
    pub customer: ValidCustomer,
    pub order_type: OrderType,
    pub payment_method: PaymentMethod,
    pub lines: Vec<PricedLine>,
    pub totals: Totals,
    pub special_instructions: Option<String>,
    pub estimated_delivery_time: Option<String>,
    /// Cart emptied in the same transaction that writes the order.
    pub cart_session: Option<String>,
}

/// Body of `PUT /api/stores/{id}/orders/{oid}/status`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UpdateStatus {
    pub status: OrderStatus,
}

/// Query string of `GET /api/stores/{id}/orders`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// A priced cart that has not been ordered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub lines: Vec<PricedLine>,
    #[serde(flatten)]
    pub totals: Totals,
    pub minimum_order: Price,
    pub meets_minimum: bool,
    pub shortfall: Price,
}

impl Quote {
    /// Build a quote from priced lines.
    #[must_use]
    pub fn new(lines: Vec<PricedLine>, totals: Totals, minimum_order: Price) -> Self {
        Self {
            lines,
            totals,
            minimum_order,
            meets_minimum: totals.subtotal >= minimum_order,
            shortfall: minimum_order.saturating_sub(totals.subtotal),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_request_shape() {
        let body: CheckoutRequest = serde_json::from_str(
            r#"{
                "orderType": "pickup",
                "customer": {"name": "Ana", "phone": "(11) 98888-7777"},
                "paymentMethod": "pix",
                "items": [{"productId": 3, "quantity": 2, "addonIds": [7]}],
                "specialInstructions": "  tocar a campainha "
            }"#,
        )
        .unwrap();
        assert_eq!(body.order_type, OrderType::Pickup);
        assert_eq!(body.payment_method, Some(PaymentMethod::Pix));
        assert_eq!(body.items.len(), 1);
        assert_eq!(body.note().unwrap().as_deref(), Some("tocar a campainha"));
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(serde_json::from_str::<UpdateStatus>(r#"{"status":"cancelled"}"#).is_err());
        let ok: UpdateStatus = serde_json::from_str(r#"{"status":"ready"}"#).unwrap();
        assert_eq!(ok.status, OrderStatus::Ready);
    }

    #[test]
    fn test_quote_shortfall() {
        let totals = Totals {
            subtotal: Price::from_cents(1_500),
            delivery_fee: Price::from_cents(500),
            total: Price::from_cents(2_000),
        };
        let quote = Quote::new(Vec::new(), totals, Price::from_cents(2_000));
        assert!(!quote.meets_minimum);
        assert_eq!(quote.shortfall, Price::from_cents(500));

        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["subtotal"], "15.00");
        assert_eq!(json["meetsMinimum"], false);
    }
}
