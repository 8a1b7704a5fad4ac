//! Cart pricing, minimum-order rules and the checkout wizard.
//!
//! The server prices every cart from stored product and addon rows; client
//! supplied prices are never trusted. A line costs
//! `(product price + selected addon prices) × quantity`, the delivery fee is
//! added only for delivery orders, and the subtotal must reach the store's
//! minimum order before the customer may leave the cart step.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    AddonGroupId, AddonId, Email, MenuProductId, OrderType, PaymentMethod, Phone, PhoneError,
    Price,
};

/// Largest quantity accepted for one cart line.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Longest accepted free-text note on a line or an order.
pub const MAX_NOTE_LENGTH: usize = 500;

/// Longest accepted table number on a dine-in order.
pub const MAX_TABLE_NUMBER_LENGTH: usize = 20;

/// Errors raised while pricing a cart or moving through checkout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("quantity must be between 1 and {max}")]
    InvalidQuantity { max: u32 },
    #[error("product {0} is not available")]
    ProductUnavailable(String),
    #[error("addon {0} is not offered for this product")]
    AddonNotOffered(AddonId),
    #[error("addon {0} is not available")]
    AddonUnavailable(String),
    #[error("addon {0} selected more than once")]
    DuplicateAddon(AddonId),
    #[error("choose at least {min} option(s) for {group}")]
    TooFewSelections { group: String, min: u32 },
    #[error("choose at most {max} option(s) for {group}")]
    TooManySelections { group: String, max: u32 },
    #[error("minimum order is {minimum}; add {shortfall} more")]
    BelowMinimum { minimum: Price, shortfall: Price },
    #[error("customer name is required")]
    MissingCustomerName,
    #[error("invalid phone: {0}")]
    InvalidPhone(#[from] PhoneError),
    #[error("invalid email")]
    InvalidEmail,
    #[error("delivery address is required for delivery orders")]
    MissingAddress,
    #[error("table number is required for dine-in orders")]
    MissingTableNumber,
    #[error("table number must be at most {max} characters")]
    TableNumberTooLong { max: usize },
    #[error("payment method is required")]
    MissingPaymentMethod,
    #[error("note must be at most {max} characters")]
    NoteTooLong { max: usize },
    #[error("order is already confirmed")]
    AlreadyConfirmed,
    #[error("order amount exceeds the largest accepted total")]
    AmountTooLarge,
}

// =============================================================================
// Catalog snapshots
// =============================================================================

/// The fields of a menu product that pricing needs.
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    pub id: MenuProductId,
    pub name: String,
    pub price: Price,
    pub is_available: bool,
}

/// One option inside an addon group.
#[derive(Debug, Clone)]
pub struct AddonOption {
    pub id: AddonId,
    pub name: String,
    pub price: Price,
    pub is_available: bool,
}

/// An addon group with its selection limits.
#[derive(Debug, Clone)]
pub struct AddonGroupRule {
    pub id: AddonGroupId,
    pub name: String,
    pub is_required: bool,
    pub min_selections: u32,
    pub max_selections: u32,
    pub addons: Vec<AddonOption>,
}

impl AddonGroupRule {
    /// Smallest number of selections the group accepts.
    #[must_use]
    pub fn effective_min(&self) -> u32 {
        if self.is_required {
            self.min_selections.max(1)
        } else {
            self.min_selections
        }
    }
}

// =============================================================================
// Lines
// =============================================================================

/// A cart line as the customer submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub product_id: MenuProductId,
    pub quantity: u32,
    #[serde(default)]
    pub addon_ids: Vec<AddonId>,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

/// An addon as recorded on a priced line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedAddon {
    pub id: AddonId,
    pub name: String,
    pub price: Price,
}

/// A line priced from catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub product_id: MenuProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub addons: Vec<SelectedAddon>,
    pub subtotal: Price,
    pub special_instructions: Option<String>,
}

/// Price one cart line.
///
/// # Errors
///
/// Returns an error if the quantity is out of range, the product or a
/// selected addon is unavailable, an addon is not offered for the product or
/// is picked twice, a group's selection count is outside its limits, or the
/// note is too long.
pub fn price_line(
    product: &ProductSnapshot,
    groups: &[AddonGroupRule],
    request: &LineRequest,
) -> Result<PricedLine, CheckoutError> {
    if request.quantity == 0 || request.quantity > MAX_LINE_QUANTITY {
        return Err(CheckoutError::InvalidQuantity {
            max: MAX_LINE_QUANTITY,
        });
    }
    if !product.is_available {
        return Err(CheckoutError::ProductUnavailable(product.name.clone()));
    }
    let special_instructions = clean_note(request.special_instructions.as_deref())?;

    let mut addons = Vec::with_capacity(request.addon_ids.len());
    for (index, addon_id) in request.addon_ids.iter().enumerate() {
        if request.addon_ids.iter().take(index).any(|prev| prev == addon_id) {
            return Err(CheckoutError::DuplicateAddon(*addon_id));
        }
        let option = groups
            .iter()
            .flat_map(|group| group.addons.iter())
            .find(|option| option.id == *addon_id)
            .ok_or(CheckoutError::AddonNotOffered(*addon_id))?;
        if !option.is_available {
            return Err(CheckoutError::AddonUnavailable(option.name.clone()));
        }
        addons.push(SelectedAddon {
            id: option.id,
            name: option.name.clone(),
            price: option.price,
        });
    }

    for group in groups {
        let picked = group
            .addons
            .iter()
            .filter(|option| request.addon_ids.contains(&option.id))
            .count();
        let picked = u32::try_from(picked).unwrap_or(u32::MAX);
        let min = group.effective_min();
        if picked < min {
            return Err(CheckoutError::TooFewSelections {
                group: group.name.clone(),
                min,
            });
        }
        if picked > group.max_selections {
            return Err(CheckoutError::TooManySelections {
                group: group.name.clone(),
                max: group.max_selections,
            });
        }
    }

    let unit_price = Price::checked_sum(addons.iter().map(|addon| addon.price))
        .and_then(|extras| product.price.checked_add(extras))
        .ok_or(CheckoutError::AmountTooLarge)?;
    let subtotal = unit_price
        .checked_times(request.quantity)
        .ok_or(CheckoutError::AmountTooLarge)?;
    Ok(PricedLine {
        product_id: product.id,
        product_name: product.name.clone(),
        quantity: request.quantity,
        unit_price,
        addons,
        subtotal,
        special_instructions,
    })
}

fn clean_note(note: Option<&str>) -> Result<Option<String>, CheckoutError> {
    let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if note.chars().count() > MAX_NOTE_LENGTH {
        return Err(CheckoutError::NoteTooLong {
            max: MAX_NOTE_LENGTH,
        });
    }
    Ok(Some(note.to_owned()))
}

// =============================================================================
// Totals
// =============================================================================

/// Store-level pricing terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTerms {
    pub delivery_fee: Price,
    pub minimum_order: Price,
}

/// Order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub total: Price,
}

/// Sum lines and apply the delivery fee for delivery orders.
///
/// # Errors
///
/// Returns [`CheckoutError::AmountTooLarge`] when the subtotal or total
/// exceeds [`Price::MAX`].
pub fn totals(
    lines: &[PricedLine],
    terms: StoreTerms,
    order_type: OrderType,
) -> Result<Totals, CheckoutError> {
    let subtotal = Price::checked_sum(lines.iter().map(|line| line.subtotal))
        .ok_or(CheckoutError::AmountTooLarge)?;
    let delivery_fee = if order_type.is_delivery() {
        terms.delivery_fee
    } else {
        Price::ZERO
    };
    let total = subtotal
        .checked_add(delivery_fee)
        .ok_or(CheckoutError::AmountTooLarge)?;
    Ok(Totals {
        subtotal,
        delivery_fee,
        total,
    })
}

/// Check a subtotal against the store minimum.
///
/// # Errors
///
/// Returns [`CheckoutError::BelowMinimum`] with the missing amount when the
/// subtotal is short.
pub fn check_minimum(subtotal: Price, minimum: Price) -> Result<(), CheckoutError> {
    if subtotal < minimum {
        return Err(CheckoutError::BelowMinimum {
            minimum,
            shortfall: minimum.saturating_sub(subtotal),
        });
    }
    Ok(())
}

// =============================================================================
// Customer details
// =============================================================================

/// Customer details as typed into the info step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub table_number: Option<String>,
}

/// Customer details after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCustomer {
    pub name: String,
    pub phone: Phone,
    pub email: Option<Email>,
    pub delivery_address: Option<String>,
    /// Set only on dine-in orders.
    pub table_number: Option<String>,
}

impl CustomerDetails {
    /// Validate the details for the given order type.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, the phone or email is invalid,
    /// a delivery order has no address, or a dine-in order has no table.
    pub fn validate(&self, order_type: OrderType) -> Result<ValidCustomer, CheckoutError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CheckoutError::MissingCustomerName);
        }
        let phone = Phone::parse(&self.phone)?;
        let email = match self.email.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                Some(Email::parse(raw).map_err(|_| CheckoutError::InvalidEmail)?)
            }
            _ => None,
        };
        let delivery_address = self
            .delivery_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_owned);
        if order_type.is_delivery() && delivery_address.is_none() {
            return Err(CheckoutError::MissingAddress);
        }
        let table_number = if order_type.is_dine_in() {
            let table = self
                .table_number
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or(CheckoutError::MissingTableNumber)?;
            if table.chars().count() > MAX_TABLE_NUMBER_LENGTH {
                return Err(CheckoutError::TableNumberTooLong {
                    max: MAX_TABLE_NUMBER_LENGTH,
                });
            }
            Some(table.to_owned())
        } else {
            None
        };
        Ok(ValidCustomer {
            name: name.to_owned(),
            phone,
            email,
            delivery_address,
            table_number,
        })
    }
}

// =============================================================================
// Wizard
// =============================================================================

/// Steps of the checkout wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Cart,
    Info,
    Payment,
    Confirmation,
}

/// Everything the wizard looks at to decide whether a step may advance.
#[derive(Debug, Clone, Copy)]
pub struct WizardInput<'a> {
    pub line_count: usize,
    pub subtotal: Price,
    pub minimum_order: Price,
    pub order_type: OrderType,
    pub customer: &'a CustomerDetails,
    pub payment_method: Option<PaymentMethod>,
}

impl CheckoutStep {
    /// Move to the next step if its guard passes.
    ///
    /// # Errors
    ///
    /// - Cart → Info: the cart is empty or below the minimum order.
    /// - Info → Payment: customer details are invalid.
    /// - Payment → Confirmation: no payment method chosen.
    /// - Confirmation: the order is already placed.
    pub fn advance(self, input: &WizardInput<'_>) -> Result<Self, CheckoutError> {
        match self {
            Self::Cart => {
                if input.line_count == 0 {
                    return Err(CheckoutError::EmptyCart);
                }
                check_minimum(input.subtotal, input.minimum_order)?;
                Ok(Self::Info)
            }
            Self::Info => {
                input.customer.validate(input.order_type)?;
                Ok(Self::Payment)
            }
            Self::Payment => {
                input
                    .payment_method
                    .ok_or(CheckoutError::MissingPaymentMethod)?;
                Ok(Self::Confirmation)
            }
            Self::Confirmation => Err(CheckoutError::AlreadyConfirmed),
        }
    }

    /// Step back one step. Confirmation is final.
    #[must_use]
    pub const fn back(self) -> Self {
        match self {
            Self::Cart | Self::Info => Self::Cart,
            Self::Payment => Self::Info,
            Self::Confirmation => Self::Confirmation,
        }
    }

    /// Run every guard from the cart to confirmation.
    ///
    /// Used when a whole checkout arrives in a single request.
    ///
    /// # Errors
    ///
    /// Returns the first guard that fails.
    pub fn run_to_confirmation(input: &WizardInput<'_>) -> Result<Self, CheckoutError> {
        let mut step = Self::Cart;
        while step != Self::Confirmation {
            step = step.advance(input)?;
        }
        Ok(step)
    }
}

// =============================================================================
// Order numbers
// =============================================================================

/// Characters used in order numbers; excludes look-alikes (0/O, 1/I/L).
const ORDER_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Length of the random part of an order number.
const ORDER_NUMBER_SUFFIX: usize = 5;

/// Generate a human-friendly order number such as `250314-K7QX2`.
///
/// The date prefix keeps numbers sortable; uniqueness is enforced by the
/// database and the caller retries on collision.
pub fn generate_order_number<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let mut number = now.format("%y%m%d-").to_string();
    for _ in 0..ORDER_NUMBER_SUFFIX {
        let index = rng.random_range(0..ORDER_NUMBER_ALPHABET.len());
        let ch = ORDER_NUMBER_ALPHABET.get(index).copied().unwrap_or(b'X');
        number.push(char::from(ch));
    }
    number
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn burger() -> ProductSnapshot {
        ProductSnapshot {
            id: MenuProductId::new(1),
            name: "X-Burger".to_owned(),
            price: Price::from_cents(2_500),
            is_available: true,
        }
    }

    fn extras() -> AddonGroupRule {
        AddonGroupRule {
            id: AddonGroupId::new(1),
            name: "Extras".to_owned(),
            is_required: false,
            min_selections: 0,
            max_selections: 2,
            addons: vec![
                AddonOption {
                    id: AddonId::new(10),
                    name: "Bacon".to_owned(),
                    price: Price::from_cents(400),
                    is_available: true,
                },
                AddonOption {
                    id: AddonId::new(11),
                    name: "Cheddar".to_owned(),
                    price: Price::from_cents(300),
                    is_available: true,
                },
                AddonOption {
                    id: AddonId::new(12),
                    name: "Egg".to_owned(),
                    price: Price::from_cents(200),
                    is_available: false,
                },
            ],
        }
    }

    fn bread() -> AddonGroupRule {
        AddonGroupRule {
            id: AddonGroupId::new(2),
            name: "Bread".to_owned(),
            is_required: true,
            min_selections: 0,
            max_selections: 1,
            addons: vec![
                AddonOption {
                    id: AddonId::new(20),
                    name: "Brioche".to_owned(),
                    price: Price::ZERO,
                    is_available: true,
                },
                AddonOption {
                    id: AddonId::new(21),
                    name: "Australian".to_owned(),
                    price: Price::from_cents(150),
                    is_available: true,
                },
            ],
        }
    }

    fn line(quantity: u32, addons: &[i32]) -> LineRequest {
        LineRequest {
            product_id: MenuProductId::new(1),
            quantity,
            addon_ids: addons.iter().copied().map(AddonId::new).collect(),
            special_instructions: None,
        }
    }

    #[test]
    fn test_price_line_with_addons() {
        let priced = price_line(&burger(), &[extras(), bread()], &line(2, &[10, 11, 21])).unwrap();
        // 25.00 + 4.00 + 3.00 + 1.50 = 33.50, times 2
        assert_eq!(priced.unit_price, Price::from_cents(3_350));
        assert_eq!(priced.subtotal, Price::from_cents(6_700));
        assert_eq!(priced.addons.len(), 3);
    }

    #[test]
    fn test_price_line_without_groups() {
        let priced = price_line(&burger(), &[], &line(1, &[])).unwrap();
        assert_eq!(priced.subtotal, Price::from_cents(2_500));
    }

    #[test]
    fn test_required_group_needs_one() {
        let err = price_line(&burger(), &[bread()], &line(1, &[])).unwrap_err();
        assert_eq!(
            err,
            CheckoutError::TooFewSelections {
                group: "Bread".to_owned(),
                min: 1
            }
        );
    }

    #[test]
    fn test_group_max_enforced() {
        let err = price_line(&burger(), &[bread()], &line(1, &[20, 21])).unwrap_err();
        assert!(matches!(err, CheckoutError::TooManySelections { max: 1, .. }));
    }

    #[test]
    fn test_addon_rules() {
        assert_eq!(
            price_line(&burger(), &[extras()], &line(1, &[99])).unwrap_err(),
            CheckoutError::AddonNotOffered(AddonId::new(99))
        );
        assert_eq!(
            price_line(&burger(), &[extras()], &line(1, &[12])).unwrap_err(),
            CheckoutError::AddonUnavailable("Egg".to_owned())
        );
        assert_eq!(
            price_line(&burger(), &[extras()], &line(1, &[10, 10])).unwrap_err(),
            CheckoutError::DuplicateAddon(AddonId::new(10))
        );
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(price_line(&burger(), &[], &line(0, &[])).is_err());
        assert!(price_line(&burger(), &[], &line(100, &[])).is_err());
        assert!(price_line(&burger(), &[], &line(99, &[])).is_ok());
    }

    #[test]
    fn test_unavailable_product() {
        let mut product = burger();
        product.is_available = false;
        assert_eq!(
            price_line(&product, &[], &line(1, &[])).unwrap_err(),
            CheckoutError::ProductUnavailable("X-Burger".to_owned())
        );
    }

    #[test]
    fn test_note_is_trimmed_and_bounded() {
        let mut request = line(1, &[]);
        request.special_instructions = Some("  sem cebola ".to_owned());
        let priced = price_line(&burger(), &[], &request).unwrap();
        assert_eq!(priced.special_instructions.as_deref(), Some("sem cebola"));

        request.special_instructions = Some("x".repeat(MAX_NOTE_LENGTH + 1));
        assert!(price_line(&burger(), &[], &request).is_err());
    }

    #[test]
    fn test_delivery_fee_only_for_delivery() {
        let lines = vec![price_line(&burger(), &[], &line(1, &[])).unwrap()];
        let terms = StoreTerms {
            delivery_fee: Price::from_cents(500),
            minimum_order: Price::ZERO,
        };
        let delivery = totals(&lines, terms, OrderType::Delivery).unwrap();
        assert_eq!(delivery.total, Price::from_cents(3_000));
        let pickup = totals(&lines, terms, OrderType::Pickup).unwrap();
        assert_eq!(pickup.delivery_fee, Price::ZERO);
        assert_eq!(pickup.total, Price::from_cents(2_500));
    }

    #[test]
    fn test_amounts_above_max_are_rejected() {
        let mut pricey = burger();
        pricey.price = Price::parse("50000000.00").unwrap();
        assert_eq!(
            price_line(&pricey, &[], &line(2, &[])).unwrap_err(),
            CheckoutError::AmountTooLarge
        );

        let one = price_line(&pricey, &[], &line(1, &[])).unwrap();
        let terms = StoreTerms {
            delivery_fee: Price::ZERO,
            minimum_order: Price::ZERO,
        };
        assert_eq!(
            totals(&[one.clone(), one], terms, OrderType::Pickup).unwrap_err(),
            CheckoutError::AmountTooLarge
        );

        pricey.price = Price::new(Price::MAX).unwrap();
        let at_max = price_line(&pricey, &[], &line(1, &[])).unwrap();
        assert!(totals(std::slice::from_ref(&at_max), terms, OrderType::Pickup).is_ok());
        let with_fee = StoreTerms {
            delivery_fee: Price::from_cents(1),
            minimum_order: Price::ZERO,
        };
        assert_eq!(
            totals(&[at_max], with_fee, OrderType::Delivery).unwrap_err(),
            CheckoutError::AmountTooLarge
        );
    }

    #[test]
    fn test_minimum_order_shortfall() {
        let err = check_minimum(Price::from_cents(1_800), Price::from_cents(2_500)).unwrap_err();
        assert_eq!(
            err,
            CheckoutError::BelowMinimum {
                minimum: Price::from_cents(2_500),
                shortfall: Price::from_cents(700),
            }
        );
        assert!(check_minimum(Price::from_cents(2_500), Price::from_cents(2_500)).is_ok());
    }

    fn details() -> CustomerDetails {
        CustomerDetails {
            name: "Maria".to_owned(),
            phone: "(11) 98765-4321".to_owned(),
            email: None,
            delivery_address: Some("Rua A, 10".to_owned()),
            table_number: None,
        }
    }

    #[test]
    fn test_wizard_walks_forward_and_back() {
        let customer = details();
        let input = WizardInput {
            line_count: 1,
            subtotal: Price::from_cents(3_000),
            minimum_order: Price::from_cents(2_500),
            order_type: OrderType::Delivery,
            customer: &customer,
            payment_method: Some(PaymentMethod::Pix),
        };
        let step = CheckoutStep::Cart.advance(&input).unwrap();
        assert_eq!(step, CheckoutStep::Info);
        let step = step.advance(&input).unwrap();
        assert_eq!(step, CheckoutStep::Payment);
        assert_eq!(step.back(), CheckoutStep::Info);
        let step = step.advance(&input).unwrap();
        assert_eq!(step, CheckoutStep::Confirmation);
        assert_eq!(step.back(), CheckoutStep::Confirmation);
        assert_eq!(step.advance(&input), Err(CheckoutError::AlreadyConfirmed));
    }

    #[test]
    fn test_wizard_guards() {
        let customer = details();
        let mut input = WizardInput {
            line_count: 0,
            subtotal: Price::ZERO,
            minimum_order: Price::from_cents(2_500),
            order_type: OrderType::Delivery,
            customer: &customer,
            payment_method: None,
        };
        assert_eq!(
            CheckoutStep::Cart.advance(&input),
            Err(CheckoutError::EmptyCart)
        );
        input.line_count = 1;
        input.subtotal = Price::from_cents(1_000);
        assert!(matches!(
            CheckoutStep::Cart.advance(&input),
            Err(CheckoutError::BelowMinimum { .. })
        ));
        assert_eq!(
            CheckoutStep::Payment.advance(&input),
            Err(CheckoutError::MissingPaymentMethod)
        );
    }

    #[test]
    fn test_address_required_only_for_delivery() {
        let customer = CustomerDetails {
            delivery_address: None,
            ..details()
        };
        let mut input = WizardInput {
            line_count: 1,
            subtotal: Price::from_cents(3_000),
            minimum_order: Price::ZERO,
            order_type: OrderType::Delivery,
            customer: &customer,
            payment_method: None,
        };
        assert_eq!(
            CheckoutStep::Info.advance(&input),
            Err(CheckoutError::MissingAddress)
        );
        input.order_type = OrderType::Pickup;
        assert_eq!(
            CheckoutStep::Info.advance(&input),
            Ok(CheckoutStep::Payment)
        );
    }

    #[test]
    fn test_table_number_required_only_for_dine_in() {
        let mut customer = details();
        assert_eq!(
            customer.validate(OrderType::DineIn),
            Err(CheckoutError::MissingTableNumber)
        );
        customer.table_number = Some("   ".to_owned());
        assert_eq!(
            customer.validate(OrderType::DineIn),
            Err(CheckoutError::MissingTableNumber)
        );
        customer.table_number = Some("x".repeat(MAX_TABLE_NUMBER_LENGTH + 1));
        assert!(matches!(
            customer.validate(OrderType::DineIn),
            Err(CheckoutError::TableNumberTooLong { .. })
        ));

        customer.table_number = Some(" 12 ".to_owned());
        let valid = customer.validate(OrderType::DineIn).unwrap();
        assert_eq!(valid.table_number.as_deref(), Some("12"));
        let valid = customer.validate(OrderType::Pickup).unwrap();
        assert_eq!(valid.table_number, None);
    }

    #[test]
    fn test_run_to_confirmation_reports_first_failure() {
        let customer = CustomerDetails::default();
        let input = WizardInput {
            line_count: 1,
            subtotal: Price::from_cents(5_000),
            minimum_order: Price::ZERO,
            order_type: OrderType::Pickup,
            customer: &customer,
            payment_method: None,
        };
        assert_eq!(
            CheckoutStep::run_to_confirmation(&input),
            Err(CheckoutError::MissingCustomerName)
        );
    }

    #[test]
    fn test_customer_validation_normalizes() {
        let mut customer = details();
        customer.email = Some(" Maria@Example.com ".to_owned());
        let valid = customer.validate(OrderType::Delivery).unwrap();
        assert_eq!(valid.phone.as_str(), "11987654321");
        assert_eq!(valid.email.unwrap().as_str(), "maria@example.com");

        customer.email = Some("   ".to_owned());
        assert!(customer.validate(OrderType::Delivery).unwrap().email.is_none());

        customer.email = Some("broken".to_owned());
        assert_eq!(
            customer.validate(OrderType::Delivery),
            Err(CheckoutError::InvalidEmail)
        );
    }

    #[test]
    fn test_order_number_format() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let number = generate_order_number(now, &mut rng);
        assert!(number.starts_with("250314-"));
        assert_eq!(number.len(), 7 + ORDER_NUMBER_SUFFIX);
        assert!(
            number[7..]
                .bytes()
                .all(|b| ORDER_NUMBER_ALPHABET.contains(&b))
        );
    }
}
