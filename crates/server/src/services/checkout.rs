//! Cart pricing and order placement.
//!
//! Every price the customer sees comes from here: lines are re-priced from
//! the stored menu on each quote, cart read and checkout.

use std::collections::HashMap;

use sqlx::PgPool;
use thiserror::Error;

use menuhub_core::checkout::{
    AddonGroupRule, CheckoutError, CheckoutStep, LineRequest, MAX_NOTE_LENGTH, PricedLine,
    ProductSnapshot, check_minimum, price_line, totals,
};
use menuhub_core::{MenuProductId, OrderType, PaymentMethod, Price};

use crate::db::{AddonRepository, CartRepository, OrderRepository, RepositoryError};
use crate::models::cart::{CartItem, CartLine, CartView, UnavailableCartLine};
use crate::models::menu::MenuProduct;
use crate::models::order::{CheckoutRequest, NewOrder, OrderWithItems, Quote};
use crate::models::store::Store;

/// Errors from pricing or placing an order.
#[derive(Debug, Error)]
pub enum PricingError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

/// How strictly an order is checked before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Public checkout: the full wizard, including the minimum order.
    Customer,
    /// Entered by staff: customer details still checked, minimum waived.
    Staff,
}

/// Checkout operations for one store.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    store: &'a Store,
}

impl<'a> CheckoutService<'a> {
    /// Create a checkout service for `store`.
    #[must_use]
    pub const fn new(pool: &'a PgPool, store: &'a Store) -> Self {
        Self { pool, store }
    }

    /// Price lines against the store's current menu.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Checkout` if a product is missing from the
    /// store or a line breaks a pricing rule.
    pub async fn price(&self, lines: &[LineRequest]) -> Result<Vec<PricedLine>, PricingError> {
        let catalog = self.catalog(lines).await?;
        Ok(lines
            .iter()
            .map(|line| catalog.price(line))
            .collect::<Result<Vec<_>, CheckoutError>>()?)
    }

    /// Load the products and addon rules that `lines` refer to.
    async fn catalog(&self, lines: &[LineRequest]) -> Result<Catalog, PricingError> {
        if lines.is_empty() {
            return Ok(Catalog::default());
        }

        let mut ids: Vec<MenuProductId> = lines.iter().map(|l| l.product_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let products = sqlx::query_as::<_, MenuProduct>(
            r"SELECT * FROM menu_products WHERE store_id = $1 AND id = ANY($2)",
        )
        .bind(self.store.id)
        .bind(&ids)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from)?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

        let groups = AddonRepository::new(self.pool)
            .groups_for_products(&ids)
            .await?
            .into_iter()
            .map(|(product, groups)| (product, groups.iter().map(|g| g.to_rule()).collect()))
            .collect();

        Ok(Catalog { products, groups })
    }

    /// Price a request without placing it.
    ///
    /// # Errors
    ///
    /// Returns `PricingError` if pricing fails.
    pub async fn quote(&self, request: &CheckoutRequest) -> Result<Quote, PricingError> {
        let requested = self.requested_lines(request).await?;
        let lines = self.price(&requested).await?;
        let totals = totals(&lines, self.store.terms(), request.order_type)?;
        Ok(Quote::new(lines, totals, self.store.minimum_order))
    }

    /// The stored cart of `session`, priced.
    ///
    /// Lines that can no longer be priced, for example because the product
    /// was marked unavailable, are listed under `unavailable` with the reason
    /// and left out of the totals. So is any line that would take the total
    /// past the largest accepted amount.
    ///
    /// # Errors
    ///
    /// Returns `PricingError` if the cart cannot be loaded.
    pub async fn cart(&self, session: &str) -> Result<CartView, PricingError> {
        let items = CartRepository::new(self.pool)
            .items(self.store.id, session)
            .await?;
        let requests: Vec<LineRequest> = items.iter().map(CartItem::to_request).collect();
        let catalog = self.catalog(&requests).await?;

        // The delivery fee is counted up front so the totals below cannot overflow.
        let mut running = self.store.delivery_fee;
        let mut priced = Vec::with_capacity(items.len());
        let mut unavailable = Vec::new();
        for (item, request) in items.iter().zip(&requests) {
            let outcome = catalog.price(request).and_then(|line| {
                running = running
                    .checked_add(line.subtotal)
                    .ok_or(CheckoutError::AmountTooLarge)?;
                Ok(line)
            });
            match outcome {
                Ok(line) => priced.push(CartLine { id: item.id, line }),
                Err(err) => {
                    tracing::debug!(item = %item.id, reason = %err, "Cart line not priced");
                    unavailable.push(UnavailableCartLine {
                        id: item.id,
                        product_id: item.product_id,
                        product_name: catalog.product_name(item.product_id),
                        quantity: request.quantity,
                        addon_ids: item.addon_ids.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let lines: Vec<PricedLine> = priced.iter().map(|l| l.line.clone()).collect();
        let totals = totals(&lines, self.store.terms(), OrderType::Delivery)?;
        let minimum_order = self.store.minimum_order;
        Ok(CartView {
            items: priced,
            unavailable,
            meets_minimum: check_minimum(totals.subtotal, minimum_order).is_ok(),
            shortfall: minimum_order.saturating_sub(totals.subtotal),
            minimum_order,
            totals,
        })
    }

    /// Validate, price and write an order.
    ///
    /// A cart named by the request is cleared in the same transaction that
    /// writes the order.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Checkout` if the cart is empty, a line cannot
    /// be priced, the customer details are incomplete, no payment method is
    /// given, or (for customer orders) the subtotal is below the minimum.
    pub async fn place(
        &self,
        request: &CheckoutRequest,
        placement: Placement,
    ) -> Result<OrderWithItems, PricingError> {
        let requested = self.requested_lines(request).await?;
        let lines = self.price(&requested).await?;
        let totals = totals(&lines, self.store.terms(), request.order_type)?;

        let minimum_order = match placement {
            Placement::Customer => self.store.minimum_order,
            Placement::Staff => Price::ZERO,
        };
        CheckoutStep::run_to_confirmation(&request.wizard_input(
            lines.len(),
            totals.subtotal,
            minimum_order,
        ))?;

        let customer = request.customer.validate(request.order_type)?;
        let payment_method: PaymentMethod = request
            .payment_method
            .ok_or(CheckoutError::MissingPaymentMethod)?;
        let special_instructions = request
            .note()
            .map_err(|_| CheckoutError::NoteTooLong {
                max: MAX_NOTE_LENGTH,
            })?;

        let order = OrderRepository::new(self.pool)
            .create(&NewOrder {
                store_id: self.store.id,
                customer,
                order_type: request.order_type,
                payment_method,
                lines,
                totals,
                special_instructions,
                estimated_delivery_time: Some(self.store.estimated_delivery_time.clone()),
                cart_session: request
                    .cart_session
                    .clone()
                    .filter(|_| request.items.is_empty()),
            })
            .await?;
        Ok(order)
    }

    /// Lines from the request body, or from the named cart when the body
    /// has none.
    async fn requested_lines(
        &self,
        request: &CheckoutRequest,
    ) -> Result<Vec<LineRequest>, PricingError> {
        if !request.items.is_empty() {
            return Ok(request.items.clone());
        }
        match request.cart_session.as_deref() {
            Some(session) => Ok(CartRepository::new(self.pool)
                .items(self.store.id, session)
                .await?
                .iter()
                .map(|item| item.to_request())
                .collect()),
            None => Ok(Vec::new()),
        }
    }
}

/// Products and addon rules loaded for one pricing pass.
#[derive(Debug, Default)]
struct Catalog {
    products: HashMap<MenuProductId, MenuProduct>,
    groups: HashMap<MenuProductId, Vec<AddonGroupRule>>,
}

impl Catalog {
    fn price(&self, line: &LineRequest) -> Result<PricedLine, CheckoutError> {
        let product = self
            .products
            .get(&line.product_id)
            .ok_or_else(|| CheckoutError::ProductUnavailable(line.product_id.to_string()))?;
        let snapshot = ProductSnapshot {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            is_available: product.is_available,
        };
        let rules = self
            .groups
            .get(&line.product_id)
            .map_or(&[][..], Vec::as_slice);
        price_line(&snapshot, rules, line)
    }

    fn product_name(&self, id: MenuProductId) -> Option<String> {
        self.products.get(&id).map(|p| p.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_is_transparent() {
        let err = PricingError::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "cart is empty");
        let err = PricingError::from(RepositoryError::NotFound);
        assert_eq!(err.to_string(), "not found");
    }
}
