//! Promotion pricing for menu products.
//!
//! A product on promotion sells at `price` and shows `original_price` struck
//! through. The original price must be present and strictly higher than the
//! sale price; a product not on promotion carries no original price.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

use crate::types::Price;

/// Errors for inconsistent promotion data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromotionError {
    /// Promotion flagged but no original price given.
    #[error("a promotion needs the original price")]
    MissingOriginalPrice,
    /// Original price is not above the sale price.
    #[error("original price {original} must be higher than sale price {price}")]
    NotADiscount {
        /// Sale price.
        price: Price,
        /// Original price.
        original: Price,
    },
}

/// Check a product's promotion fields and return the original price to store.
///
/// When `is_promotion` is false any original price is dropped.
///
/// # Errors
///
/// Returns an error if a promotion has no original price or the original
/// price is not higher than the sale price.
pub fn validate_promotion(
    price: Price,
    original_price: Option<Price>,
    is_promotion: bool,
) -> Result<Option<Price>, PromotionError> {
    if !is_promotion {
        return Ok(None);
    }
    let original = original_price.ok_or(PromotionError::MissingOriginalPrice)?;
    if original <= price {
        return Err(PromotionError::NotADiscount { price, original });
    }
    Ok(Some(original))
}

/// Whole-number discount percentage, rounded to nearest (`25.00` off `100.00` is 25).
#[must_use]
pub fn discount_percent(price: Price, original: Price) -> u8 {
    if original.is_zero() || price >= original {
        return 0;
    }
    let saved = original.amount() - price.amount();
    let percent = (saved * Decimal::ONE_HUNDRED / original.amount()).round();
    percent.to_u8().unwrap_or(100)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_not_on_promotion_drops_original() {
        let result = validate_promotion(Price::from_cents(1_000), Some(Price::from_cents(2_000)), false);
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_promotion_requires_original() {
        assert_eq!(
            validate_promotion(Price::from_cents(1_000), None, true),
            Err(PromotionError::MissingOriginalPrice)
        );
    }

    #[test]
    fn test_promotion_requires_discount() {
        let price = Price::from_cents(1_000);
        assert!(matches!(
            validate_promotion(price, Some(price), true),
            Err(PromotionError::NotADiscount { .. })
        ));
        assert_eq!(
            validate_promotion(price, Some(Price::from_cents(1_500)), true),
            Ok(Some(Price::from_cents(1_500)))
        );
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(discount_percent(Price::from_cents(7_500), Price::from_cents(10_000)), 25);
        assert_eq!(discount_percent(Price::from_cents(1_990), Price::from_cents(2_990)), 33);
        assert_eq!(discount_percent(Price::from_cents(500), Price::from_cents(500)), 0);
        assert_eq!(discount_percent(Price::ZERO, Price::ZERO), 0);
    }
}
