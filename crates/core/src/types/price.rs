//! Monetary amounts using decimal arithmetic.
//!
//! All stores on the platform price in Brazilian reais, so a [`Price`] is a
//! bare two-decimal amount. Input accepts both the dot and the comma decimal
//! separator and an optional `R$` prefix; display uses the local format
//! (`R$ 1.234,50`).

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more than two fractional digits.
    #[error("price must have at most 2 decimal places")]
    TooPrecise,
    /// The amount is above [`Price::MAX`].
    #[error("price must be at most 99999999.99")]
    TooLarge,
}

/// A non-negative amount with at most two decimal places.
///
/// Serializes as a decimal string (`"5.90"`) and accepts either a string or
/// a JSON number when deserializing.
///
/// ```
/// use menuhub_core::Price;
///
/// let price = Price::parse("R$ 5,90").unwrap();
/// assert_eq!(price.to_string(), "R$ 5,90");
/// assert_eq!(price.checked_times(3).unwrap().to_string(), "R$ 17,70");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero reais.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount a `NUMERIC(10,2)` column holds.
    pub const MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

    /// Create a price from an amount in centavos.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// Validate a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, has more than two decimal
    /// places, or exceeds [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount.normalize().scale() > 2 {
            return Err(PriceError::TooPrecise);
        }
        if amount > Self::MAX {
            return Err(PriceError::TooLarge);
        }
        let mut amount = amount;
        amount.rescale(2);
        Ok(Self(amount))
    }

    /// Parse a price from user input.
    ///
    /// Accepts `5.90`, `5,90`, `R$ 5,90` and `1.234,50`. When both separators
    /// appear, the last one is the decimal separator.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not numeric, negative or has
    /// more than two decimal places.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed).trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let normalized = match (trimmed.rfind('.'), trimmed.rfind(',')) {
            (Some(dot), Some(comma)) if comma > dot => trimmed.replace('.', "").replace(',', "."),
            (Some(_), Some(_)) => trimmed.replace(',', ""),
            (None, Some(_)) => trimmed.replace(',', "."),
            _ => trimmed.to_owned(),
        };

        let amount =
            Decimal::from_str(&normalized).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true for a zero amount.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiply by a quantity. `None` when the product exceeds [`Price::MAX`].
    #[must_use]
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .and_then(|amount| Self::new(amount).ok())
    }

    /// Add two amounts. `None` when the sum exceeds [`Price::MAX`].
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0
            .checked_add(other.0)
            .and_then(|amount| Self::new(amount).ok())
    }

    /// Sum amounts, stopping at the first overflow.
    #[must_use]
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// Subtract, stopping at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut amount = self.0;
        amount.rescale(2);
        let text = amount.to_string();
        let (whole, frac) = text.split_once('.').unwrap_or((&text, "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "R$ {grouped},{frac}")
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separators() {
        assert_eq!(Price::parse("5.90").unwrap(), Price::from_cents(590));
        assert_eq!(Price::parse("5,90").unwrap(), Price::from_cents(590));
        assert_eq!(Price::parse("R$ 5,90").unwrap(), Price::from_cents(590));
        assert_eq!(Price::parse("R$5").unwrap(), Price::from_cents(500));
        assert_eq!(Price::parse("1.234,50").unwrap(), Price::from_cents(123_450));
        assert_eq!(Price::parse("1,234.50").unwrap(), Price::from_cents(123_450));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Price::parse("  "), Err(PriceError::Empty));
        assert_eq!(Price::parse("R$"), Err(PriceError::Empty));
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
        assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
        assert_eq!(Price::parse("1.999"), Err(PriceError::TooPrecise));
        assert_eq!(Price::parse("100000000"), Err(PriceError::TooLarge));
    }

    #[test]
    fn test_trailing_zeros_are_not_extra_precision() {
        assert_eq!(Price::parse("2.500").unwrap(), Price::from_cents(250));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_cents(590).to_string(), "R$ 5,90");
        assert_eq!(Price::from_cents(0).to_string(), "R$ 0,00");
        assert_eq!(Price::from_cents(123_450).to_string(), "R$ 1.234,50");
        assert_eq!(Price::from_cents(100_000_000).to_string(), "R$ 1.000.000,00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Price::from_cents(1_050);
        let b = Price::from_cents(250);
        assert_eq!(a.checked_add(b), Some(Price::from_cents(1_300)));
        assert_eq!(a.checked_times(3), Some(Price::from_cents(3_150)));
        assert_eq!(b.saturating_sub(a), Price::ZERO);
        assert_eq!(a.saturating_sub(b), Price::from_cents(800));
        assert_eq!(Price::checked_sum([a, b, b]), Some(Price::from_cents(1_550)));
        assert_eq!(Price::checked_sum([]), Some(Price::ZERO));
    }

    #[test]
    fn test_arithmetic_stops_at_max() {
        let max = Price::new(Price::MAX).unwrap();
        let cent = Price::from_cents(1);
        assert_eq!(max.checked_times(1), Some(max));
        assert_eq!(max.checked_times(2), None);
        assert_eq!(max.checked_add(Price::ZERO), Some(max));
        assert_eq!(max.checked_add(cent), None);
        assert_eq!(Price::checked_sum([max, cent]), None);

        // Every amount arithmetic hands out survives a serde round trip.
        let near = Price::parse("49999999.99").unwrap();
        let doubled = near.checked_times(2).unwrap();
        let json = serde_json::to_string(&doubled).unwrap();
        assert_eq!(serde_json::from_str::<Price>(&json).unwrap(), doubled);
    }

    #[test]
    fn test_serde_accepts_string_and_number() {
        let from_str: Price = serde_json::from_str("\"12.50\"").unwrap();
        let from_num: Price = serde_json::from_str("12.5").unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(serde_json::to_string(&from_str).unwrap(), "\"12.50\"");
        assert!(serde_json::from_str::<Price>("\"-3\"").is_err());
    }
}
