//! Business logic that spans several repositories.
//!
//! # Services
//!
//! - `checkout` - Cart pricing, quotes and order placement

pub mod checkout;

pub use checkout::{CheckoutService, Placement, PricingError};
