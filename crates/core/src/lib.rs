//! Menuhub Core - Shared domain library.
//!
//! This crate provides the types and rules used across all menuhub components:
//! - `server` - JSON API for stores, menus, orders and customers
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Database encoding for the newtypes is available behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, phones, slugs and statuses
//! - [`ordering`] - Display-order planning for drag-and-drop reordering
//! - [`checkout`] - Cart pricing, minimum-order rules and the checkout wizard
//! - [`promotion`] - Sale/original price rules for products on promotion

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod ordering;
pub mod promotion;
pub mod types;

pub use types::*;
