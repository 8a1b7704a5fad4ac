//! Database operations for menuhub `PostgreSQL`.
//!
//! ## Tables
//!
//! - `users` - Platform users and their roles
//! - `companies` - Restaurant groups owning stores
//! - `stores` - Restaurant locations (slug, fees, AI agent settings)
//! - `menu_sections` / `menu_products` - Menus, ordered by `display_order`
//! - `addon_groups` / `addons` - Product options
//! - `cart_items` - Server-side carts keyed by session and store
//! - `orders` / `order_items` - Placed orders with priced line snapshots
//! - `customers` / `customer_interactions` - Per-store customer records
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p menuhub-cli -- migrate
//! ```

pub mod addons;
pub mod cart;
pub mod companies;
pub mod customers;
pub mod menu;
pub mod orders;
pub mod stats;
pub mod stores;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addons::AddonRepository;
pub use cart::CartRepository;
pub use companies::CompanyRepository;
pub use customers::CustomerRepository;
pub use menu::MenuRepository;
pub use orders::OrderRepository;
pub use stats::StatsRepository;
pub use stores::StoreRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique or foreign key violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Row rejected by a check constraint.
    #[error("invalid data: {0}")]
    Invalid(String),
}

impl RepositoryError {
    /// Classify a write error, naming the entity in conflict messages.
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(format!("{what} already exists"));
            }
            if db_err.is_foreign_key_violation() {
                return Self::Conflict(format!("{what} references a missing record"));
            }
            if db_err.is_check_violation() {
                let constraint = db_err.constraint().unwrap_or("check");
                return Self::Invalid(format!("{what} violates {constraint}"));
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
