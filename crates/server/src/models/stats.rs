//! Dashboard statistics.

use serde::Serialize;

use menuhub_core::Price;

/// Figures for one store's dashboard. "Today" follows the configured
/// time zone.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_sales: Price,
    pub today_orders: i64,
    /// Orders not yet delivered, regardless of date.
    pub active_orders: i64,
    pub average_order_value: Price,
}

/// Customer figures for one store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    pub total_customers: i64,
    pub new_this_month: i64,
    pub active_customers: i64,
    pub total_interactions: i64,
}

/// Platform-wide figures.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_companies: i64,
    pub total_stores: i64,
    pub active_stores: i64,
    pub today_sales: Price,
    pub today_orders: i64,
}
