//! Order handlers for store staff.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use menuhub_core::{OrderId, StoreId};

use super::stores::load_store;
use crate::db::{OrderRepository, StatsRepository};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::order::{CheckoutRequest, Order, OrderFilter, OrderWithItems, UpdateStatus};
use crate::models::stats::DashboardStats;
use crate::services::{CheckoutService, Placement};
use crate::state::AppState;

/// `GET /api/stores/{id}/orders?status=`
pub async fn index(
    State(state): State<AppState>,
    AppPath(store): AppPath<StoreId>,
    AppQuery(filter): AppQuery<OrderFilter>,
) -> Result<AppJson<Vec<OrderWithItems>>> {
    load_store(&state, store).await?;
    let orders = OrderRepository::new(state.pool())
        .list(store, filter.status)
        .await?;
    Ok(AppJson(orders))
}

/// `GET /api/stores/{id}/orders/{oid}`
pub async fn show(
    State(state): State<AppState>,
    AppPath((store, id)): AppPath<(StoreId, OrderId)>,
) -> Result<AppJson<OrderWithItems>> {
    let order = OrderRepository::new(state.pool())
        .get(store, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;
    Ok(AppJson(order))
}

/// `POST /api/stores/{id}/orders`
///
/// Orders taken by staff (phone, counter) skip the minimum order check.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    AppPath(store): AppPath<StoreId>,
    AppJson(body): AppJson<CheckoutRequest>,
) -> Result<(StatusCode, AppJson<OrderWithItems>)> {
    let store = load_store(&state, store).await?;
    let order = CheckoutService::new(state.pool(), &store)
        .place(&body, Placement::Staff)
        .await?;
    Ok((StatusCode::CREATED, AppJson(order)))
}

/// `PUT /api/stores/{id}/orders/{oid}/status`
#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    AppPath((store, id)): AppPath<(StoreId, OrderId)>,
    AppJson(body): AppJson<UpdateStatus>,
) -> Result<AppJson<Order>> {
    let order = OrderRepository::new(state.pool())
        .update_status(store, id, body.status)
        .await?;
    tracing::info!(order_id = %order.id, status = ?order.status, "Order status set");
    Ok(AppJson(order))
}

/// `POST /api/stores/{id}/orders/{oid}/advance`
#[instrument(skip(state))]
pub async fn advance(
    State(state): State<AppState>,
    AppPath((store, id)): AppPath<(StoreId, OrderId)>,
) -> Result<AppJson<Order>> {
    let order = OrderRepository::new(state.pool()).advance(store, id).await?;
    tracing::info!(order_id = %order.id, status = ?order.status, "Order advanced");
    Ok(AppJson(order))
}

/// `GET /api/stores/{id}/stats`
pub async fn stats(
    State(state): State<AppState>,
    AppPath(store): AppPath<StoreId>,
) -> Result<AppJson<DashboardStats>> {
    load_store(&state, store).await?;
    let stats = StatsRepository::new(state.pool(), &state.config().timezone)
        .dashboard(store)
        .await?;
    Ok(AppJson(stats))
}
