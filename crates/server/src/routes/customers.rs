//! Customer records and interaction history.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use menuhub_core::{CustomerId, StoreId};

use super::stores::load_store;
use crate::db::{CustomerRepository, StatsRepository};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::customer::{
    Customer, CustomerSearch, CustomerWithInteractions, Interaction, NewCustomer,
    NewInteraction, UpdateCustomer,
};
use crate::models::stats::CustomerStats;
use crate::state::AppState;

/// `GET /api/stores/{id}/customers?search=`
pub async fn index(
    State(state): State<AppState>,
    AppPath(store): AppPath<StoreId>,
    AppQuery(search): AppQuery<CustomerSearch>,
) -> Result<AppJson<Vec<CustomerWithInteractions>>> {
    load_store(&state, store).await?;
    let customers = CustomerRepository::new(state.pool())
        .list(store, &search)
        .await?;
    Ok(AppJson(customers))
}

/// `GET /api/stores/{id}/customers/stats`
pub async fn stats(
    State(state): State<AppState>,
    AppPath(store): AppPath<StoreId>,
) -> Result<AppJson<CustomerStats>> {
    load_store(&state, store).await?;
    let stats = StatsRepository::new(state.pool(), &state.config().timezone)
        .customers(store)
        .await?;
    Ok(AppJson(stats))
}

/// `POST /api/stores/{id}/customers`
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    AppPath(store): AppPath<StoreId>,
    AppJson(body): AppJson<NewCustomer>,
) -> Result<(StatusCode, AppJson<Customer>)> {
    let body = body.normalized()?;
    load_store(&state, store).await?;
    let customer = CustomerRepository::new(state.pool())
        .create(store, &body)
        .await?;
    Ok((StatusCode::CREATED, AppJson(customer)))
}

/// `GET /api/stores/{id}/customers/{cid}`
pub async fn show(
    State(state): State<AppState>,
    AppPath((store, id)): AppPath<(StoreId, CustomerId)>,
) -> Result<AppJson<CustomerWithInteractions>> {
    let customer = CustomerRepository::new(state.pool())
        .get_with_interactions(store, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;
    Ok(AppJson(customer))
}

/// `PUT /api/stores/{id}/customers/{cid}`
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    AppPath((store, id)): AppPath<(StoreId, CustomerId)>,
    AppJson(body): AppJson<UpdateCustomer>,
) -> Result<AppJson<Customer>> {
    let body = body.normalized()?;
    let customer = CustomerRepository::new(state.pool())
        .update(store, id, &body)
        .await?;
    Ok(AppJson(customer))
}

/// `DELETE /api/stores/{id}/customers/{cid}`
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    AppPath((store, id)): AppPath<(StoreId, CustomerId)>,
) -> Result<StatusCode> {
    CustomerRepository::new(state.pool())
        .delete(store, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/stores/{id}/customers/{cid}/interactions`
pub async fn interactions(
    State(state): State<AppState>,
    AppPath((store, id)): AppPath<(StoreId, CustomerId)>,
) -> Result<AppJson<Vec<Interaction>>> {
    let customer = CustomerRepository::new(state.pool())
        .get_with_interactions(store, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;
    Ok(AppJson(customer.interactions))
}

/// `POST /api/stores/{id}/customers/{cid}/interactions`
#[instrument(skip(state, body))]
pub async fn add_interaction(
    State(state): State<AppState>,
    AppPath((store, id)): AppPath<(StoreId, CustomerId)>,
    AppJson(body): AppJson<NewInteraction>,
) -> Result<(StatusCode, AppJson<Interaction>)> {
    let body = body.normalized()?;
    let interaction = CustomerRepository::new(state.pool())
        .add_interaction(store, id, &body)
        .await?;
    Ok((StatusCode::CREATED, AppJson(interaction)))
}
