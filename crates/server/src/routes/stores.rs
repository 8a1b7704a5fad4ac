//! Store route handlers.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use menuhub_core::StoreId;

use crate::db::StoreRepository;
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::models::ai_agent::AiAgentConfig;
use crate::models::store::{NewStore, Store, StoreDetail, UpdateStore};
use crate::state::AppState;

/// Load a store or fail with 404.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the store does not exist.
pub async fn load_store(state: &AppState, id: StoreId) -> Result<Store> {
    StoreRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".to_string()))
}

/// `GET /api/stores`
pub async fn index(State(state): State<AppState>) -> Result<AppJson<Vec<StoreDetail>>> {
    let stores = StoreRepository::new(state.pool())
        .list_with_company()
        .await?;
    Ok(AppJson(stores))
}

/// `GET /api/stores/{id}`
pub async fn show(
    State(state): State<AppState>,
    AppPath(id): AppPath<StoreId>,
) -> Result<AppJson<StoreDetail>> {
    let store = StoreRepository::new(state.pool())
        .get_with_company(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".to_string()))?;
    Ok(AppJson(store))
}

/// `POST /api/stores`
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewStore>,
) -> Result<(StatusCode, AppJson<Store>)> {
    let input = body.validated()?;
    let store = StoreRepository::new(state.pool()).create(&input).await?;
    tracing::info!(
        store_id = %store.id,
        menu_url = %state.config().menu_url(store.slug.as_str()),
        "Store created"
    );
    Ok((StatusCode::CREATED, AppJson(store)))
}

/// `PUT /api/stores/{id}`
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<StoreId>,
    AppJson(body): AppJson<UpdateStore>,
) -> Result<AppJson<Store>> {
    let body = body.normalized()?;
    let store = StoreRepository::new(state.pool()).update(id, &body).await?;
    Ok(AppJson(store))
}

/// `DELETE /api/stores/{id}`
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<StoreId>,
) -> Result<StatusCode> {
    StoreRepository::new(state.pool()).delete(id).await?;
    tracing::info!(store_id = %id, "Store deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/stores/{id}/ai-agent`
pub async fn ai_agent(
    State(state): State<AppState>,
    AppPath(id): AppPath<StoreId>,
) -> Result<AppJson<AiAgentConfig>> {
    let config = StoreRepository::new(state.pool()).get_ai_agent(id).await?;
    Ok(AppJson(config))
}

/// `PUT /api/stores/{id}/ai-agent`
#[instrument(skip(state, body))]
pub async fn update_ai_agent(
    State(state): State<AppState>,
    AppPath(id): AppPath<StoreId>,
    AppJson(body): AppJson<AiAgentConfig>,
) -> Result<AppJson<AiAgentConfig>> {
    let config = body.normalized()?;
    let saved = StoreRepository::new(state.pool())
        .set_ai_agent(id, &config)
        .await?;
    Ok(AppJson(saved))
}
