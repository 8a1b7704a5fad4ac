//! User route handlers.

use axum::extract::State;
use tracing::instrument;

use menuhub_core::UserKey;

use crate::db::{StoreRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::models::store::{Store, StoreDetail};
use crate::models::user::{UpsertUser, User};
use crate::state::AppState;

fn parse_key(raw: &str) -> Result<UserKey> {
    UserKey::new(raw).ok_or_else(|| AppError::BadRequest("invalid user key".to_string()))
}

/// `GET /api/users`
pub async fn index(State(state): State<AppState>) -> Result<AppJson<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(AppJson(users))
}

/// `GET /api/users/{key}`
pub async fn show(
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> Result<AppJson<User>> {
    let key = parse_key(&key)?;
    let user = UserRepository::new(state.pool())
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;
    Ok(AppJson(user))
}

/// `PUT /api/users/{key}`
#[instrument(skip(state, body))]
pub async fn upsert(
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
    AppJson(body): AppJson<UpsertUser>,
) -> Result<AppJson<User>> {
    let key = parse_key(&key)?;
    let body = body.normalized()?;
    let user = UserRepository::new(state.pool()).upsert(&key, &body).await?;
    Ok(AppJson(user))
}

/// `GET /api/users/{key}/stores`: stores the user may administer.
pub async fn stores(
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> Result<AppJson<Vec<StoreDetail>>> {
    let key = parse_key(&key)?;
    let user = UserRepository::new(state.pool())
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;
    let stores = StoreRepository::new(state.pool())
        .accessible_for(&user)
        .await?;
    Ok(AppJson(stores))
}

/// `GET /api/users/{key}/store`: the store the user manages.
pub async fn managed_store(
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> Result<AppJson<Store>> {
    let key = parse_key(&key)?;
    let store = StoreRepository::new(state.pool())
        .get_by_manager(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".to_string()))?;
    Ok(AppJson(store))
}
