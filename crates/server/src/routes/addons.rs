//! Addon group and addon handlers.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use menuhub_core::{AddonGroupId, AddonId, MenuProductId};

use crate::db::{AddonRepository, MenuRepository};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::models::addon::{
    Addon, AddonGroup, AddonGroupWithAddons, NewAddon, NewAddonGroup, UpdateAddon,
    UpdateAddonGroup,
};
use crate::state::AppState;

/// `GET /api/menu-products/{pid}/addon-groups`
pub async fn groups(
    State(state): State<AppState>,
    AppPath(product): AppPath<MenuProductId>,
) -> Result<AppJson<Vec<AddonGroupWithAddons>>> {
    MenuRepository::new(state.pool())
        .product_by_id(product)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
    let groups = AddonRepository::new(state.pool())
        .groups_with_addons(product)
        .await?;
    Ok(AppJson(groups))
}

/// `POST /api/menu-products/{pid}/addon-groups`
#[instrument(skip(state, body))]
pub async fn create_group(
    State(state): State<AppState>,
    AppPath(product): AppPath<MenuProductId>,
    AppJson(body): AppJson<NewAddonGroup>,
) -> Result<(StatusCode, AppJson<AddonGroup>)> {
    let body = body.normalized()?;
    let group = AddonRepository::new(state.pool())
        .create_group(product, &body)
        .await?;
    Ok((StatusCode::CREATED, AppJson(group)))
}

/// `PUT /api/addon-groups/{gid}`
#[instrument(skip(state, body))]
pub async fn update_group(
    State(state): State<AppState>,
    AppPath(id): AppPath<AddonGroupId>,
    AppJson(body): AppJson<UpdateAddonGroup>,
) -> Result<AppJson<AddonGroup>> {
    let repo = AddonRepository::new(state.pool());
    let current = repo
        .group(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Addon group".to_string()))?;
    let merged = body.merge(&current)?;
    let group = repo.update_group(id, &merged).await?;
    Ok(AppJson(group))
}

/// `DELETE /api/addon-groups/{gid}`
#[instrument(skip(state))]
pub async fn delete_group(
    State(state): State<AppState>,
    AppPath(id): AppPath<AddonGroupId>,
) -> Result<StatusCode> {
    AddonRepository::new(state.pool()).delete_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/addon-groups/{gid}/addons`
#[instrument(skip(state, body))]
pub async fn create_addon(
    State(state): State<AppState>,
    AppPath(group): AppPath<AddonGroupId>,
    AppJson(body): AppJson<NewAddon>,
) -> Result<(StatusCode, AppJson<Addon>)> {
    let body = body.normalized()?;
    let addon = AddonRepository::new(state.pool())
        .create_addon(group, &body)
        .await?;
    Ok((StatusCode::CREATED, AppJson(addon)))
}

/// `PUT /api/addons/{aid}`
#[instrument(skip(state, body))]
pub async fn update_addon(
    State(state): State<AppState>,
    AppPath(id): AppPath<AddonId>,
    AppJson(body): AppJson<UpdateAddon>,
) -> Result<AppJson<Addon>> {
    let body = body.normalized()?;
    let addon = AddonRepository::new(state.pool())
        .update_addon(id, &body)
        .await?;
    Ok(AppJson(addon))
}

/// `DELETE /api/addons/{aid}`
#[instrument(skip(state))]
pub async fn delete_addon(
    State(state): State<AppState>,
    AppPath(id): AppPath<AddonId>,
) -> Result<StatusCode> {
    AddonRepository::new(state.pool()).delete_addon(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
