//! Menu administration: sections, products and drag-and-drop reordering.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use menuhub_core::{MenuProductId, MenuSectionId, StoreId};

use super::stores::load_store;
use crate::db::MenuRepository;
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::menu::{
    MenuProduct, MenuSection, NewProduct, NewSection, ReorderRequest, UpdateProduct, UpdateSection,
};
use crate::state::AppState;

/// Query string of `GET /api/stores/{id}/menu-products`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(default)]
    pub section_id: Option<MenuSectionId>,
}

// =============================================================================
// Sections
// =============================================================================

/// `GET /api/stores/{id}/menu-sections`
pub async fn sections(
    State(state): State<AppState>,
    AppPath(store): AppPath<StoreId>,
) -> Result<AppJson<Vec<MenuSection>>> {
    load_store(&state, store).await?;
    let sections = MenuRepository::new(state.pool()).sections(store).await?;
    Ok(AppJson(sections))
}

/// `POST /api/stores/{id}/menu-sections`
#[instrument(skip(state, body))]
pub async fn create_section(
    State(state): State<AppState>,
    AppPath(store): AppPath<StoreId>,
    AppJson(body): AppJson<NewSection>,
) -> Result<(StatusCode, AppJson<MenuSection>)> {
    let body = body.normalized()?;
    load_store(&state, store).await?;
    let section = MenuRepository::new(state.pool())
        .create_section(store, &body)
        .await?;
    Ok((StatusCode::CREATED, AppJson(section)))
}

/// `PUT /api/stores/{id}/menu-sections/{sid}`
#[instrument(skip(state, body))]
pub async fn update_section(
    State(state): State<AppState>,
    AppPath((store, id)): AppPath<(StoreId, MenuSectionId)>,
    AppJson(body): AppJson<UpdateSection>,
) -> Result<AppJson<MenuSection>> {
    let body = body.normalized()?;
    let section = MenuRepository::new(state.pool())
        .update_section(store, id, &body)
        .await?;
    Ok(AppJson(section))
}

/// `DELETE /api/stores/{id}/menu-sections/{sid}`
#[instrument(skip(state))]
pub async fn delete_section(
    State(state): State<AppState>,
    AppPath((store, id)): AppPath<(StoreId, MenuSectionId)>,
) -> Result<StatusCode> {
    MenuRepository::new(state.pool())
        .delete_section(store, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/stores/{id}/menu-sections/order`
///
/// Accepts `{ "ids": [...] }` or `{ "id": 3, "position": 0 }` and returns
/// the sections in their new order.
#[instrument(skip(state, body))]
pub async fn reorder_sections(
    State(state): State<AppState>,
    AppPath(store): AppPath<StoreId>,
    AppJson(body): AppJson<ReorderRequest<MenuSectionId>>,
) -> Result<AppJson<Vec<MenuSection>>> {
    load_store(&state, store).await?;
    let sections = MenuRepository::new(state.pool())
        .reorder_sections(store, &body)
        .await?;
    Ok(AppJson(sections))
}

// =============================================================================
// Products
// =============================================================================

/// `GET /api/stores/{id}/menu-products?sectionId=`
pub async fn products(
    State(state): State<AppState>,
    AppPath(store): AppPath<StoreId>,
    AppQuery(filter): AppQuery<ProductFilter>,
) -> Result<AppJson<Vec<MenuProduct>>> {
    load_store(&state, store).await?;
    let products = MenuRepository::new(state.pool())
        .products(store, filter.section_id)
        .await?;
    Ok(AppJson(products))
}

/// `POST /api/stores/{id}/menu-products`
#[instrument(skip(state, body))]
pub async fn create_product(
    State(state): State<AppState>,
    AppPath(store): AppPath<StoreId>,
    AppJson(body): AppJson<NewProduct>,
) -> Result<(StatusCode, AppJson<MenuProduct>)> {
    let fields = body.validated()?;
    load_store(&state, store).await?;
    let product = MenuRepository::new(state.pool())
        .create_product(store, &fields)
        .await?;
    Ok((StatusCode::CREATED, AppJson(product)))
}

/// `PUT /api/stores/{id}/menu-products/{pid}`
#[instrument(skip(state, body))]
pub async fn update_product(
    State(state): State<AppState>,
    AppPath((store, id)): AppPath<(StoreId, MenuProductId)>,
    AppJson(body): AppJson<UpdateProduct>,
) -> Result<AppJson<MenuProduct>> {
    let repo = MenuRepository::new(state.pool());
    let current = repo
        .product(store, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
    let fields = body.merge(&current)?;
    let product = repo.update_product(store, id, &fields).await?;
    Ok(AppJson(product))
}

/// `DELETE /api/stores/{id}/menu-products/{pid}`
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    AppPath((store, id)): AppPath<(StoreId, MenuProductId)>,
) -> Result<StatusCode> {
    MenuRepository::new(state.pool())
        .delete_product(store, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/stores/{id}/menu-sections/{sid}/products/order`
#[instrument(skip(state, body))]
pub async fn reorder_products(
    State(state): State<AppState>,
    AppPath((store, section)): AppPath<(StoreId, MenuSectionId)>,
    AppJson(body): AppJson<ReorderRequest<MenuProductId>>,
) -> Result<AppJson<Vec<MenuProduct>>> {
    let products = MenuRepository::new(state.pool())
        .reorder_products(store, section, &body)
        .await?;
    Ok(AppJson(products))
}
