//! Public menu, cart and checkout handlers.
//!
//! Addressed by store slug. Only active stores are visible; anything else
//! answers 404 so closed stores cannot be probed.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use menuhub_core::checkout::{CheckoutError, LineRequest, MAX_LINE_QUANTITY};
use menuhub_core::{CartItemId, MenuProductId, Slug};

use crate::db::{AddonRepository, CartRepository, MenuRepository, StoreRepository};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::models::addon::AddonGroupWithAddons;
use crate::models::cart::{CartView, UpdateCartQuantity, session_key};
use crate::models::menu::PublicMenu;
use crate::models::order::{CheckoutRequest, OrderWithItems, Quote};
use crate::models::store::Store;
use crate::services::{CheckoutService, Placement};
use crate::state::AppState;

fn store_not_found() -> AppError {
    AppError::NotFound("Store".to_string())
}

/// Resolve an active store from its slug.
async fn open_store(state: &AppState, raw: &str) -> Result<Store> {
    let slug = Slug::parse(raw).map_err(|_| store_not_found())?;
    StoreRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .filter(Store::is_open)
        .ok_or_else(store_not_found)
}

/// `GET /api/menu/{slug}`
pub async fn menu(
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> Result<AppJson<PublicMenu>> {
    let slug = Slug::parse(&slug).map_err(|_| store_not_found())?;
    let menu = MenuRepository::new(state.pool())
        .store_menu(&slug)
        .await?
        .ok_or_else(store_not_found)?;
    Ok(AppJson(menu))
}

/// `GET /api/menu/{slug}/products/{pid}/addons`
pub async fn product_addons(
    State(state): State<AppState>,
    AppPath((slug, product)): AppPath<(String, MenuProductId)>,
) -> Result<AppJson<Vec<AddonGroupWithAddons>>> {
    let store = open_store(&state, &slug).await?;
    MenuRepository::new(state.pool())
        .product(store.id, product)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
    let groups = AddonRepository::new(state.pool())
        .groups_with_addons(product)
        .await?;
    Ok(AppJson(groups))
}

/// `POST /api/menu/{slug}/quote`
pub async fn quote(
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
    AppJson(body): AppJson<CheckoutRequest>,
) -> Result<AppJson<Quote>> {
    let store = open_store(&state, &slug).await?;
    let quote = CheckoutService::new(state.pool(), &store)
        .quote(&body)
        .await?;
    Ok(AppJson(quote))
}

/// `POST /api/menu/{slug}/checkout`
#[instrument(skip(state, body))]
pub async fn checkout(
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
    AppJson(body): AppJson<CheckoutRequest>,
) -> Result<(StatusCode, AppJson<OrderWithItems>)> {
    let store = open_store(&state, &slug).await?;
    let order = CheckoutService::new(state.pool(), &store)
        .place(&body, Placement::Customer)
        .await?;
    Ok((StatusCode::CREATED, AppJson(order)))
}

// =============================================================================
// Cart
// =============================================================================

/// `GET /api/menu/{slug}/cart/{session}`
pub async fn cart_show(
    State(state): State<AppState>,
    AppPath((slug, session)): AppPath<(String, String)>,
) -> Result<AppJson<CartView>> {
    let session = session_key(&session)?;
    let store = open_store(&state, &slug).await?;
    let cart = CheckoutService::new(state.pool(), &store)
        .cart(&session)
        .await?;
    Ok(AppJson(cart))
}

/// `POST /api/menu/{slug}/cart/{session}`
///
/// The line is priced before it is stored, so a cart never holds a line
/// that checkout would reject at the time it was added.
#[instrument(skip(state, body))]
pub async fn cart_add(
    State(state): State<AppState>,
    AppPath((slug, session)): AppPath<(String, String)>,
    AppJson(body): AppJson<LineRequest>,
) -> Result<(StatusCode, AppJson<CartView>)> {
    let session = session_key(&session)?;
    let store = open_store(&state, &slug).await?;
    let service = CheckoutService::new(state.pool(), &store);
    service.price(std::slice::from_ref(&body)).await?;
    CartRepository::new(state.pool())
        .add(store.id, &session, &body)
        .await?;
    let cart = service.cart(&session).await?;
    Ok((StatusCode::CREATED, AppJson(cart)))
}

/// `DELETE /api/menu/{slug}/cart/{session}`
#[instrument(skip(state))]
pub async fn cart_clear(
    State(state): State<AppState>,
    AppPath((slug, session)): AppPath<(String, String)>,
) -> Result<StatusCode> {
    let session = session_key(&session)?;
    let store = open_store(&state, &slug).await?;
    let removed = CartRepository::new(state.pool())
        .clear(store.id, &session)
        .await?;
    tracing::debug!(removed, "Cart cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/menu/{slug}/cart/{session}/{item}`
#[instrument(skip(state))]
pub async fn cart_update(
    State(state): State<AppState>,
    AppPath((slug, session, item)): AppPath<(String, String, CartItemId)>,
    AppJson(body): AppJson<UpdateCartQuantity>,
) -> Result<AppJson<CartView>> {
    let session = session_key(&session)?;
    if body.quantity == 0 || body.quantity > MAX_LINE_QUANTITY {
        return Err(CheckoutError::InvalidQuantity {
            max: MAX_LINE_QUANTITY,
        }
        .into());
    }
    let store = open_store(&state, &slug).await?;
    CartRepository::new(state.pool())
        .update_quantity(store.id, &session, item, body.quantity)
        .await?;
    let cart = CheckoutService::new(state.pool(), &store)
        .cart(&session)
        .await?;
    Ok(AppJson(cart))
}

/// `DELETE /api/menu/{slug}/cart/{session}/{item}`
#[instrument(skip(state))]
pub async fn cart_remove(
    State(state): State<AppState>,
    AppPath((slug, session, item)): AppPath<(String, String, CartItemId)>,
) -> Result<AppJson<CartView>> {
    let session = session_key(&session)?;
    let store = open_store(&state, &slug).await?;
    CartRepository::new(state.pool())
        .remove(store.id, &session, item)
        .await?;
    let cart = CheckoutService::new(state.pool(), &store)
        .cart(&session)
        .await?;
    Ok(AppJson(cart))
}
