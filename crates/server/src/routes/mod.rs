//! HTTP route handlers for the menuhub API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                   - Liveness
//! GET  /health/ready                             - Readiness (database)
//!
//! # Users
//! GET  /api/users                                - List users
//! GET  /api/users/{key}                          - User detail
//! PUT  /api/users/{key}                          - Create or update user
//! GET  /api/users/{key}/stores                   - Stores the user may administer
//! GET  /api/users/{key}/store                    - Store the user manages
//!
//! # Companies and stores
//! GET  /api/companies                            - List (POST: create)
//! GET  /api/companies/{id}                       - With stores (PUT, DELETE)
//! GET  /api/stores                               - List with company (POST: create)
//! GET  /api/stores/{id}                          - With company (PUT, DELETE)
//! GET  /api/stores/{id}/ai-agent                 - AI agent settings (PUT)
//!
//! # Menu
//! GET  /api/stores/{id}/menu-sections            - Sections (POST: create)
//! PUT  /api/stores/{id}/menu-sections/order      - Reorder sections
//! PUT  /api/stores/{id}/menu-sections/{sid}      - Update (DELETE)
//! PUT  /api/stores/{id}/menu-sections/{sid}/products/order - Reorder products
//! GET  /api/stores/{id}/menu-products?sectionId= - Products (POST: create)
//! PUT  /api/stores/{id}/menu-products/{pid}      - Update (DELETE)
//!
//! # Addons
//! GET  /api/menu-products/{pid}/addon-groups     - Groups with addons (POST: create)
//! PUT  /api/addon-groups/{gid}                   - Update (DELETE)
//! POST /api/addon-groups/{gid}/addons            - Create addon
//! PUT  /api/addons/{aid}                         - Update (DELETE)
//!
//! # Orders and customers
//! GET  /api/stores/{id}/orders?status=           - Orders (POST: staff order)
//! GET  /api/stores/{id}/orders/{oid}             - Order detail
//! PUT  /api/stores/{id}/orders/{oid}/status      - Set status
//! POST /api/stores/{id}/orders/{oid}/advance     - Next status
//! GET  /api/stores/{id}/stats                    - Dashboard stats
//! GET  /api/stores/{id}/customers?search=        - Customers (POST: create)
//! GET  /api/stores/{id}/customers/stats          - Customer stats
//! GET  /api/stores/{id}/customers/{cid}          - Detail (PUT, DELETE)
//! GET  /api/stores/{id}/customers/{cid}/interactions - History (POST: add)
//!
//! # Public menu (rate limited)
//! GET  /api/menu/{slug}                          - Menu
//! GET  /api/menu/{slug}/products/{pid}/addons    - Product addons
//! POST /api/menu/{slug}/quote                    - Price a cart
//! POST /api/menu/{slug}/checkout                 - Place an order
//! GET  /api/menu/{slug}/cart/{session}           - Cart (POST: add, DELETE: clear)
//! PUT  /api/menu/{slug}/cart/{session}/{item}    - Quantity (DELETE: remove)
//!
//! # Platform
//! GET  /api/admin/stats                          - Global stats
//! ```

pub mod addons;
pub mod admin;
pub mod companies;
pub mod customers;
pub mod menu;
pub mod orders;
pub mod public;
pub mod stores;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use crate::middleware::{checkout_rate_limiter, menu_rate_limiter};
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/{key}", get(users::show).put(users::upsert))
        .route("/{key}/stores", get(users::stores))
        .route("/{key}/store", get(users::managed_store))
}

/// Create the company routes router.
pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(companies::index).post(companies::create))
        .route(
            "/{id}",
            get(companies::show)
                .put(companies::update)
                .delete(companies::delete),
        )
}

/// Create the store routes router, including each store's menu, orders
/// and customers.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stores::index).post(stores::create))
        .route(
            "/{id}",
            get(stores::show).put(stores::update).delete(stores::delete),
        )
        .route(
            "/{id}/ai-agent",
            get(stores::ai_agent).put(stores::update_ai_agent),
        )
        // Menu
        .route(
            "/{id}/menu-sections",
            get(menu::sections).post(menu::create_section),
        )
        .route("/{id}/menu-sections/order", put(menu::reorder_sections))
        .route(
            "/{id}/menu-sections/{sid}",
            put(menu::update_section).delete(menu::delete_section),
        )
        .route(
            "/{id}/menu-sections/{sid}/products/order",
            put(menu::reorder_products),
        )
        .route(
            "/{id}/menu-products",
            get(menu::products).post(menu::create_product),
        )
        .route(
            "/{id}/menu-products/{pid}",
            put(menu::update_product).delete(menu::delete_product),
        )
        // Orders
        .route("/{id}/orders", get(orders::index).post(orders::create))
        .route("/{id}/orders/{oid}", get(orders::show))
        .route("/{id}/orders/{oid}/status", put(orders::update_status))
        .route("/{id}/orders/{oid}/advance", post(orders::advance))
        .route("/{id}/stats", get(orders::stats))
        // Customers
        .route(
            "/{id}/customers",
            get(customers::index).post(customers::create),
        )
        .route("/{id}/customers/stats", get(customers::stats))
        .route(
            "/{id}/customers/{cid}",
            get(customers::show)
                .put(customers::update)
                .delete(customers::delete),
        )
        .route(
            "/{id}/customers/{cid}/interactions",
            get(customers::interactions).post(customers::add_interaction),
        )
}

/// Create the addon routes router. Mounted at `/api`.
pub fn addon_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/menu-products/{pid}/addon-groups",
            get(addons::groups).post(addons::create_group),
        )
        .route(
            "/addon-groups/{gid}",
            put(addons::update_group).delete(addons::delete_group),
        )
        .route("/addon-groups/{gid}/addons", post(addons::create_addon))
        .route(
            "/addons/{aid}",
            put(addons::update_addon).delete(addons::delete_addon),
        )
}

/// Create the public menu routes router.
///
/// With `rate_limited`, reads are limited per client IP and checkout
/// gets a stricter limit of its own.
pub fn menu_routes(rate_limited: bool) -> Router<AppState> {
    let mut browse = Router::new()
        .route("/{slug}", get(public::menu))
        .route("/{slug}/products/{pid}/addons", get(public::product_addons))
        .route("/{slug}/quote", post(public::quote))
        .route(
            "/{slug}/cart/{session}",
            get(public::cart_show)
                .post(public::cart_add)
                .delete(public::cart_clear),
        )
        .route(
            "/{slug}/cart/{session}/{item}",
            put(public::cart_update).delete(public::cart_remove),
        );
    let mut checkout = Router::new().route("/{slug}/checkout", post(public::checkout));

    if rate_limited {
        browse = browse.layer(menu_rate_limiter());
        checkout = checkout.layer(checkout_rate_limiter());
    }
    browse.merge(checkout)
}

/// Create all API routes.
pub fn routes(rate_limited: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/users", user_routes())
        .nest("/api/companies", company_routes())
        .nest("/api/stores", store_routes())
        .nest("/api", addon_routes())
        .nest("/api/menu", menu_routes(rate_limited))
        .route("/api/admin/stats", get(admin::stats))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::ServerConfig;

    /// A router whose pool never connects; only requests rejected before
    /// any query can be exercised.
    fn app() -> Router {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/menuhub_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            cors_origins: Vec::new(),
            timezone: "UTC".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/menuhub_test")
            .unwrap();
        routes(false).with_state(AppState::new(config, pool))
    }

    fn json(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn message(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["message"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = app()
            .oneshot(json("POST", "/api/companies", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blank_company_name_is_bad_request() {
        let response = app()
            .oneshot(json("POST", "/api/companies", r#"{"name":"   "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(message(response).await, "name is required");
    }

    #[tokio::test]
    async fn test_non_numeric_store_id_is_bad_request() {
        let response = app()
            .oneshot(Request::builder().uri("/api/stores/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reorder_body_must_match_a_shape() {
        let response = app()
            .oneshot(json(
                "PUT",
                "/api/stores/1/menu-sections/order",
                r#"{"order":[1,2]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cart_session_key_validated() {
        let response = app()
            .oneshot(json(
                "PUT",
                "/api/menu/pizzaria-centro/cart/bad.key/1",
                r#"{"quantity":2}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cart_quantity_out_of_range() {
        let response = app()
            .oneshot(json(
                "PUT",
                "/api/menu/pizzaria-centro/cart/abc123/1",
                r#"{"quantity":0}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = app()
            .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
