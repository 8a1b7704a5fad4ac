//! Integration tests for menuhub.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate a scratch database and start the server
//! cargo run -p menuhub-cli -- migrate
//! cargo run -p menuhub-server
//!
//! # Run the ignored tests against it
//! cargo test -p menuhub-integration-tests -- --ignored
//! ```
//!
//! `MENUHUB_TEST_URL` points the tests at another server
//! (default: `http://localhost:3000`). Every test creates its own company
//! and store under a random slug, so runs do not interfere.

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// A client bound to the server under test.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Build a context from `MENUHUB_TEST_URL`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn new() -> Self {
        let base_url = std::env::var("MENUHUB_TEST_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET` a path, returning status and JSON body (`Null` when empty).
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed");
        read(resp).await
    }

    /// Send a JSON body with `method`.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn send(&self, method: reqwest::Method, path: &str, body: &Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await
            .expect("request failed");
        read(resp).await
    }

    /// `POST` a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, path, body).await
    }

    /// `PUT` a JSON body.
    pub async fn put(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::PUT, path, body).await
    }

    /// `DELETE` a path.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn delete(&self, path: &str) -> StatusCode {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE failed")
            .status()
    }

    /// Create a company with one store and return the store JSON.
    ///
    /// # Panics
    ///
    /// Panics if either record cannot be created.
    pub async fn create_store(&self, minimum_order: &str, delivery_fee: &str) -> Value {
        let suffix = Uuid::new_v4().simple().to_string();
        let (status, company) = self
            .post("/api/companies", &json!({"name": format!("Empresa {suffix}")}))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{company}");

        let (status, store) = self
            .post(
                "/api/stores",
                &json!({
                    "name": "Loja Teste",
                    "companyId": company["id"],
                    "slug": format!("loja-{suffix}"),
                    "minimumOrder": minimum_order,
                    "deliveryFee": delivery_fee
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{store}");
        store
    }

    /// Create a section in `store` and return its JSON.
    ///
    /// # Panics
    ///
    /// Panics if the section cannot be created.
    pub async fn create_section(&self, store: &Value, name: &str) -> Value {
        let (status, section) = self
            .post(
                &format!("/api/stores/{}/menu-sections", store["id"]),
                &json!({"name": name}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{section}");
        section
    }

    /// Create a product in `section` and return its JSON.
    ///
    /// # Panics
    ///
    /// Panics if the product cannot be created.
    pub async fn create_product(&self, store: &Value, section: &Value, name: &str, price: &str) -> Value {
        let (status, product) = self
            .post(
                &format!("/api/stores/{}/menu-products", store["id"]),
                &json!({"sectionId": section["id"], "name": name, "price": price}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{product}");
        product
    }

    /// Delete the store's company, cascading to everything created under it.
    pub async fn cleanup(&self, store: &Value) {
        let _ = self
            .delete(&format!("/api/companies/{}", store["companyId"]))
            .await;
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

async fn read(resp: reqwest::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    (status, body)
}

/// A money field as a number. Amounts are serialized as decimal strings.
///
/// # Panics
///
/// Panics if the value is not a decimal string or number.
#[must_use]
pub fn money(value: &Value) -> f64 {
    value
        .as_str()
        .map_or_else(|| value.as_f64(), |s| s.parse().ok())
        .expect("money value")
}
