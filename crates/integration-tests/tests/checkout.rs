//! Cart, checkout and order workflow tests.
//!
//! These tests require a migrated `PostgreSQL` database and a running
//! server (see the crate docs).

use menuhub_integration_tests::{TestContext, money};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

fn slug(store: &Value) -> String {
    store["slug"].as_str().unwrap_or_default().to_owned()
}

#[tokio::test]
#[ignore = "Requires running menuhub server"]
async fn test_checkout_enforces_minimum_order() {
    let ctx = TestContext::new();
    let store = ctx.create_store("50.00", "5.00").await;
    let section = ctx.create_section(&store, "Lanches").await;
    let burger = ctx.create_product(&store, &section, "X-Burger", "20.00").await;
    let slug = slug(&store);

    let mut order = json!({
        "orderType": "delivery",
        "customer": {
            "name": "Ana Souza",
            "phone": "(11) 98888-7777",
            "deliveryAddress": "Rua das Flores, 10"
        },
        "paymentMethod": "pix",
        "items": [{"productId": burger["id"], "quantity": 2}]
    });

    let (status, quote) = ctx.post(&format!("/api/menu/{slug}/quote"), &order).await;
    assert_eq!(status, StatusCode::OK, "{quote}");
    assert_eq!(quote["meetsMinimum"], false);
    assert!((money(&quote["shortfall"]) - 10.0).abs() < f64::EPSILON);

    let (status, body) = ctx.post(&format!("/api/menu/{slug}/checkout"), &order).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");

    order["items"][0]["quantity"] = json!(3);
    let (status, placed) = ctx.post(&format!("/api/menu/{slug}/checkout"), &order).await;
    assert_eq!(status, StatusCode::CREATED, "{placed}");
    assert_eq!(placed["status"], "received");
    assert!((money(&placed["subtotal"]) - 60.0).abs() < f64::EPSILON);
    assert!((money(&placed["total"]) - 65.0).abs() < f64::EPSILON);
    assert_eq!(placed["items"].as_array().map(Vec::len), Some(1));

    // The customer record is created and counted
    let (_, customers) = ctx
        .get(&format!("/api/stores/{}/customers?search=Ana", store["id"]))
        .await;
    assert_eq!(customers[0]["totalOrders"], 1);
    assert!((money(&customers[0]["totalSpent"]) - 65.0).abs() < f64::EPSILON);

    ctx.cleanup(&store).await;
}

#[tokio::test]
#[ignore = "Requires running menuhub server"]
async fn test_cart_then_checkout() {
    let ctx = TestContext::new();
    let store = ctx.create_store("0", "0").await;
    let section = ctx.create_section(&store, "Pizzas").await;
    let pizza = ctx.create_product(&store, &section, "Mussarela", "35.00").await;
    let slug = slug(&store);
    let session = Uuid::new_v4().simple().to_string();
    let cart_url = format!("/api/menu/{slug}/cart/{session}");

    let (status, cart) = ctx
        .post(&cart_url, &json!({"productId": pizza["id"], "quantity": 1}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{cart}");

    // Identical line merges into the first
    let (_, cart) = ctx
        .post(&cart_url, &json!({"productId": pizza["id"], "quantity": 2}))
        .await;
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["items"][0]["quantity"], 3);
    assert!((money(&cart["subtotal"]) - 105.0).abs() < f64::EPSILON);

    let item = &cart["items"][0]["id"];
    let (status, cart) = ctx
        .put(&format!("{cart_url}/{item}"), &json!({"quantity": 1}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!((money(&cart["total"]) - 35.0).abs() < f64::EPSILON);

    let (status, placed) = ctx
        .post(
            &format!("/api/menu/{slug}/checkout"),
            &json!({
                "orderType": "pickup",
                "customer": {"name": "Bruno", "phone": "11977776666"},
                "paymentMethod": "cash",
                "cartSession": session
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{placed}");

    let (_, cart) = ctx.get(&cart_url).await;
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));

    ctx.cleanup(&store).await;
}

#[tokio::test]
#[ignore = "Requires running menuhub server"]
async fn test_cart_survives_unavailable_product() {
    let ctx = TestContext::new();
    let store = ctx.create_store("0", "0").await;
    let section = ctx.create_section(&store, "Pizzas").await;
    let mussarela = ctx.create_product(&store, &section, "Mussarela", "35.00").await;
    let calabresa = ctx.create_product(&store, &section, "Calabresa", "40.00").await;
    let slug = slug(&store);
    let session = Uuid::new_v4().simple().to_string();
    let cart_url = format!("/api/menu/{slug}/cart/{session}");

    ctx.post(&cart_url, &json!({"productId": mussarela["id"], "quantity": 1}))
        .await;
    let (status, cart) = ctx
        .post(&cart_url, &json!({"productId": calabresa["id"], "quantity": 1}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{cart}");

    let (status, _) = ctx
        .put(
            &format!("/api/stores/{}/menu-products/{}", store["id"], calabresa["id"]),
            &json!({"isAvailable": false}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, cart) = ctx.get(&cart_url).await;
    assert_eq!(status, StatusCode::OK, "{cart}");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["items"][0]["productName"], "Mussarela");
    assert_eq!(cart["unavailable"][0]["productName"], "Calabresa");
    assert!(cart["unavailable"][0]["reason"].as_str().is_some());
    assert!((money(&cart["subtotal"]) - 35.0).abs() < f64::EPSILON);

    // Updating the remaining line succeeds and reports the new quantity
    let item = &cart["items"][0]["id"];
    let (status, cart) = ctx
        .put(&format!("{cart_url}/{item}"), &json!({"quantity": 2}))
        .await;
    assert_eq!(status, StatusCode::OK, "{cart}");
    assert_eq!(cart["items"][0]["quantity"], 2);
    assert!((money(&cart["subtotal"]) - 70.0).abs() < f64::EPSILON);

    // Checkout still refuses a cart holding the unavailable line
    let checkout = json!({
        "orderType": "pickup",
        "customer": {"name": "Carla", "phone": "11966665555"},
        "paymentMethod": "pix",
        "cartSession": session
    });
    let (status, _) = ctx
        .post(&format!("/api/menu/{slug}/checkout"), &checkout)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // The unavailable line can be removed by its id
    let stale = &cart["unavailable"][0]["id"];
    let status = ctx.delete(&format!("{cart_url}/{stale}")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, cart) = ctx.get(&cart_url).await;
    assert_eq!(cart["unavailable"].as_array().map(Vec::len), Some(0));

    let (status, placed) = ctx
        .post(&format!("/api/menu/{slug}/checkout"), &checkout)
        .await;
    assert_eq!(status, StatusCode::CREATED, "{placed}");

    ctx.cleanup(&store).await;
}

#[tokio::test]
#[ignore = "Requires running menuhub server"]
async fn test_order_status_advances_to_delivered() {
    let ctx = TestContext::new();
    let store = ctx.create_store("100.00", "0").await;
    let section = ctx.create_section(&store, "Bebidas").await;
    let juice = ctx.create_product(&store, &section, "Suco", "8.00").await;
    let sid = &store["id"];

    let mut dine_in = json!({
        "orderType": "dine_in",
        "customer": {"name": "Carlos", "phone": "11955554444"},
        "paymentMethod": "card",
        "items": [{"productId": juice["id"], "quantity": 1}]
    });
    let (status, _) = ctx
        .post(&format!("/api/stores/{sid}/orders"), &dine_in)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Staff orders skip the minimum
    dine_in["customer"]["tableNumber"] = json!("4");
    let (status, order) = ctx
        .post(&format!("/api/stores/{sid}/orders"), &dine_in)
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["tableNumber"], "4");
    let oid = &order["id"];

    for expected in ["preparing", "ready", "delivered"] {
        let (status, advanced) = ctx
            .post(&format!("/api/stores/{sid}/orders/{oid}/advance"), &json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(advanced["status"], expected);
    }
    let (status, _) = ctx
        .post(&format!("/api/stores/{sid}/orders/{oid}/advance"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .put(
            &format!("/api/stores/{sid}/orders/{oid}/status"),
            &json!({"status": "cancelled"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, delivered) = ctx
        .get(&format!("/api/stores/{sid}/orders?status=delivered"))
        .await;
    assert_eq!(delivered.as_array().map(Vec::len), Some(1));

    let (status, stats) = ctx.get(&format!("/api/stores/{sid}/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["todayOrders"], 1);
    assert_eq!(stats["activeOrders"], 0);

    ctx.cleanup(&store).await;
}
