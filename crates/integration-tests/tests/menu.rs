//! Menu administration and public menu tests.
//!
//! These tests require a migrated `PostgreSQL` database and a running
//! server (see the crate docs).

use menuhub_integration_tests::{TestContext, money};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "Requires running menuhub server"]
async fn test_menu_crud_and_public_menu() {
    let ctx = TestContext::new();
    let store = ctx.create_store("0", "0").await;
    let sid = &store["id"];

    let pizzas = ctx.create_section(&store, "Pizzas").await;
    let drinks = ctx.create_section(&store, "Bebidas").await;
    assert_eq!(pizzas["displayOrder"], 0);
    assert_eq!(drinks["displayOrder"], 1);

    let margherita = ctx.create_product(&store, &pizzas, "Margherita", "42.00").await;
    assert_eq!(margherita["preparationTime"], "15-20 min");
    assert_eq!(margherita["isAvailable"], true);

    // Promotion requires an original price above the sale price
    let (status, _) = ctx
        .post(
            &format!("/api/stores/{sid}/menu-products"),
            &json!({
                "sectionId": pizzas["id"],
                "name": "Calabresa",
                "price": "40.00",
                "originalPrice": "35.00",
                "isPromotion": true
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, promo) = ctx
        .post(
            &format!("/api/stores/{sid}/menu-products"),
            &json!({
                "sectionId": pizzas["id"],
                "name": "Calabresa",
                "price": "40.00",
                "originalPrice": "50.00",
                "isPromotion": true
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{promo}");

    let (status, updated) = ctx
        .put(
            &format!("/api/stores/{sid}/menu-products/{}", margherita["id"]),
            &json!({"price": "44.50", "isAvailable": false}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert!((money(&updated["price"]) - 44.5).abs() < f64::EPSILON);
    assert_eq!(updated["isAvailable"], false);

    let (status, listed) = ctx
        .get(&format!("/api/stores/{sid}/menu-products?sectionId={}", pizzas["id"]))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(2));

    let (status, menu) = ctx.get(&format!("/api/menu/{}", store["slug"].as_str().unwrap_or_default())).await;
    assert_eq!(status, StatusCode::OK, "{menu}");
    assert_eq!(menu["sections"].as_array().map(Vec::len), Some(2));
    assert_eq!(menu["sections"][0]["name"], "Pizzas");
    let calabresa = menu["sections"][0]["products"]
        .as_array()
        .and_then(|products| products.iter().find(|p| p["name"] == "Calabresa").cloned())
        .unwrap_or_default();
    assert_eq!(calabresa["discountPercent"], 20);

    assert_eq!(
        ctx.delete(&format!("/api/stores/{sid}/menu-sections/{}", drinks["id"])).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        ctx.delete(&format!("/api/stores/{sid}/menu-sections/{}", drinks["id"])).await,
        StatusCode::NOT_FOUND
    );

    ctx.cleanup(&store).await;
}

#[tokio::test]
#[ignore = "Requires running menuhub server"]
async fn test_reorder_sections_and_products() {
    let ctx = TestContext::new();
    let store = ctx.create_store("0", "0").await;
    let sid = &store["id"];

    let a = ctx.create_section(&store, "A").await;
    let b = ctx.create_section(&store, "B").await;
    let c = ctx.create_section(&store, "C").await;

    // Full sequence
    let (status, sections) = ctx
        .put(
            &format!("/api/stores/{sid}/menu-sections/order"),
            &json!({"ids": [c["id"], a["id"], b["id"]]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{sections}");
    let names: Vec<_> = sections
        .as_array()
        .map(|s| s.iter().map(|x| x["name"].clone()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec![json!("C"), json!("A"), json!("B")]);

    // Single move
    let (status, sections) = ctx
        .put(
            &format!("/api/stores/{sid}/menu-sections/order"),
            &json!({"id": b["id"], "position": 0}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<_> = sections
        .as_array()
        .map(|s| s.iter().map(|x| (x["name"].clone(), x["displayOrder"].clone())).collect())
        .unwrap_or_default();
    assert_eq!(
        orders,
        vec![
            (json!("B"), json!(0)),
            (json!("C"), json!(1)),
            (json!("A"), json!(2)),
        ]
    );

    // A sequence that leaves out a section is rejected and changes nothing
    let (status, _) = ctx
        .put(
            &format!("/api/stores/{sid}/menu-sections/order"),
            &json!({"ids": [a["id"], b["id"]]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, unchanged) = ctx.get(&format!("/api/stores/{sid}/menu-sections")).await;
    assert_eq!(unchanged[0]["name"], "B");

    // Products within a section
    let p1 = ctx.create_product(&store, &a, "Um", "10").await;
    let p2 = ctx.create_product(&store, &a, "Dois", "10").await;
    let (status, products) = ctx
        .put(
            &format!("/api/stores/{sid}/menu-sections/{}/products/order", a["id"]),
            &json!({"ids": [p2["id"], p1["id"]]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{products}");
    assert_eq!(products[0]["name"], "Dois");
    assert_eq!(products[1]["displayOrder"], 1);

    ctx.cleanup(&store).await;
}
