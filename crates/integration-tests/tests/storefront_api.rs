//! Storefront HTTP flows against a running server.
//!
//! Needs a migrated, seeded database and the storefront on
//! `STOREFRONT_BASE_URL`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use slick_core::OrderNumber;
use slick_integration_tests::{session_client, storefront_base_url, unique_email};

const PASSWORD: &str = "correct horse battery";

fn client() -> Client {
    session_client().expect("Failed to build HTTP client")
}

async fn register(client: &Client, base_url: &str) -> String {
    let email = unique_email("shopper");
    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({"email": email, "password": PASSWORD, "full_name": "Test Shopper"}))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);
    email
}

/// The first seeded product that has a size with stock.
async fn first_in_stock(client: &Client, base_url: &str) -> (Value, String) {
    let products: Vec<Value> = client
        .get(format!("{base_url}/api/products"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Products response was not JSON");

    for product in products {
        let slug = product["slug"].as_str().unwrap();
        let detail: Value = client
            .get(format!("{base_url}/api/products/{slug}"))
            .send()
            .await
            .expect("Failed to get product")
            .json()
            .await
            .unwrap();
        let size = detail["variants"]
            .as_array()
            .unwrap()
            .iter()
            .find(|v| v["stock"].as_i64().unwrap_or(0) > 0)
            .and_then(|v| v["size"].as_str())
            .map(str::to_owned);
        if let Some(size) = size {
            return (detail, size);
        }
    }
    panic!("No product with stock; run `slick-cli seed` first");
}

async fn add_to_cart(client: &Client, base_url: &str, product_id: &Value, size: &str) -> Value {
    let resp = client
        .post(format!("{base_url}/api/cart/items"))
        .json(&json!({"product_id": product_id, "size": size}))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

fn shipping(email: &str) -> Value {
    json!({
        "full_name": "Test Shopper",
        "email": email,
        "address": "123 Rizal St",
        "city": "Makati",
        "phone": "09171234567"
    })
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", storefront_base_url()))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_product_is_404() {
    let resp = client()
        .get(format!("{}/api/products/no-such-shoe", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_search_filters_by_name() {
    let client = client();
    let base_url = storefront_base_url();
    let (product, _) = first_in_stock(&client, &base_url).await;
    let name = product["name"].as_str().unwrap();

    let results: Vec<Value> = client
        .get(format!("{base_url}/api/products"))
        .query(&[("search", name.to_lowercase())])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(results.iter().any(|p| p["name"] == name));
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_guest_cart_lifecycle() {
    let client = client();
    let base_url = storefront_base_url();
    let (product, size) = first_in_stock(&client, &base_url).await;

    add_to_cart(&client, &base_url, &product["id"], &size).await;
    let cart = add_to_cart(&client, &base_url, &product["id"], &size).await;
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
    assert_eq!(cart["total_items"], 2);

    let key = cart["lines"][0]["key"].as_str().unwrap().to_owned();
    let cart: Value = client
        .patch(format!("{base_url}/api/cart/items/{key}"))
        .json(&json!({"quantity": 0}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["total_items"], 0);
    assert!(cart["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_quantity_above_line_limit_is_rejected() {
    let client = client();
    let base_url = storefront_base_url();
    let (product, size) = first_in_stock(&client, &base_url).await;

    let cart = add_to_cart(&client, &base_url, &product["id"], &size).await;
    let key = cart["lines"][0]["key"].as_str().unwrap().to_owned();

    let resp = client
        .patch(format!("{base_url}/api/cart/items/{key}"))
        .json(&json!({"quantity": 3_000_000_000_i64}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let cart: Value = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["total_items"], 1);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_malformed_requests_answer_json() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .patch(format!("{base_url}/api/cart/items/1-9"))
        .json(&json!({"quantity": "two"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = client
        .post(format!("{base_url}/api/cart/items"))
        .body("product_id=1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_unknown_size_is_rejected() {
    let client = client();
    let base_url = storefront_base_url();
    let (product, _) = first_in_stock(&client, &base_url).await;

    let resp = client
        .post(format!("{base_url}/api/cart/items"))
        .json(&json!({"product_id": product["id"], "size": "99"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_register_login_logout() {
    let client = client();
    let base_url = storefront_base_url();
    let email = register(&client, &base_url).await;

    let me: Value = client
        .get(format!("{base_url}/api/auth/me"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["email"], email);

    let resp = client
        .post(format!("{base_url}/api/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{base_url}/api/auth/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({"email": email, "password": "wrong password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({"email": email, "password": PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_duplicate_registration_conflicts() {
    let base_url = storefront_base_url();
    let email = register(&client(), &base_url).await;

    let resp = client()
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({"email": email, "password": PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// ============================================================================
// Checkout & orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_requires_login() {
    let resp = client()
        .post(format!("{}/api/checkout", storefront_base_url()))
        .json(&shipping("guest@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_empty_cart_cannot_check_out() {
    let client = client();
    let base_url = storefront_base_url();
    let email = register(&client, &base_url).await;

    let resp = client
        .post(format!("{base_url}/api/checkout"))
        .json(&shipping(&email))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_checkout_places_order_and_empties_cart() {
    let client = client();
    let base_url = storefront_base_url();
    let (product, size) = first_in_stock(&client, &base_url).await;

    // The cart survives logging in.
    add_to_cart(&client, &base_url, &product["id"], &size).await;
    let email = register(&client, &base_url).await;

    let resp = client
        .post(format!("{base_url}/api/checkout"))
        .json(&shipping(&email))
        .send()
        .await
        .expect("Failed to check out");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let placed: Value = resp.json().await.unwrap();

    let order_number = placed["order_number"].as_str().unwrap();
    assert!(OrderNumber::is_well_formed(order_number));
    assert_eq!(placed["order"]["status"], "pending");
    assert_eq!(placed["order"]["payment_method"], "cash_on_delivery");
    assert_eq!(placed["order"]["items"][0]["size"], size.as_str());

    let cart: Value = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["total_items"], 0);

    let orders: Vec<Value> = client
        .get(format!("{base_url}/api/orders"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["order_number"], order_number);

    let order_id = &placed["order_id"];
    let resp = client
        .get(format!("{base_url}/api/orders/{order_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let shipped: Vec<Value> = client
        .get(format!("{base_url}/api/orders"))
        .query(&[("status", "shipped")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(shipped.is_empty());

    let unfiltered: Vec<Value> = client
        .get(format!("{base_url}/api/orders?status="))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unfiltered.len(), 1);

    let resp = client
        .get(format!("{base_url}/api/orders/not-a-number"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_orders_are_private() {
    let base_url = storefront_base_url();
    let buyer = client();
    let (product, size) = first_in_stock(&buyer, &base_url).await;
    let email = register(&buyer, &base_url).await;
    add_to_cart(&buyer, &base_url, &product["id"], &size).await;
    let placed: Value = buyer
        .post(format!("{base_url}/api/checkout"))
        .json(&shipping(&email))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let other = client();
    register(&other, &base_url).await;
    let resp = other
        .get(format!("{base_url}/api/orders/{}", placed["order_id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
