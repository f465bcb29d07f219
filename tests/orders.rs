mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

struct Catalog {
    farmer_id: String,
    supplier_id: String,
    onions: String,
    grapes: String,
    urea: String,
}

async fn catalog(app: &TestApp) -> Catalog {
    Catalog {
        farmer_id: app
            .id_of(&format!(
                "SELECT id FROM users WHERE phone = '{}'",
                common::FARMER_PHONE
            ))
            .await,
        supplier_id: app
            .id_of(&format!(
                "SELECT id FROM users WHERE phone = '{}'",
                common::SUPPLIER_PHONE
            ))
            .await,
        onions: app
            .id_of("SELECT id FROM produce WHERE name = 'Red Onions'")
            .await,
        grapes: app
            .id_of("SELECT id FROM produce WHERE name = 'Organic Grapes'")
            .await,
        urea: app.id_of("SELECT id FROM products LIMIT 1").await,
    }
}

#[tokio::test]
async fn order_total_is_the_sum_of_priced_lines() {
    let app = TestApp::new().await;
    let catalog = catalog(&app).await;
    let consumer = app.sign_in(common::CONSUMER_PHONE).await;

    let (status, order) = app
        .post(
            "/api/v1/orders",
            Some(&consumer),
            json!({
                "delivery_address": "Kochi",
                "items": [
                    { "produce_id": catalog.onions, "seller_id": catalog.farmer_id, "quantity": 10.0 },
                    { "produce_id": catalog.grapes, "seller_id": catalog.farmer_id, "quantity": 2.0 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["total_amount"], 480.0);
    assert_eq!(order["seller_id"], catalog.farmer_id.as_str());
    assert_eq!(order["status"], "pending");

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["unit_price"], 30.0);
    assert_eq!(items[0]["total_price"], 300.0);
    assert_eq!(items[1]["total_price"], 180.0);

    let id = order["id"].as_str().unwrap();
    assert_eq!(
        app.scalar(&format!(
            "SELECT COUNT(*) FROM order_items WHERE order_id = '{}'",
            id
        ))
        .await,
        2
    );

    let (status, fetched) = app
        .get(&format!("/api/v1/orders/{}", id), Some(&consumer))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["items"].as_array().unwrap().len(), 2);

    let farmer = app.sign_in(common::FARMER_PHONE).await;
    let (status, _) = app
        .get(&format!("/api/v1/orders/{}", id), Some(&farmer))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, received) = app.get("/api/v1/orders", Some(&farmer)).await;
    assert_eq!(received["pagination"]["total"], 1);

    let outsider = app.sign_in(common::TRANSPORTER_PHONE).await;
    let (status, _) = app
        .get(&format!("/api/v1/orders/{}", id), Some(&outsider))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_catalog_item_leaves_no_trace() {
    let app = TestApp::new().await;
    let catalog = catalog(&app).await;
    let consumer = app.sign_in(common::CONSUMER_PHONE).await;

    let (status, body) = app
        .post(
            "/api/v1/orders",
            Some(&consumer),
            json!({
                "items": [
                    { "produce_id": catalog.onions, "seller_id": catalog.farmer_id, "quantity": 1.0 },
                    { "produce_id": "missing", "seller_id": catalog.farmer_id, "quantity": 1.0 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Sorry an error occurred");

    assert_eq!(app.scalar("SELECT COUNT(*) FROM orders").await, 0);
    assert_eq!(app.scalar("SELECT COUNT(*) FROM order_items").await, 0);
}

#[tokio::test]
async fn malformed_orders_are_rejected_before_writing() {
    let app = TestApp::new().await;
    let catalog = catalog(&app).await;
    let consumer = app.sign_in(common::CONSUMER_PHONE).await;

    let (status, body) = app
        .post(
            "/api/v1/orders",
            Some(&consumer),
            json!({
                "items": [
                    { "produce_id": catalog.onions, "seller_id": catalog.farmer_id, "quantity": 1.0 },
                    { "product_id": catalog.urea, "seller_id": catalog.supplier_id, "quantity": 1.0 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "All items in an order must come from the same seller"
    );

    let (status, _) = app
        .post(
            "/api/v1/orders",
            Some(&consumer),
            json!({
                "items": [
                    { "produce_id": catalog.onions, "product_id": catalog.urea, "seller_id": catalog.farmer_id, "quantity": 1.0 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/orders",
            Some(&consumer),
            json!({
                "items": [
                    { "produce_id": catalog.onions, "seller_id": catalog.farmer_id, "quantity": 0.0 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post("/api/v1/orders", Some(&consumer), json!({ "items": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Order must contain at least one item");

    assert_eq!(app.scalar("SELECT COUNT(*) FROM orders").await, 0);
}

#[tokio::test]
async fn verified_payment_settles_the_order() {
    let app = TestApp::new().await;
    let catalog = catalog(&app).await;
    let consumer = app.sign_in(common::CONSUMER_PHONE).await;

    let (_, order) = app
        .post(
            "/api/v1/orders",
            Some(&consumer),
            json!({
                "items": [
                    { "product_id": catalog.urea, "seller_id": catalog.supplier_id, "quantity": 2.0 }
                ]
            }),
        )
        .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, details) = app
        .post(
            "/api/v1/payments/create-order",
            Some(&consumer),
            json!({ "order_id": order_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(details["gateway_order"]["amount"], 53300);
    assert_eq!(details["gateway_order"]["currency"], "INR");
    assert_eq!(details["payment"]["status"], "created");

    let gateway_order_id = details["gateway_order"]["id"].as_str().unwrap();
    assert!(gateway_order_id.starts_with("order_"));

    let (status, body) = app
        .post(
            "/api/v1/payments/verify",
            Some(&consumer),
            json!({
                "gateway_order_id": gateway_order_id,
                "gateway_payment_id": "pay_test",
                "payment_method": "upi"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment"]["status"], "completed");
    assert_eq!(body["payment"]["payment_method"], "upi");

    let (_, order) = app
        .get(&format!("/api/v1/orders/{}", order_id), Some(&consumer))
        .await;
    assert_eq!(order["payment_status"], "paid");

    let (status, body) = app
        .post(
            "/api/v1/payments/create-order",
            Some(&consumer),
            json!({ "order_id": order_id }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Payment has already been made");
}

#[tokio::test]
async fn payments_are_private_to_the_payer() {
    let app = TestApp::new().await;
    let consumer = app.sign_in(common::CONSUMER_PHONE).await;
    let farmer = app.sign_in(common::FARMER_PHONE).await;

    let (status, details) = app
        .post(
            "/api/v1/payments/create-order",
            Some(&consumer),
            json!({ "amount": 99.5 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(details["gateway_order"]["amount"], 9950);

    let (status, _) = app
        .post(
            "/api/v1/payments/verify",
            Some(&farmer),
            json!({
                "gateway_order_id": details["gateway_order"]["id"],
                "gateway_payment_id": "pay_test"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/api/v1/payments/create-order", Some(&consumer), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
