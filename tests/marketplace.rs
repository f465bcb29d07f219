mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::empty().await;

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn equipment_creation_is_limited_to_providers() {
    let app = TestApp::new().await;
    let token = app.sign_in(common::FARMER_PHONE).await;

    let (status, body) = app
        .post(
            "/api/v1/equipment",
            Some(&token),
            json!({ "name": "Sprayer", "equipment_type": "sprayer", "price_per_day": 300.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Insufficient permissions");
    assert_eq!(
        app.scalar("SELECT COUNT(*) FROM equipment WHERE name = 'Sprayer'")
            .await,
        0
    );

    let (status, _) = app
        .post(
            "/api/v1/equipment",
            None,
            json!({ "name": "Sprayer", "equipment_type": "sprayer", "price_per_day": 300.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_is_checked_before_the_body() {
    let app = TestApp::new().await;
    let consumer = app.sign_in(common::CONSUMER_PHONE).await;

    for uri in ["/api/v1/equipment", "/api/v1/produce", "/api/v1/products"] {
        let (status, body) = app.post(uri, Some(&consumer), json!({})).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["error"], "Insufficient permissions");
    }

    let provider = app.sign_in(common::PROVIDER_PHONE).await;
    let (status, _) = app
        .post("/api/v1/equipment", Some(&provider), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn provider_lists_equipment_with_owner_details() {
    let app = TestApp::new().await;
    let token = app.sign_in(common::PROVIDER_PHONE).await;

    let (status, created) = app
        .post(
            "/api/v1/equipment",
            Some(&token),
            json!({
                "name": "Rotavator",
                "equipment_type": "tillage",
                "specifications": { "blades": 42 },
                "price_per_day": 1200.0,
                "location": "Anand, Gujarat"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["availability_status"], "available");
    assert_eq!(created["specifications"]["blades"], 42);

    let id = created["id"].as_str().unwrap();
    let (status, listing) = app.get(&format!("/api/v1/equipment/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["owner_name"], "Suresh Patel");
    assert_eq!(listing["owner_phone"], common::PROVIDER_PHONE);

    let (status, page) = app
        .get("/api/v1/equipment?equipment_type=tillage", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["pagination"]["total"], 1);

    let (status, page) = app.get("/api/v1/equipment?max_price=2500", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total"], 2);
}

#[tokio::test]
async fn equipment_listing_hides_unavailable_rows() {
    let app = TestApp::new().await;
    let harvester = app
        .id_of("SELECT id FROM equipment WHERE equipment_type = 'harvester'")
        .await;

    let (_, page) = app.get("/api/v1/equipment", None).await;
    assert_eq!(page["pagination"]["total"], 2);

    app.execute(&format!(
        "UPDATE equipment SET availability_status = 'maintenance' WHERE id = '{}'",
        harvester
    ))
    .await;

    let (status, page) = app.get("/api/v1/equipment?limit=100", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total"], 1);

    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert!(items.iter().all(|item| item["id"] != harvester.as_str()));
    assert!(items
        .iter()
        .all(|item| item["availability_status"] == "available"));
}

#[tokio::test]
async fn missing_listing_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/produce/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Produce not found");

    let (status, _) = app.get("/api/v1/products/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn produce_listing_hides_sold_out_rows() {
    let app = TestApp::new().await;
    let token = app.sign_in(common::FARMER_PHONE).await;

    let (status, created) = app
        .post(
            "/api/v1/produce",
            Some(&token),
            json!({
                "name": "Sold Out Tomatoes",
                "category": "vegetables",
                "price_per_kg": 20.0,
                "stock_kg": 0.0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["is_organic"], false);

    let (status, page) = app.get("/api/v1/produce?limit=100", None).await;
    assert_eq!(status, StatusCode::OK);

    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items
        .iter()
        .all(|item| item["stock_kg"].as_f64().unwrap() > 0.0));
    assert_eq!(page["pagination"]["total"], 2);
}

#[tokio::test]
async fn produce_filters_and_pagination() {
    let app = TestApp::new().await;

    let (_, page) = app.get("/api/v1/produce?is_organic=true", None).await;
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Organic Grapes");

    let (_, page) = app.get("/api/v1/produce?search=onion", None).await;
    assert_eq!(page["items"][0]["name"], "Red Onions");

    let (_, page) = app.get("/api/v1/produce?page=2&limit=1", None).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["pagination"]["page"], 2);
    assert_eq!(page["pagination"]["limit"], 1);
    assert_eq!(page["pagination"]["total"], 2);

    let (status, body) = app.get("/api/v1/produce?max_price=cheap", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn products_are_created_by_input_suppliers() {
    let app = TestApp::new().await;
    let supplier = app.sign_in(common::SUPPLIER_PHONE).await;
    let farmer = app.sign_in(common::FARMER_PHONE).await;

    let payload = json!({
        "name": "DAP Fertilizer",
        "category": "fertilizer",
        "price_per_unit": 1350.0,
        "unit": "bag",
        "stock_quantity": 40
    });

    let (status, _) = app
        .post("/api/v1/products", Some(&farmer), payload.clone())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = app
        .post("/api/v1/products", Some(&supplier), payload)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["stock_quantity"], 40);

    let (_, page) = app.get("/api/v1/products?category=fertilizer", None).await;
    assert_eq!(page["pagination"]["total"], 2);
}

#[tokio::test]
async fn booking_prices_every_day_and_rejects_overlaps() {
    let app = TestApp::new().await;
    let consumer = app.sign_in(common::CONSUMER_PHONE).await;
    let tractor = app
        .id_of("SELECT id FROM equipment WHERE equipment_type = 'tractor'")
        .await;

    let (status, booking) = app
        .post(
            "/api/v1/bookings",
            Some(&consumer),
            json!({ "equipment_id": tractor, "start_date": "2024-06-01", "end_date": "2024-06-03" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["total_amount"], 7500.0);
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["payment_status"], "pending");

    let (status, body) = app
        .post(
            "/api/v1/bookings",
            Some(&consumer),
            json!({ "equipment_id": tractor, "start_date": "2024-06-03", "end_date": "2024-06-04" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Equipment is already booked for the selected dates"
    );

    let (status, body) = app
        .post(
            "/api/v1/bookings",
            Some(&consumer),
            json!({ "equipment_id": tractor, "start_date": "2024-07-05", "end_date": "2024-07-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "End date cannot be before start date");

    let (_, mine) = app.get("/api/v1/bookings", Some(&consumer)).await;
    assert_eq!(mine["pagination"]["total"], 1);
    assert_eq!(mine["items"][0]["equipment_type"], "tractor");

    let provider = app.sign_in(common::PROVIDER_PHONE).await;
    let (_, received) = app.get("/api/v1/bookings", Some(&provider)).await;
    assert_eq!(received["pagination"]["total"], 1);

    let (status, body) = app
        .post(
            "/api/v1/bookings",
            Some(&provider),
            json!({ "equipment_id": tractor, "start_date": "2024-08-01", "end_date": "2024-08-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You cannot book your own equipment");
}

#[tokio::test]
async fn transport_requests_are_claimed_once() {
    let app = TestApp::new().await;
    let farmer = app.sign_in(common::FARMER_PHONE).await;
    let transporter = app.sign_in(common::TRANSPORTER_PHONE).await;

    let (status, request) = app
        .post(
            "/api/v1/transport",
            Some(&farmer),
            json!({
                "pickup_location": "Nashik",
                "delivery_location": "Mumbai",
                "cargo_type": "onions",
                "cargo_weight_kg": 500.0,
                "offered_price": 4000.0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "pending");
    let id = request["id"].as_str().unwrap();

    let (_, open) = app.get("/api/v1/transport", Some(&transporter)).await;
    assert_eq!(open["pagination"]["total"], 1);

    let accept = format!("/api/v1/transport/{}/accept", id);
    let (status, _) = app.put(&accept, Some(&farmer), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, accepted) = app.put(&accept, Some(&transporter), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");
    assert!(accepted["provider_id"].is_string());

    let (status, body) = app.put(&accept, Some(&transporter), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Transport request is no longer pending");

    let (status, _) = app
        .put("/api/v1/transport/unknown/accept", Some(&transporter), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, open) = app.get("/api/v1/transport", Some(&transporter)).await;
    assert_eq!(open["pagination"]["total"], 0);

    let (_, assigned) = app
        .get("/api/v1/transport?assigned=true", Some(&transporter))
        .await;
    assert_eq!(assigned["pagination"]["total"], 1);

    let (_, own) = app.get("/api/v1/transport", Some(&farmer)).await;
    assert_eq!(own["items"][0]["status"], "accepted");

    let (_, dashboard) = app.get("/api/v1/dashboard/stats", Some(&transporter)).await;
    assert_eq!(dashboard["role"], "transport_provider");
    assert_eq!(dashboard["stats"]["transport_requests"], 1);
}

#[tokio::test]
async fn dashboard_is_scoped_to_the_caller() {
    let app = TestApp::new().await;

    let farmer = app.sign_in(common::FARMER_PHONE).await;
    let (status, body) = app.get("/api/v1/dashboard/stats", Some(&farmer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["produce_listings"], 2);
    assert_eq!(body["stats"]["total_users"], 0);

    let admin = app.sign_in(common::ADMIN_PHONE).await;
    let (_, body) = app.get("/api/v1/dashboard/stats", Some(&admin)).await;
    assert_eq!(body["stats"]["total_users"], 6);
    assert_eq!(body["stats"]["equipment_listings"], 2);

    let (status, _) = app.get("/api/v1/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
