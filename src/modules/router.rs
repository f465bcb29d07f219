use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde_json::json;

use super::{auth, booking, dashboard, equipment, order, payment, produce, product, transport, user};
use crate::types::Context;

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "OK", "timestamp": Utc::now().to_rfc3339() }))
}

fn api_router() -> Router<Arc<Context>> {
    Router::new()
        .nest("/auth", auth::routes::get_router())
        .nest("/users", user::routes::get_router())
        .nest("/dashboard", dashboard::routes::get_router())
        .nest("/equipment", equipment::routes::get_router())
        .nest("/produce", produce::routes::get_router())
        .nest("/products", product::routes::get_router())
        .nest("/bookings", booking::routes::get_router())
        .nest("/orders", order::routes::get_router())
        .nest("/transport", transport::routes::get_router())
        .nest("/payments", payment::routes::get_router())
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
}
