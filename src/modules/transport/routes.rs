use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use super::repository::{self, TransportScope};
use crate::{
    modules::{auth::middleware::Auth, user::repository::Role},
    types::Context,
    utils::{
        error::{Error, Result},
        pagination::Pagination,
        validation::{QueryParams, ValidatedJson},
    },
};

#[derive(Deserialize, Default)]
struct Filters {
    #[serde(default)]
    assigned: bool,
}

async fn get_transport_requests(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    pagination: Pagination,
    QueryParams(filters): QueryParams<Filters>,
) -> Result<impl IntoResponse> {
    let scope = match (auth.role(), filters.assigned) {
        (Role::TransportProvider, true) => TransportScope::Provider(auth.user_id()),
        (Role::TransportProvider, false) => TransportScope::Open,
        _ => TransportScope::Requester(auth.user_id()),
    };

    let requests = repository::find_many(&ctx.db_conn.pool, scope, &pagination).await?;

    Ok((StatusCode::OK, Json(requests)))
}

#[derive(Deserialize, Validate)]
struct CreateTransportRequestPayload {
    #[validate(length(min = 1, message = "Pickup location is required"))]
    pickup_location: String,
    #[validate(length(min = 1, message = "Delivery location is required"))]
    delivery_location: String,
    #[validate(length(min = 1, message = "Cargo type is required"))]
    cargo_type: String,
    #[validate(range(exclusive_min = 0.0, message = "Cargo weight must be greater than zero"))]
    cargo_weight_kg: f64,
    #[validate(range(min = 0.0, message = "Distance cannot be negative"))]
    distance_km: Option<f64>,
    #[validate(range(min = 0.0, message = "Offered price cannot be negative"))]
    offered_price: Option<f64>,
    pickup_date: Option<NaiveDate>,
}

async fn create_transport_request(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    ValidatedJson(payload): ValidatedJson<CreateTransportRequestPayload>,
) -> Result<impl IntoResponse> {
    let request = repository::create(
        &ctx.db_conn.pool,
        repository::CreateTransportRequestPayload {
            requester_id: auth.user_id().to_string(),
            pickup_location: payload.pickup_location,
            delivery_location: payload.delivery_location,
            cargo_type: payload.cargo_type,
            cargo_weight_kg: payload.cargo_weight_kg,
            distance_km: payload.distance_km,
            offered_price: payload.offered_price,
            pickup_date: payload.pickup_date,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

async fn accept_transport_request(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    auth.authorize(&[Role::TransportProvider])?;

    if let Some(request) = repository::accept(&ctx.db_conn.pool, &id, auth.user_id()).await? {
        tracing::info!("Transport request {} accepted by {}", id, auth.user_id());
        return Ok((StatusCode::OK, Json(request)));
    }

    match repository::find_by_id(&ctx.db_conn.pool, &id).await? {
        Some(_) => Err(Error::Validation(String::from(
            "Transport request is no longer pending",
        ))),
        None => Err(Error::NotFound(String::from("Transport request not found"))),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route(
            "/",
            get(get_transport_requests).post(create_transport_request),
        )
        .route("/:id/accept", put(accept_transport_request))
}
