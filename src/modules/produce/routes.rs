use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use super::repository;
use crate::{
    modules::{auth::middleware::Auth, user::repository::Role},
    types::Context,
    utils::{
        error::{Error, Result},
        pagination::Pagination,
        validation::{QueryParams, ValidatedJson},
    },
};

async fn get_produce(
    State(ctx): State<Arc<Context>>,
    pagination: Pagination,
    QueryParams(filters): QueryParams<repository::Filters>,
) -> Result<impl IntoResponse> {
    let produce = repository::find_many(&ctx.db_conn.pool, &pagination, &filters).await?;

    Ok((StatusCode::OK, Json(produce)))
}

async fn get_produce_by_id(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let produce = repository::find_listing_by_id(&ctx.db_conn.pool, &id)
        .await?
        .ok_or_else(|| Error::NotFound(String::from("Produce not found")))?;

    Ok((StatusCode::OK, Json(produce)))
}

#[derive(Deserialize, Validate)]
struct CreateProducePayload {
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[validate(length(min = 1, message = "Category is required"))]
    category: String,
    description: Option<String>,
    #[validate(range(min = 0.0, message = "Price per kg cannot be negative"))]
    price_per_kg: f64,
    #[validate(range(min = 0.0, message = "Stock cannot be negative"))]
    stock_kg: f64,
    harvest_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
    #[serde(default)]
    is_organic: bool,
    location: Option<String>,
}

async fn create_produce(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    payload: Result<ValidatedJson<CreateProducePayload>>,
) -> Result<impl IntoResponse> {
    auth.authorize(&[Role::Farmer])?;
    let ValidatedJson(payload) = payload?;

    let produce = repository::create(
        &ctx.db_conn.pool,
        repository::CreateProducePayload {
            farmer_id: auth.user_id().to_string(),
            name: payload.name,
            category: payload.category,
            description: payload.description,
            price_per_kg: payload.price_per_kg,
            stock_kg: payload.stock_kg,
            harvest_date: payload.harvest_date,
            expiry_date: payload.expiry_date,
            is_organic: payload.is_organic,
            location: payload.location,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(produce)))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_produce).post(create_produce))
        .route("/:id", get(get_produce_by_id))
}
