use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
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

async fn get_products(
    State(ctx): State<Arc<Context>>,
    pagination: Pagination,
    QueryParams(filters): QueryParams<repository::Filters>,
) -> Result<impl IntoResponse> {
    let products = repository::find_many(&ctx.db_conn.pool, &pagination, &filters).await?;

    Ok((StatusCode::OK, Json(products)))
}

async fn get_product_by_id(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let product = repository::find_listing_by_id(&ctx.db_conn.pool, &id)
        .await?
        .ok_or_else(|| Error::NotFound(String::from("Product not found")))?;

    Ok((StatusCode::OK, Json(product)))
}

#[derive(Deserialize, Validate)]
struct CreateProductPayload {
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[validate(length(min = 1, message = "Category is required"))]
    category: String,
    description: Option<String>,
    #[validate(range(min = 0.0, message = "Price per unit cannot be negative"))]
    price_per_unit: f64,
    #[validate(length(min = 1, message = "Unit is required"))]
    unit: String,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    #[serde(default)]
    stock_quantity: i64,
}

async fn create_product(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    payload: Result<ValidatedJson<CreateProductPayload>>,
) -> Result<impl IntoResponse> {
    auth.authorize(&[Role::InputSupplier])?;
    let ValidatedJson(payload) = payload?;

    let product = repository::create(
        &ctx.db_conn.pool,
        repository::CreateProductPayload {
            supplier_id: auth.user_id().to_string(),
            name: payload.name,
            category: payload.category,
            description: payload.description,
            price_per_unit: payload.price_per_unit,
            unit: payload.unit,
            stock_quantity: payload.stock_quantity,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_products).post(create_product))
        .route("/:id", get(get_product_by_id))
}
