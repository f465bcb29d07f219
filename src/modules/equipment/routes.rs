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

async fn get_equipment(
    State(ctx): State<Arc<Context>>,
    pagination: Pagination,
    QueryParams(filters): QueryParams<repository::Filters>,
) -> Result<impl IntoResponse> {
    let equipment = repository::find_many(&ctx.db_conn.pool, &pagination, &filters).await?;

    Ok((StatusCode::OK, Json(equipment)))
}

async fn get_equipment_by_id(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let equipment = repository::find_listing_by_id(&ctx.db_conn.pool, &id)
        .await?
        .ok_or_else(|| Error::NotFound(String::from("Equipment not found")))?;

    Ok((StatusCode::OK, Json(equipment)))
}

#[derive(Deserialize, Validate)]
struct CreateEquipmentPayload {
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[validate(length(min = 1, message = "Equipment type is required"))]
    equipment_type: String,
    description: Option<String>,
    specifications: Option<serde_json::Value>,
    #[validate(range(min = 0.0, message = "Price per day cannot be negative"))]
    price_per_day: f64,
    location: Option<String>,
}

async fn create_equipment(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    payload: Result<ValidatedJson<CreateEquipmentPayload>>,
) -> Result<impl IntoResponse> {
    auth.authorize(&[Role::EquipmentProvider])?;
    let ValidatedJson(payload) = payload?;

    let equipment = repository::create(
        &ctx.db_conn.pool,
        repository::CreateEquipmentPayload {
            owner_id: auth.user_id().to_string(),
            name: payload.name,
            equipment_type: payload.equipment_type,
            description: payload.description,
            specifications: payload
                .specifications
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            price_per_day: payload.price_per_day,
            location: payload.location,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(equipment)))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_equipment).post(create_equipment))
        .route("/:id", get(get_equipment_by_id))
}
