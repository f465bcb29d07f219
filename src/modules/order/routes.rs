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

use super::{
    repository::{self, CatalogItem, OrderWithItems},
    service,
};
use crate::{
    modules::auth::middleware::Auth,
    types::Context,
    utils::{
        error::{Error, Result},
        pagination::Pagination,
        validation::ValidatedJson,
    },
};

async fn get_orders(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    pagination: Pagination,
) -> Result<impl IntoResponse> {
    let orders =
        repository::find_many_by_participant(&ctx.db_conn.pool, auth.user_id(), &pagination)
            .await?;

    Ok((StatusCode::OK, Json(orders)))
}

async fn get_order_by_id(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let order = repository::find_by_id(&ctx.db_conn.pool, &id)
        .await?
        .ok_or_else(|| Error::NotFound(String::from("Order not found")))?;

    if !order.is_participant(auth.user_id()) {
        return Err(Error::Forbidden(String::from("Access denied")));
    }

    let items = repository::find_items_by_order_id(&ctx.db_conn.pool, &order.id).await?;

    Ok((StatusCode::OK, Json(OrderWithItems { order, items })))
}

#[derive(Deserialize, Validate)]
struct OrderItemPayload {
    produce_id: Option<String>,
    product_id: Option<String>,
    #[validate(length(min = 1, message = "Seller id is required"))]
    seller_id: String,
    #[validate(range(exclusive_min = 0.0, message = "Quantity must be greater than zero"))]
    quantity: f64,
}

impl OrderItemPayload {
    fn into_line(self) -> Result<service::OrderLine> {
        let item = match (self.produce_id, self.product_id) {
            (Some(produce_id), None) => CatalogItem::Produce(produce_id),
            (None, Some(product_id)) => CatalogItem::Product(product_id),
            _ => {
                return Err(Error::Validation(String::from(
                    "Each item must reference exactly one of produce_id or product_id",
                )))
            }
        };

        Ok(service::OrderLine {
            item,
            quantity: self.quantity,
        })
    }
}

#[derive(Deserialize, Validate)]
struct CreateOrderPayload {
    #[validate(nested)]
    items: Vec<OrderItemPayload>,
    delivery_address: Option<String>,
}

async fn create_order(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    ValidatedJson(payload): ValidatedJson<CreateOrderPayload>,
) -> Result<impl IntoResponse> {
    let seller_id = match payload.items.first() {
        Some(item) => item.seller_id.clone(),
        None => {
            return Err(Error::Validation(String::from(
                "Order must contain at least one item",
            )))
        }
    };

    if payload.items.iter().any(|item| item.seller_id != seller_id) {
        return Err(Error::Validation(String::from(
            "All items in an order must come from the same seller",
        )));
    }

    let lines = payload
        .items
        .into_iter()
        .map(OrderItemPayload::into_line)
        .collect::<Result<Vec<_>>>()?;

    let order = service::place_order(
        &ctx,
        service::PlaceOrderPayload {
            buyer_id: auth.user_id().to_string(),
            seller_id,
            delivery_address: payload.delivery_address,
            lines,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_orders).post(create_order))
        .route("/:id", get(get_order_by_id))
}
