use sqlx::{Sqlite, Transaction};

use super::repository::{self, CatalogItem, OrderWithItems};
use crate::{
    modules::{produce, product},
    types::Context,
    utils::error::{Error, Result},
};

pub struct OrderLine {
    pub item: CatalogItem,
    pub quantity: f64,
}

pub struct PlaceOrderPayload {
    pub buyer_id: String,
    pub seller_id: String,
    pub delivery_address: Option<String>,
    pub lines: Vec<OrderLine>,
}

async fn resolve_unit_price(tx: &mut Transaction<'_, Sqlite>, item: &CatalogItem) -> Result<f64> {
    match item {
        CatalogItem::Produce(id) => produce::repository::find_by_id(&mut **tx, id)
            .await?
            .map(|produce| produce.price_per_kg)
            .ok_or_else(|| Error::Internal(format!("Produce {} not found", id))),
        CatalogItem::Product(id) => product::repository::find_by_id(&mut **tx, id)
            .await?
            .map(|product| product.price_per_unit)
            .ok_or_else(|| Error::Internal(format!("Product {} not found", id))),
    }
}

async fn write_order(
    tx: &mut Transaction<'_, Sqlite>,
    payload: PlaceOrderPayload,
) -> Result<OrderWithItems> {
    let order = repository::create(
        &mut **tx,
        repository::CreateOrderPayload {
            buyer_id: payload.buyer_id,
            seller_id: payload.seller_id,
            delivery_address: payload.delivery_address,
        },
    )
    .await?;

    let mut total_amount = 0.0;
    let mut items = Vec::with_capacity(payload.lines.len());

    for line in payload.lines {
        let unit_price = resolve_unit_price(tx, &line.item).await?;

        let item = repository::create_item(
            &mut **tx,
            repository::CreateOrderItemPayload {
                order_id: order.id.clone(),
                item: line.item,
                quantity: line.quantity,
                unit_price,
            },
        )
        .await?;

        total_amount += item.total_price;
        items.push(item);
    }

    let order = repository::update_total(&mut **tx, &order.id, total_amount).await?;

    Ok(OrderWithItems { order, items })
}

/// Creates the order header, one item per line priced from the catalog, and
/// the final total. Either all of it is committed or none of it is.
pub async fn place_order(ctx: &Context, payload: PlaceOrderPayload) -> Result<OrderWithItems> {
    let mut tx = ctx
        .db_conn
        .pool
        .begin()
        .await
        .map_err(|err| Error::internal("Failed to start database transaction", err))?;

    match write_order(&mut tx, payload).await {
        Ok(order) => {
            tx.commit()
                .await
                .map_err(|err| Error::internal("Failed to commit database transaction", err))?;

            tracing::info!(
                "Order {} placed with {} items totalling {}",
                order.order.id,
                order.items.len(),
                order.order.total_amount
            );
            Ok(order)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Failed to roll back order transaction: {}", rollback_err);
            }

            Err(match err {
                Error::Internal(_) => err,
                other => Error::Internal(other.to_string()),
            })
        }
    }
}
