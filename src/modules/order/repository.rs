use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use ulid::Ulid;

use crate::{
    modules::payment::repository::PaymentStatus,
    utils::{
        error::{Error, Result},
        pagination::{Paginated, Pagination},
    },
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Order {
    pub id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub delivery_address: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Order {
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub produce_id: Option<String>,
    pub product_id: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Clone, Debug)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

pub struct CreateOrderPayload {
    pub buyer_id: String,
    pub seller_id: String,
    pub delivery_address: Option<String>,
}

pub async fn create<'e, E: SqliteExecutor<'e>>(e: E, payload: CreateOrderPayload) -> Result<Order> {
    let now = Utc::now().naive_utc();

    sqlx::query_as::<_, Order>(
        "
        INSERT INTO orders (
            id,
            buyer_id,
            seller_id,
            total_amount,
            status,
            payment_status,
            delivery_address,
            created_at,
            updated_at
        )
        VALUES (?, ?, ?, 0, ?, ?, ?, ?, ?)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.buyer_id)
    .bind(payload.seller_id)
    .bind(OrderStatus::Pending)
    .bind(PaymentStatus::Pending)
    .bind(payload.delivery_address)
    .bind(now)
    .bind(now)
    .fetch_one(e)
    .await
    .map_err(|err| Error::internal("Error occurred while creating order", err))
}

pub enum CatalogItem {
    Produce(String),
    Product(String),
}

pub struct CreateOrderItemPayload {
    pub order_id: String,
    pub item: CatalogItem,
    pub quantity: f64,
    pub unit_price: f64,
}

pub async fn create_item<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateOrderItemPayload,
) -> Result<OrderItem> {
    let now = Utc::now().naive_utc();
    let (produce_id, product_id) = match payload.item {
        CatalogItem::Produce(id) => (Some(id), None),
        CatalogItem::Product(id) => (None, Some(id)),
    };

    sqlx::query_as::<_, OrderItem>(
        "
        INSERT INTO order_items (
            id,
            order_id,
            produce_id,
            product_id,
            quantity,
            unit_price,
            total_price,
            created_at,
            updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.order_id)
    .bind(produce_id)
    .bind(product_id)
    .bind(payload.quantity)
    .bind(payload.unit_price)
    .bind(payload.unit_price * payload.quantity)
    .bind(now)
    .bind(now)
    .fetch_one(e)
    .await
    .map_err(|err| Error::internal("Error occurred while creating order item", err))
}

pub async fn update_total<'e, E: SqliteExecutor<'e>>(
    e: E,
    id: &str,
    total_amount: f64,
) -> Result<Order> {
    sqlx::query_as::<_, Order>(
        "UPDATE orders SET total_amount = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(total_amount)
    .bind(Utc::now().naive_utc())
    .bind(id)
    .fetch_one(e)
    .await
    .map_err(|err| Error::internal("Error occurred while updating order total", err))
}

pub async fn update_payment_status<'e, E: SqliteExecutor<'e>>(
    e: E,
    id: &str,
    payment_status: PaymentStatus,
) -> Result<u64> {
    sqlx::query("UPDATE orders SET payment_status = ?, updated_at = ? WHERE id = ?")
        .bind(payment_status)
        .bind(Utc::now().naive_utc())
        .bind(id)
        .execute(e)
        .await
        .map(|result| result.rows_affected())
        .map_err(|err| Error::internal("Error occurred while updating order payment status", err))
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(e: E, id: &str) -> Result<Option<Order>> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(e)
        .await
        .map_err(|err| Error::internal("Error occurred while fetching order by id", err))
}

pub async fn find_items_by_order_id<'e, E: SqliteExecutor<'e>>(
    e: E,
    order_id: &str,
) -> Result<Vec<OrderItem>> {
    sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = ? ORDER BY created_at, id",
    )
    .bind(order_id)
    .fetch_all(e)
    .await
    .map_err(|err| Error::internal("Error occurred while fetching order items", err))
}

pub async fn find_many_by_participant(
    pool: &SqlitePool,
    user_id: &str,
    pagination: &Pagination,
) -> Result<Paginated<Order>> {
    let items = sqlx::query_as::<_, Order>(
        "
        SELECT * FROM orders
        WHERE buyer_id = ? OR seller_id = ?
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        ",
    )
    .bind(user_id)
    .bind(user_id)
    .bind(i64::from(pagination.limit()))
    .bind(pagination.offset())
    .fetch_all(pool)
    .await
    .map_err(|err| Error::internal("Error occurred while listing orders", err))?;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE buyer_id = ? OR seller_id = ?")
            .bind(user_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
            .map_err(|err| Error::internal("Error occurred while counting orders", err))?;

    Ok(Paginated::new(items, total as u32, pagination))
}
