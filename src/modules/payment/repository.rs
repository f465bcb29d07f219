use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};
use ulid::Ulid;

use crate::utils::error::{Error, Result};

/// Settlement state carried by orders and bookings.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

/// State of a single payment attempt.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TransactionStatus {
    Created,
    Completed,
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub order_id: Option<String>,
    pub booking_id: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub payment_method: Option<String>,
    pub gateway: String,
    pub gateway_transaction_id: Option<String>,
    pub status: TransactionStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

pub struct CreatePaymentPayload {
    pub user_id: String,
    pub order_id: Option<String>,
    pub booking_id: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub gateway: String,
    pub gateway_transaction_id: String,
}

pub async fn create<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreatePaymentPayload,
) -> Result<Payment> {
    let now = Utc::now().naive_utc();

    sqlx::query_as::<_, Payment>(
        "
        INSERT INTO payments (
            id,
            user_id,
            order_id,
            booking_id,
            amount,
            currency,
            gateway,
            gateway_transaction_id,
            status,
            created_at,
            updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.user_id)
    .bind(payload.order_id)
    .bind(payload.booking_id)
    .bind(payload.amount)
    .bind(payload.currency)
    .bind(payload.gateway)
    .bind(payload.gateway_transaction_id)
    .bind(TransactionStatus::Created)
    .bind(now)
    .bind(now)
    .fetch_one(e)
    .await
    .map_err(|err| Error::internal("Error occurred while creating payment", err))
}

pub async fn find_by_gateway_transaction_id<'e, E: SqliteExecutor<'e>>(
    e: E,
    gateway_transaction_id: &str,
) -> Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE gateway_transaction_id = ?")
        .bind(gateway_transaction_id)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            Error::internal("Error occurred while fetching payment by gateway reference", err)
        })
}

pub async fn complete<'e, E: SqliteExecutor<'e>>(
    e: E,
    id: &str,
    payment_method: Option<String>,
) -> Result<Payment> {
    sqlx::query_as::<_, Payment>(
        "
        UPDATE payments
        SET status = ?, payment_method = COALESCE(?, payment_method), updated_at = ?
        WHERE id = ?
        RETURNING *
        ",
    )
    .bind(TransactionStatus::Completed)
    .bind(payment_method)
    .bind(Utc::now().naive_utc())
    .bind(id)
    .fetch_one(e)
    .await
    .map_err(|err| Error::internal("Error occurred while completing payment", err))
}
