use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use ulid::Ulid;

use crate::utils::{
    error::{Error, Result},
    pagination::{Paginated, Pagination},
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TransportStatus {
    Pending,
    Accepted,
    InTransit,
    Delivered,
    Cancelled,
}

#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct TransportRequest {
    pub id: String,
    pub requester_id: String,
    pub provider_id: Option<String>,
    pub pickup_location: String,
    pub delivery_location: String,
    pub cargo_type: String,
    pub cargo_weight_kg: f64,
    pub distance_km: Option<f64>,
    pub offered_price: Option<f64>,
    pub status: TransportStatus,
    pub pickup_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

pub struct CreateTransportRequestPayload {
    pub requester_id: String,
    pub pickup_location: String,
    pub delivery_location: String,
    pub cargo_type: String,
    pub cargo_weight_kg: f64,
    pub distance_km: Option<f64>,
    pub offered_price: Option<f64>,
    pub pickup_date: Option<NaiveDate>,
}

pub async fn create<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateTransportRequestPayload,
) -> Result<TransportRequest> {
    let now = Utc::now().naive_utc();

    sqlx::query_as::<_, TransportRequest>(
        "
        INSERT INTO transport_requests (
            id,
            requester_id,
            pickup_location,
            delivery_location,
            cargo_type,
            cargo_weight_kg,
            distance_km,
            offered_price,
            status,
            pickup_date,
            created_at,
            updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.requester_id)
    .bind(payload.pickup_location)
    .bind(payload.delivery_location)
    .bind(payload.cargo_type)
    .bind(payload.cargo_weight_kg)
    .bind(payload.distance_km)
    .bind(payload.offered_price)
    .bind(TransportStatus::Pending)
    .bind(payload.pickup_date)
    .bind(now)
    .bind(now)
    .fetch_one(e)
    .await
    .map_err(|err| Error::internal("Error occurred while creating transport request", err))
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(
    e: E,
    id: &str,
) -> Result<Option<TransportRequest>> {
    sqlx::query_as::<_, TransportRequest>("SELECT * FROM transport_requests WHERE id = ?")
        .bind(id)
        .fetch_optional(e)
        .await
        .map_err(|err| Error::internal("Error occurred while fetching transport request", err))
}

/// Claims a pending request for the provider. Returns `None` when the request
/// does not exist or has already left the pending state.
pub async fn accept<'e, E: SqliteExecutor<'e>>(
    e: E,
    id: &str,
    provider_id: &str,
) -> Result<Option<TransportRequest>> {
    sqlx::query_as::<_, TransportRequest>(
        "
        UPDATE transport_requests
        SET provider_id = ?, status = ?, updated_at = ?
        WHERE id = ? AND status = ?
        RETURNING *
        ",
    )
    .bind(provider_id)
    .bind(TransportStatus::Accepted)
    .bind(Utc::now().naive_utc())
    .bind(id)
    .bind(TransportStatus::Pending)
    .fetch_optional(e)
    .await
    .map_err(|err| Error::internal("Error occurred while accepting transport request", err))
}

pub enum TransportScope<'a> {
    Open,
    Requester(&'a str),
    Provider(&'a str),
}

fn push_scope(builder: &mut QueryBuilder<'_, Sqlite>, scope: &TransportScope<'_>) {
    match scope {
        TransportScope::Open => {
            builder.push(" WHERE status = ");
            builder.push_bind(TransportStatus::Pending);
        }
        TransportScope::Requester(user_id) => {
            builder.push(" WHERE requester_id = ");
            builder.push_bind(user_id.to_string());
        }
        TransportScope::Provider(user_id) => {
            builder.push(" WHERE provider_id = ");
            builder.push_bind(user_id.to_string());
        }
    }
}

pub async fn find_many(
    pool: &SqlitePool,
    scope: TransportScope<'_>,
    pagination: &Pagination,
) -> Result<Paginated<TransportRequest>> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM transport_requests");
    push_scope(&mut builder, &scope);
    builder.push(" ORDER BY created_at DESC LIMIT ");
    builder.push_bind(i64::from(pagination.limit()));
    builder.push(" OFFSET ");
    builder.push_bind(pagination.offset());

    let items = builder
        .build_query_as::<TransportRequest>()
        .fetch_all(pool)
        .await
        .map_err(|err| Error::internal("Error occurred while listing transport requests", err))?;

    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM transport_requests");
    push_scope(&mut count, &scope);

    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .map_err(|err| Error::internal("Error occurred while counting transport requests", err))?;

    Ok(Paginated::new(items, total as u32, pagination))
}
