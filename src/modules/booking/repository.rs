use chrono::{NaiveDate, NaiveDateTime, Utc};
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
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Booking {
    pub id: String,
    pub equipment_id: String,
    pub renter_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_amount: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Clone, Debug, FromRow)]
pub struct BookingListing {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub booking: Booking,
    pub equipment_name: String,
    pub equipment_type: String,
}

pub struct CreateBookingPayload {
    pub equipment_id: String,
    pub renter_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_amount: f64,
}

/// Whose bookings a listing returns.
pub enum BookingScope<'a> {
    Renter(&'a str),
    EquipmentOwner(&'a str),
}

pub async fn create<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateBookingPayload,
) -> Result<Booking> {
    let now = Utc::now().naive_utc();

    sqlx::query_as::<_, Booking>(
        "
        INSERT INTO equipment_bookings (
            id,
            equipment_id,
            renter_id,
            start_date,
            end_date,
            total_amount,
            status,
            payment_status,
            created_at,
            updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.equipment_id)
    .bind(payload.renter_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.total_amount)
    .bind(BookingStatus::Pending)
    .bind(PaymentStatus::Pending)
    .bind(now)
    .bind(now)
    .fetch_one(e)
    .await
    .map_err(|err| Error::internal("Error occurred while creating booking", err))
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(e: E, id: &str) -> Result<Option<Booking>> {
    sqlx::query_as::<_, Booking>("SELECT * FROM equipment_bookings WHERE id = ?")
        .bind(id)
        .fetch_optional(e)
        .await
        .map_err(|err| Error::internal("Error occurred while fetching booking by id", err))
}

/// Whether a pending or confirmed booking on the equipment shares a day with the range.
pub async fn has_overlap<'e, E: SqliteExecutor<'e>>(
    e: E,
    equipment_id: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<bool> {
    let overlapping: i64 = sqlx::query_scalar(
        "
        SELECT COUNT(*) FROM equipment_bookings
        WHERE equipment_id = ?
            AND status IN (?, ?)
            AND start_date <= ?
            AND end_date >= ?
        ",
    )
    .bind(equipment_id)
    .bind(BookingStatus::Pending)
    .bind(BookingStatus::Confirmed)
    .bind(end_date)
    .bind(start_date)
    .fetch_one(e)
    .await
    .map_err(|err| Error::internal("Error occurred while checking booking overlap", err))?;

    Ok(overlapping > 0)
}

pub async fn update_payment_status<'e, E: SqliteExecutor<'e>>(
    e: E,
    id: &str,
    payment_status: PaymentStatus,
) -> Result<u64> {
    sqlx::query("UPDATE equipment_bookings SET payment_status = ?, updated_at = ? WHERE id = ?")
        .bind(payment_status)
        .bind(Utc::now().naive_utc())
        .bind(id)
        .execute(e)
        .await
        .map(|result| result.rows_affected())
        .map_err(|err| Error::internal("Error occurred while updating booking payment status", err))
}

pub async fn find_many(
    pool: &SqlitePool,
    scope: BookingScope<'_>,
    pagination: &Pagination,
) -> Result<Paginated<BookingListing>> {
    let (condition, user_id) = match scope {
        BookingScope::Renter(user_id) => ("equipment_bookings.renter_id = ?", user_id),
        BookingScope::EquipmentOwner(user_id) => ("equipment.owner_id = ?", user_id),
    };

    let items = sqlx::query_as::<_, BookingListing>(&format!(
        "
        SELECT
            equipment_bookings.*,
            equipment.name AS equipment_name,
            equipment.equipment_type AS equipment_type
        FROM equipment_bookings
        INNER JOIN equipment ON equipment.id = equipment_bookings.equipment_id
        WHERE {}
        ORDER BY equipment_bookings.created_at DESC
        LIMIT ? OFFSET ?
        ",
        condition
    ))
    .bind(user_id)
    .bind(i64::from(pagination.limit()))
    .bind(pagination.offset())
    .fetch_all(pool)
    .await
    .map_err(|err| Error::internal("Error occurred while listing bookings", err))?;

    let total: i64 = sqlx::query_scalar(&format!(
        "
        SELECT COUNT(*) FROM equipment_bookings
        INNER JOIN equipment ON equipment.id = equipment_bookings.equipment_id
        WHERE {}
        ",
        condition
    ))
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(|err| Error::internal("Error occurred while counting bookings", err))?;

    Ok(Paginated::new(items, total as u32, pagination))
}
