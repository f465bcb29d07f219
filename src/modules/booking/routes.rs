use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use super::repository::{self, BookingScope};
use crate::{
    modules::{
        auth::middleware::Auth,
        equipment::{self, repository::AvailabilityStatus},
        user::repository::Role,
    },
    types::Context,
    utils::{
        error::{Error, Result},
        pagination::Pagination,
        validation::ValidatedJson,
    },
};

async fn get_bookings(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    pagination: Pagination,
) -> Result<impl IntoResponse> {
    let scope = match auth.role() {
        Role::EquipmentProvider => BookingScope::EquipmentOwner(auth.user_id()),
        _ => BookingScope::Renter(auth.user_id()),
    };

    let bookings = repository::find_many(&ctx.db_conn.pool, scope, &pagination).await?;

    Ok((StatusCode::OK, Json(bookings)))
}

#[derive(Deserialize, Validate)]
struct CreateBookingPayload {
    #[validate(length(min = 1, message = "Equipment id is required"))]
    equipment_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

/// Days billed for a booking; both ends of the range count.
fn rental_days(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    (end_date - start_date).num_days() + 1
}

async fn create_booking(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    ValidatedJson(payload): ValidatedJson<CreateBookingPayload>,
) -> Result<impl IntoResponse> {
    if payload.end_date < payload.start_date {
        return Err(Error::Validation(String::from(
            "End date cannot be before start date",
        )));
    }

    let mut tx = ctx
        .db_conn
        .pool
        .begin()
        .await
        .map_err(|err| Error::internal("Failed to start database transaction", err))?;

    let equipment = equipment::repository::find_by_id(&mut *tx, &payload.equipment_id)
        .await?
        .ok_or_else(|| Error::NotFound(String::from("Equipment not found")))?;

    if equipment.availability_status != AvailabilityStatus::Available {
        return Err(Error::Validation(String::from("Equipment is not available")));
    }

    if equipment.owner_id == auth.user_id() {
        return Err(Error::Validation(String::from(
            "You cannot book your own equipment",
        )));
    }

    if repository::has_overlap(
        &mut *tx,
        &equipment.id,
        payload.start_date,
        payload.end_date,
    )
    .await?
    {
        return Err(Error::Validation(String::from(
            "Equipment is already booked for the selected dates",
        )));
    }

    let booking = repository::create(
        &mut *tx,
        repository::CreateBookingPayload {
            equipment_id: equipment.id,
            renter_id: auth.user_id().to_string(),
            start_date: payload.start_date,
            end_date: payload.end_date,
            total_amount: equipment.price_per_day
                * rental_days(payload.start_date, payload.end_date) as f64,
        },
    )
    .await?;

    tx.commit()
        .await
        .map_err(|err| Error::internal("Failed to commit database transaction", err))?;

    Ok((StatusCode::CREATED, Json(booking)))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new().route("/", get(get_bookings).post(create_booking))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_both_ends_of_the_range() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();

        assert_eq!(rental_days(day(1), day(1)), 1);
        assert_eq!(rental_days(day(1), day(3)), 3);
    }
}
