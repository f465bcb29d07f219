use std::fmt;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};
use ulid::Ulid;

use crate::utils::error::{Error, Result};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    Farmer,
    EquipmentProvider,
    InputSupplier,
    TransportProvider,
    Consumer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::EquipmentProvider => "equipment_provider",
            Role::InputSupplier => "input_supplier",
            Role::TransportProvider => "transport_provider",
            Role::Consumer => "consumer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: Role,
    pub location: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Owner fields joined onto every listing.
#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct OwnerSummary {
    pub owner_name: String,
    pub owner_phone: String,
    pub owner_location: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CreateUserPayload {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: Role,
    pub location: Option<String>,
    pub is_verified: bool,
}

fn map_write_error(context: &str, err: sqlx::Error) -> Error {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            Error::Conflict(String::from("User with this phone or email already exists"))
        }
        _ => Error::internal(context, err),
    }
}

pub async fn create<'e, E: SqliteExecutor<'e>>(e: E, payload: CreateUserPayload) -> Result<User> {
    let now = Utc::now().naive_utc();

    sqlx::query_as::<_, User>(
        "
        INSERT INTO users (id, name, phone, email, role, location, is_verified, is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, TRUE, ?, ?)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.name)
    .bind(payload.phone)
    .bind(payload.email)
    .bind(payload.role)
    .bind(payload.location)
    .bind(payload.is_verified)
    .bind(now)
    .bind(now)
    .fetch_one(e)
    .await
    .map_err(|err| map_write_error("Error occurred while creating a user account", err))
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(e: E, id: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(e)
        .await
        .map_err(|err| Error::internal(&format!("Error occurred while fetching user {}", id), err))
}

pub async fn find_by_phone<'e, E: SqliteExecutor<'e>>(e: E, phone: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone = ?")
        .bind(phone)
        .fetch_optional(e)
        .await
        .map_err(|err| Error::internal("Error occurred in find_by_phone", err))
}

pub async fn find_by_phone_or_email<'e, E: SqliteExecutor<'e>>(
    e: E,
    phone: &str,
    email: Option<&str>,
) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE phone = ? OR (? IS NOT NULL AND email = ?) LIMIT 1",
    )
    .bind(phone)
    .bind(email)
    .bind(email)
    .fetch_optional(e)
    .await
    .map_err(|err| Error::internal("Error occurred in find_by_phone_or_email", err))
}

pub struct UpdateUserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
}

pub async fn update_by_id<'e, E: SqliteExecutor<'e>>(
    e: E,
    id: &str,
    payload: UpdateUserPayload,
) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "
        UPDATE users SET
            name = COALESCE(?, name),
            email = COALESCE(?, email),
            location = COALESCE(?, location),
            updated_at = ?
        WHERE id = ?
        RETURNING *
        ",
    )
    .bind(payload.name)
    .bind(payload.email)
    .bind(payload.location)
    .bind(Utc::now().naive_utc())
    .bind(id)
    .fetch_optional(e)
    .await
    .map_err(|err| map_write_error("Error occurred while updating user", err))
}

pub async fn count<'e, E: SqliteExecutor<'e>>(e: E) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(e)
        .await
        .map_err(|err| Error::internal("Error occurred while counting users", err))
}
