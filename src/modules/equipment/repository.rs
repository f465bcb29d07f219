use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use ulid::Ulid;

use crate::{
    modules::user::repository::OwnerSummary,
    utils::{
        error::{Error, Result},
        pagination::{Paginated, Pagination},
    },
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    Rented,
    Maintenance,
}

#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Equipment {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub equipment_type: String,
    pub description: Option<String>,
    pub specifications: Json<serde_json::Value>,
    pub price_per_day: f64,
    pub location: Option<String>,
    pub availability_status: AvailabilityStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Clone, Debug, FromRow)]
pub struct EquipmentListing {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub equipment: Equipment,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub owner: OwnerSummary,
}

#[derive(Deserialize, Default, Clone, Debug)]
pub struct Filters {
    pub equipment_type: Option<String>,
    pub location: Option<String>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
}

pub struct CreateEquipmentPayload {
    pub owner_id: String,
    pub name: String,
    pub equipment_type: String,
    pub description: Option<String>,
    pub specifications: serde_json::Value,
    pub price_per_day: f64,
    pub location: Option<String>,
}

const LISTING_COLUMNS: &str = "
    SELECT
        equipment.*,
        users.name AS owner_name,
        users.phone AS owner_phone,
        users.location AS owner_location
    FROM equipment
    INNER JOIN users ON users.id = equipment.owner_id
";

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &Filters) {
    builder.push(" WHERE equipment.availability_status = ");
    builder.push_bind(AvailabilityStatus::Available);

    if let Some(equipment_type) = &filters.equipment_type {
        builder.push(" AND equipment.equipment_type = ");
        builder.push_bind(equipment_type.clone());
    }

    if let Some(location) = &filters.location {
        builder.push(" AND equipment.location LIKE ");
        builder.push_bind(format!("%{}%", location));
    }

    if let Some(max_price) = filters.max_price {
        builder.push(" AND equipment.price_per_day <= ");
        builder.push_bind(max_price);
    }

    if let Some(search) = &filters.search {
        builder.push(" AND (equipment.name LIKE ");
        builder.push_bind(format!("%{}%", search));
        builder.push(" OR equipment.description LIKE ");
        builder.push_bind(format!("%{}%", search));
        builder.push(")");
    }
}

pub async fn create<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateEquipmentPayload,
) -> Result<Equipment> {
    let now = Utc::now().naive_utc();

    sqlx::query_as::<_, Equipment>(
        "
        INSERT INTO equipment (
            id,
            owner_id,
            name,
            equipment_type,
            description,
            specifications,
            price_per_day,
            location,
            availability_status,
            created_at,
            updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.owner_id)
    .bind(payload.name)
    .bind(payload.equipment_type)
    .bind(payload.description)
    .bind(Json(payload.specifications))
    .bind(payload.price_per_day)
    .bind(payload.location)
    .bind(AvailabilityStatus::Available)
    .bind(now)
    .bind(now)
    .fetch_one(e)
    .await
    .map_err(|err| Error::internal("Error occurred while creating equipment", err))
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(e: E, id: &str) -> Result<Option<Equipment>> {
    sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = ?")
        .bind(id)
        .fetch_optional(e)
        .await
        .map_err(|err| Error::internal("Error occurred while fetching equipment by id", err))
}

pub async fn find_listing_by_id(pool: &SqlitePool, id: &str) -> Result<Option<EquipmentListing>> {
    let mut builder = QueryBuilder::<Sqlite>::new(LISTING_COLUMNS);
    builder.push(" WHERE equipment.id = ");
    builder.push_bind(id.to_string());

    builder
        .build_query_as::<EquipmentListing>()
        .fetch_optional(pool)
        .await
        .map_err(|err| Error::internal("Error occurred while fetching equipment listing", err))
}

pub async fn find_many(
    pool: &SqlitePool,
    pagination: &Pagination,
    filters: &Filters,
) -> Result<Paginated<EquipmentListing>> {
    let mut builder = QueryBuilder::<Sqlite>::new(LISTING_COLUMNS);
    push_filters(&mut builder, filters);
    builder.push(" ORDER BY equipment.created_at DESC LIMIT ");
    builder.push_bind(i64::from(pagination.limit()));
    builder.push(" OFFSET ");
    builder.push_bind(pagination.offset());

    let items = builder
        .build_query_as::<EquipmentListing>()
        .fetch_all(pool)
        .await
        .map_err(|err| Error::internal("Error occurred while listing equipment", err))?;

    let mut count = QueryBuilder::<Sqlite>::new(
        "SELECT COUNT(*) FROM equipment INNER JOIN users ON users.id = equipment.owner_id",
    );
    push_filters(&mut count, filters);

    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .map_err(|err| Error::internal("Error occurred while counting equipment", err))?;

    Ok(Paginated::new(items, total as u32, pagination))
}
