use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use ulid::Ulid;

use crate::{
    modules::user::repository::OwnerSummary,
    utils::{
        error::{Error, Result},
        pagination::{Paginated, Pagination},
    },
};

#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Produce {
    pub id: String,
    pub farmer_id: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price_per_kg: f64,
    pub stock_kg: f64,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub is_organic: bool,
    pub location: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Clone, Debug, FromRow)]
pub struct ProduceListing {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub produce: Produce,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub owner: OwnerSummary,
}

#[derive(Deserialize, Default, Clone, Debug)]
pub struct Filters {
    pub category: Option<String>,
    pub location: Option<String>,
    pub is_organic: Option<bool>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
}

pub struct CreateProducePayload {
    pub farmer_id: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price_per_kg: f64,
    pub stock_kg: f64,
    pub harvest_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub is_organic: bool,
    pub location: Option<String>,
}

const LISTING_COLUMNS: &str = "
    SELECT
        produce.*,
        users.name AS owner_name,
        users.phone AS owner_phone,
        users.location AS owner_location
    FROM produce
    INNER JOIN users ON users.id = produce.farmer_id
";

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &Filters) {
    builder.push(" WHERE produce.stock_kg > 0");

    if let Some(category) = &filters.category {
        builder.push(" AND produce.category = ");
        builder.push_bind(category.clone());
    }

    if let Some(location) = &filters.location {
        builder.push(" AND produce.location LIKE ");
        builder.push_bind(format!("%{}%", location));
    }

    if let Some(is_organic) = filters.is_organic {
        builder.push(" AND produce.is_organic = ");
        builder.push_bind(is_organic);
    }

    if let Some(max_price) = filters.max_price {
        builder.push(" AND produce.price_per_kg <= ");
        builder.push_bind(max_price);
    }

    if let Some(search) = &filters.search {
        builder.push(" AND (produce.name LIKE ");
        builder.push_bind(format!("%{}%", search));
        builder.push(" OR produce.description LIKE ");
        builder.push_bind(format!("%{}%", search));
        builder.push(")");
    }
}

pub async fn create<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateProducePayload,
) -> Result<Produce> {
    let now = Utc::now().naive_utc();

    sqlx::query_as::<_, Produce>(
        "
        INSERT INTO produce (
            id,
            farmer_id,
            name,
            category,
            description,
            price_per_kg,
            stock_kg,
            harvest_date,
            expiry_date,
            is_organic,
            location,
            created_at,
            updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.farmer_id)
    .bind(payload.name)
    .bind(payload.category)
    .bind(payload.description)
    .bind(payload.price_per_kg)
    .bind(payload.stock_kg)
    .bind(payload.harvest_date)
    .bind(payload.expiry_date)
    .bind(payload.is_organic)
    .bind(payload.location)
    .bind(now)
    .bind(now)
    .fetch_one(e)
    .await
    .map_err(|err| Error::internal("Error occurred while creating produce", err))
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(e: E, id: &str) -> Result<Option<Produce>> {
    sqlx::query_as::<_, Produce>("SELECT * FROM produce WHERE id = ?")
        .bind(id)
        .fetch_optional(e)
        .await
        .map_err(|err| Error::internal("Error occurred while fetching produce by id", err))
}

pub async fn find_listing_by_id(pool: &SqlitePool, id: &str) -> Result<Option<ProduceListing>> {
    let mut builder = QueryBuilder::<Sqlite>::new(LISTING_COLUMNS);
    builder.push(" WHERE produce.id = ");
    builder.push_bind(id.to_string());

    builder
        .build_query_as::<ProduceListing>()
        .fetch_optional(pool)
        .await
        .map_err(|err| Error::internal("Error occurred while fetching produce listing", err))
}

pub async fn find_many(
    pool: &SqlitePool,
    pagination: &Pagination,
    filters: &Filters,
) -> Result<Paginated<ProduceListing>> {
    let mut builder = QueryBuilder::<Sqlite>::new(LISTING_COLUMNS);
    push_filters(&mut builder, filters);
    builder.push(" ORDER BY produce.created_at DESC LIMIT ");
    builder.push_bind(i64::from(pagination.limit()));
    builder.push(" OFFSET ");
    builder.push_bind(pagination.offset());

    let items = builder
        .build_query_as::<ProduceListing>()
        .fetch_all(pool)
        .await
        .map_err(|err| Error::internal("Error occurred while listing produce", err))?;

    let mut count = QueryBuilder::<Sqlite>::new(
        "SELECT COUNT(*) FROM produce INNER JOIN users ON users.id = produce.farmer_id",
    );
    push_filters(&mut count, filters);

    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .map_err(|err| Error::internal("Error occurred while counting produce", err))?;

    Ok(Paginated::new(items, total as u32, pagination))
}
