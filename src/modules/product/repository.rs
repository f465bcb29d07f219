use chrono::{NaiveDateTime, Utc};
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
pub struct Product {
    pub id: String,
    pub supplier_id: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price_per_unit: f64,
    pub unit: String,
    pub stock_quantity: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Clone, Debug, FromRow)]
pub struct ProductListing {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub product: Product,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub owner: OwnerSummary,
}

#[derive(Deserialize, Default, Clone, Debug)]
pub struct Filters {
    pub category: Option<String>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
}

pub struct CreateProductPayload {
    pub supplier_id: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price_per_unit: f64,
    pub unit: String,
    pub stock_quantity: i64,
}

const LISTING_COLUMNS: &str = "
    SELECT
        products.*,
        users.name AS owner_name,
        users.phone AS owner_phone,
        users.location AS owner_location
    FROM products
    INNER JOIN users ON users.id = products.supplier_id
";

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &Filters) {
    builder.push(" WHERE 1 = 1");

    if let Some(category) = &filters.category {
        builder.push(" AND products.category = ");
        builder.push_bind(category.clone());
    }

    if let Some(max_price) = filters.max_price {
        builder.push(" AND products.price_per_unit <= ");
        builder.push_bind(max_price);
    }

    if let Some(search) = &filters.search {
        builder.push(" AND (products.name LIKE ");
        builder.push_bind(format!("%{}%", search));
        builder.push(" OR products.description LIKE ");
        builder.push_bind(format!("%{}%", search));
        builder.push(")");
    }
}

pub async fn create<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateProductPayload,
) -> Result<Product> {
    let now = Utc::now().naive_utc();

    sqlx::query_as::<_, Product>(
        "
        INSERT INTO products (
            id,
            supplier_id,
            name,
            category,
            description,
            price_per_unit,
            unit,
            stock_quantity,
            created_at,
            updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.supplier_id)
    .bind(payload.name)
    .bind(payload.category)
    .bind(payload.description)
    .bind(payload.price_per_unit)
    .bind(payload.unit)
    .bind(payload.stock_quantity)
    .bind(now)
    .bind(now)
    .fetch_one(e)
    .await
    .map_err(|err| Error::internal("Error occurred while creating product", err))
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(e: E, id: &str) -> Result<Option<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(e)
        .await
        .map_err(|err| Error::internal("Error occurred while fetching product by id", err))
}

pub async fn find_listing_by_id(pool: &SqlitePool, id: &str) -> Result<Option<ProductListing>> {
    let mut builder = QueryBuilder::<Sqlite>::new(LISTING_COLUMNS);
    builder.push(" WHERE products.id = ");
    builder.push_bind(id.to_string());

    builder
        .build_query_as::<ProductListing>()
        .fetch_optional(pool)
        .await
        .map_err(|err| Error::internal("Error occurred while fetching product listing", err))
}

pub async fn find_many(
    pool: &SqlitePool,
    pagination: &Pagination,
    filters: &Filters,
) -> Result<Paginated<ProductListing>> {
    let mut builder = QueryBuilder::<Sqlite>::new(LISTING_COLUMNS);
    push_filters(&mut builder, filters);
    builder.push(" ORDER BY products.created_at DESC LIMIT ");
    builder.push_bind(i64::from(pagination.limit()));
    builder.push(" OFFSET ");
    builder.push_bind(pagination.offset());

    let items = builder
        .build_query_as::<ProductListing>()
        .fetch_all(pool)
        .await
        .map_err(|err| Error::internal("Error occurred while listing products", err))?;

    let mut count = QueryBuilder::<Sqlite>::new(
        "SELECT COUNT(*) FROM products INNER JOIN users ON users.id = products.supplier_id",
    );
    push_filters(&mut count, filters);

    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .map_err(|err| Error::internal("Error occurred while counting products", err))?;

    Ok(Paginated::new(items, total as u32, pagination))
}
