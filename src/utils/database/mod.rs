pub mod schema;
pub mod seed;

use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use super::error::{Error, Result};

#[derive(Clone)]
pub struct DatabaseConnection {
    pub pool: SqlitePool,
}

pub async fn connect(database_url: &str, max_connections: u32) -> Result<DatabaseConnection> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|err| Error::internal("Invalid database url", err))?
        .create_if_missing(true)
        .foreign_keys(true);

    // In-memory databases vanish with their last connection, so connections are never recycled.
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|err| Error::internal("Error connecting to database", err))?;

    Ok(DatabaseConnection { pool })
}

/// Creates every table that does not exist yet and seeds demonstration data
/// into an empty database.
pub async fn bootstrap(db_conn: &DatabaseConnection, seed_demo_data: bool) -> Result<()> {
    schema::create_tables(&db_conn.pool).await?;

    if seed_demo_data {
        seed::seed_if_empty(&db_conn.pool).await?;
    }

    Ok(())
}
