use sqlx::SqlitePool;

use crate::utils::error::{Error, Result};

const TABLES: [&str; 9] = [
    "
    CREATE TABLE IF NOT EXISTS users (
        id                  TEXT PRIMARY KEY,
        name                TEXT NOT NULL,
        phone               TEXT NOT NULL UNIQUE,
        email               TEXT UNIQUE,
        role                TEXT NOT NULL CHECK (role IN (
                                'farmer',
                                'equipment_provider',
                                'input_supplier',
                                'transport_provider',
                                'consumer',
                                'admin'
                            )),
        location            TEXT,
        is_verified         BOOLEAN NOT NULL DEFAULT FALSE,
        is_active           BOOLEAN NOT NULL DEFAULT TRUE,
        created_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    ",
    "
    CREATE TABLE IF NOT EXISTS equipment (
        id                  TEXT PRIMARY KEY,
        owner_id            TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name                TEXT NOT NULL,
        equipment_type      TEXT NOT NULL,
        description         TEXT,
        specifications      TEXT NOT NULL DEFAULT '{}',
        price_per_day       REAL NOT NULL CHECK (price_per_day >= 0),
        location            TEXT,
        availability_status TEXT NOT NULL DEFAULT 'available',
        created_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    ",
    "
    CREATE TABLE IF NOT EXISTS produce (
        id                  TEXT PRIMARY KEY,
        farmer_id           TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name                TEXT NOT NULL,
        category            TEXT NOT NULL,
        description         TEXT,
        price_per_kg        REAL NOT NULL CHECK (price_per_kg >= 0),
        stock_kg            REAL NOT NULL DEFAULT 0,
        harvest_date        TEXT,
        expiry_date         TEXT,
        is_organic          BOOLEAN NOT NULL DEFAULT FALSE,
        location            TEXT,
        created_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    ",
    "
    CREATE TABLE IF NOT EXISTS products (
        id                  TEXT PRIMARY KEY,
        supplier_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name                TEXT NOT NULL,
        category            TEXT NOT NULL,
        description         TEXT,
        price_per_unit      REAL NOT NULL CHECK (price_per_unit >= 0),
        unit                TEXT NOT NULL,
        stock_quantity      INTEGER NOT NULL DEFAULT 0,
        created_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    ",
    "
    CREATE TABLE IF NOT EXISTS equipment_bookings (
        id                  TEXT PRIMARY KEY,
        equipment_id        TEXT NOT NULL REFERENCES equipment(id) ON DELETE CASCADE,
        renter_id           TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        start_date          TEXT NOT NULL,
        end_date            TEXT NOT NULL,
        total_amount        REAL NOT NULL,
        status              TEXT NOT NULL DEFAULT 'pending',
        payment_status      TEXT NOT NULL DEFAULT 'pending',
        created_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    ",
    "
    CREATE TABLE IF NOT EXISTS orders (
        id                  TEXT PRIMARY KEY,
        buyer_id            TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        seller_id           TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        total_amount        REAL NOT NULL DEFAULT 0,
        status              TEXT NOT NULL DEFAULT 'pending',
        payment_status      TEXT NOT NULL DEFAULT 'pending',
        delivery_address    TEXT,
        created_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    ",
    "
    CREATE TABLE IF NOT EXISTS order_items (
        id                  TEXT PRIMARY KEY,
        order_id            TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        produce_id          TEXT REFERENCES produce(id) ON DELETE SET NULL,
        product_id          TEXT REFERENCES products(id) ON DELETE SET NULL,
        quantity            REAL NOT NULL CHECK (quantity > 0),
        unit_price          REAL NOT NULL,
        total_price         REAL NOT NULL,
        created_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    ",
    "
    CREATE TABLE IF NOT EXISTS transport_requests (
        id                  TEXT PRIMARY KEY,
        requester_id        TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        provider_id         TEXT REFERENCES users(id) ON DELETE SET NULL,
        pickup_location     TEXT NOT NULL,
        delivery_location   TEXT NOT NULL,
        cargo_type          TEXT NOT NULL,
        cargo_weight_kg     REAL NOT NULL,
        distance_km         REAL,
        offered_price       REAL,
        status              TEXT NOT NULL DEFAULT 'pending',
        pickup_date         TEXT,
        created_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    ",
    "
    CREATE TABLE IF NOT EXISTS payments (
        id                      TEXT PRIMARY KEY,
        user_id                 TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        order_id                TEXT REFERENCES orders(id) ON DELETE SET NULL,
        booking_id              TEXT REFERENCES equipment_bookings(id) ON DELETE SET NULL,
        amount                  REAL NOT NULL CHECK (amount > 0),
        currency                TEXT NOT NULL,
        payment_method          TEXT,
        gateway                 TEXT NOT NULL,
        gateway_transaction_id  TEXT,
        status                  TEXT NOT NULL DEFAULT 'created',
        created_at              TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at              TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    ",
];

const INDEXES: [&str; 7] = [
    "CREATE INDEX IF NOT EXISTS idx_equipment_owner ON equipment(owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_produce_farmer ON produce(farmer_id)",
    "CREATE INDEX IF NOT EXISTS idx_products_supplier ON products(supplier_id)",
    "CREATE INDEX IF NOT EXISTS idx_bookings_equipment ON equipment_bookings(equipment_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_buyer ON orders(buyer_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_seller ON orders(seller_id)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id)",
];

pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    for statement in TABLES.iter().chain(INDEXES.iter()) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|err| Error::internal("Failed to create database schema", err))?;
    }

    tracing::info!("Database schema is up to date");
    Ok(())
}
