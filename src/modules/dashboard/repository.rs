use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    modules::user::repository::Role,
    utils::error::{Error, Result},
};

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: i64,
    pub equipment_listings: i64,
    pub produce_listings: i64,
    pub product_listings: i64,
    pub bookings: i64,
    pub active_bookings: i64,
    pub orders_received: i64,
    pub orders_placed: i64,
    pub total_orders: i64,
    pub transport_requests: i64,
}

async fn count(pool: &SqlitePool, query: &str, user_id: Option<&str>) -> Result<i64> {
    let mut query = sqlx::query_scalar::<_, i64>(query);
    if let Some(user_id) = user_id {
        query = query.bind(user_id.to_string());
    }

    query.fetch_one(pool).await.map_err(|err| {
        Error::internal("Error occurred while trying to fetch dashboard counts", err)
    })
}

const ACTIVE_BOOKING_STATUSES: &str = "('pending', 'confirmed')";

pub async fn get_stats(pool: &SqlitePool, user_id: &str, role: Role) -> Result<DashboardStats> {
    let user = Some(user_id);
    let mut stats = DashboardStats::default();

    match role {
        Role::Farmer => {
            stats.produce_listings =
                count(pool, "SELECT COUNT(*) FROM produce WHERE farmer_id = ?", user).await?;
            stats.active_bookings = count(
                pool,
                &format!(
                    "SELECT COUNT(*) FROM equipment_bookings WHERE renter_id = ? AND status IN {}",
                    ACTIVE_BOOKING_STATUSES
                ),
                user,
            )
            .await?;
            stats.orders_received =
                count(pool, "SELECT COUNT(*) FROM orders WHERE seller_id = ?", user).await?;
        }
        Role::EquipmentProvider => {
            stats.equipment_listings =
                count(pool, "SELECT COUNT(*) FROM equipment WHERE owner_id = ?", user).await?;
            stats.bookings = count(
                pool,
                "
                SELECT COUNT(*) FROM equipment_bookings
                INNER JOIN equipment ON equipment.id = equipment_bookings.equipment_id
                WHERE equipment.owner_id = ?
                ",
                user,
            )
            .await?;
            stats.active_bookings = count(
                pool,
                &format!(
                    "
                    SELECT COUNT(*) FROM equipment_bookings
                    INNER JOIN equipment ON equipment.id = equipment_bookings.equipment_id
                    WHERE equipment.owner_id = ? AND equipment_bookings.status IN {}
                    ",
                    ACTIVE_BOOKING_STATUSES
                ),
                user,
            )
            .await?;
        }
        Role::InputSupplier => {
            stats.product_listings =
                count(pool, "SELECT COUNT(*) FROM products WHERE supplier_id = ?", user).await?;
            stats.orders_received =
                count(pool, "SELECT COUNT(*) FROM orders WHERE seller_id = ?", user).await?;
        }
        Role::TransportProvider => {
            stats.transport_requests = count(
                pool,
                "SELECT COUNT(*) FROM transport_requests WHERE provider_id = ?",
                user,
            )
            .await?;
        }
        Role::Consumer => {
            stats.orders_placed =
                count(pool, "SELECT COUNT(*) FROM orders WHERE buyer_id = ?", user).await?;
        }
        Role::Admin => {
            stats.total_users = count(pool, "SELECT COUNT(*) FROM users", None).await?;
            stats.equipment_listings = count(pool, "SELECT COUNT(*) FROM equipment", None).await?;
            stats.produce_listings = count(pool, "SELECT COUNT(*) FROM produce", None).await?;
            stats.product_listings = count(pool, "SELECT COUNT(*) FROM products", None).await?;
            stats.bookings = count(pool, "SELECT COUNT(*) FROM equipment_bookings", None).await?;
            stats.total_orders = count(pool, "SELECT COUNT(*) FROM orders", None).await?;
            stats.transport_requests =
                count(pool, "SELECT COUNT(*) FROM transport_requests", None).await?;
        }
    }

    Ok(stats)
}
