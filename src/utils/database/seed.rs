use chrono::NaiveDate;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    modules::{
        equipment, produce, product,
        user::{self, repository::Role},
    },
    utils::error::{Error, Result},
};

struct DemoUser {
    name: &'static str,
    phone: &'static str,
    email: &'static str,
    role: Role,
    location: &'static str,
}

const DEMO_USERS: [DemoUser; 6] = [
    DemoUser {
        name: "Ramesh Kumar",
        phone: "9876543210",
        email: "ramesh@agrimarket.example",
        role: Role::Farmer,
        location: "Nashik, Maharashtra",
    },
    DemoUser {
        name: "Suresh Patel",
        phone: "9876543211",
        email: "suresh@agrimarket.example",
        role: Role::EquipmentProvider,
        location: "Anand, Gujarat",
    },
    DemoUser {
        name: "Anita Sharma",
        phone: "9876543212",
        email: "anita@agrimarket.example",
        role: Role::InputSupplier,
        location: "Ludhiana, Punjab",
    },
    DemoUser {
        name: "Vijay Singh",
        phone: "9876543213",
        email: "vijay@agrimarket.example",
        role: Role::TransportProvider,
        location: "Jaipur, Rajasthan",
    },
    DemoUser {
        name: "Priya Nair",
        phone: "9876543214",
        email: "priya@agrimarket.example",
        role: Role::Consumer,
        location: "Kochi, Kerala",
    },
    DemoUser {
        name: "Platform Admin",
        phone: "9999999999",
        email: "admin@agrimarket.example",
        role: Role::Admin,
        location: "Bengaluru, Karnataka",
    },
];

/// Inserts the demonstration roster, but only into a database with no users.
/// Returns whether anything was written.
pub async fn seed_if_empty(pool: &SqlitePool) -> Result<bool> {
    if user::repository::count(pool).await? > 0 {
        tracing::debug!("Users already present, skipping demonstration data");
        return Ok(false);
    }

    let mut tx = pool
        .begin()
        .await
        .map_err(|err| Error::internal("Failed to start database transaction", err))?;

    let mut farmer_id = None;
    let mut provider_id = None;
    let mut supplier_id = None;

    for demo in DEMO_USERS.iter() {
        let user = user::repository::create(
            &mut *tx,
            user::repository::CreateUserPayload {
                name: demo.name.to_string(),
                phone: demo.phone.to_string(),
                email: Some(demo.email.to_string()),
                role: demo.role,
                location: Some(demo.location.to_string()),
                is_verified: true,
            },
        )
        .await?;

        match user.role {
            Role::Farmer => farmer_id = Some(user.id),
            Role::EquipmentProvider => provider_id = Some(user.id),
            Role::InputSupplier => supplier_id = Some(user.id),
            Role::TransportProvider | Role::Consumer | Role::Admin => (),
        }
    }

    let (Some(farmer_id), Some(provider_id), Some(supplier_id)) =
        (farmer_id, provider_id, supplier_id)
    else {
        return Err(Error::Internal(String::from(
            "Demonstration roster is missing a listing owner",
        )));
    };

    equipment::repository::create(
        &mut *tx,
        equipment::repository::CreateEquipmentPayload {
            owner_id: provider_id.clone(),
            name: String::from("Mahindra 575 DI Tractor"),
            equipment_type: String::from("tractor"),
            description: Some(String::from("45 HP tractor, well maintained")),
            specifications: json!({ "horsepower": 45, "fuel": "diesel" }),
            price_per_day: 2500.0,
            location: Some(String::from("Anand, Gujarat")),
        },
    )
    .await?;

    equipment::repository::create(
        &mut *tx,
        equipment::repository::CreateEquipmentPayload {
            owner_id: provider_id,
            name: String::from("Combine Harvester"),
            equipment_type: String::from("harvester"),
            description: Some(String::from("Self-propelled harvester for wheat and paddy")),
            specifications: json!({ "cutting_width_ft": 14 }),
            price_per_day: 8000.0,
            location: Some(String::from("Anand, Gujarat")),
        },
    )
    .await?;

    produce::repository::create(
        &mut *tx,
        produce::repository::CreateProducePayload {
            farmer_id: farmer_id.clone(),
            name: String::from("Red Onions"),
            category: String::from("vegetables"),
            description: Some(String::from("Fresh Nashik red onions")),
            price_per_kg: 30.0,
            stock_kg: 500.0,
            harvest_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            expiry_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            is_organic: false,
            location: Some(String::from("Nashik, Maharashtra")),
        },
    )
    .await?;

    produce::repository::create(
        &mut *tx,
        produce::repository::CreateProducePayload {
            farmer_id,
            name: String::from("Organic Grapes"),
            category: String::from("fruits"),
            description: Some(String::from("Seedless green grapes")),
            price_per_kg: 90.0,
            stock_kg: 200.0,
            harvest_date: NaiveDate::from_ymd_opt(2024, 2, 15),
            expiry_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            is_organic: true,
            location: Some(String::from("Nashik, Maharashtra")),
        },
    )
    .await?;

    product::repository::create(
        &mut *tx,
        product::repository::CreateProductPayload {
            supplier_id,
            name: String::from("Urea Fertilizer"),
            category: String::from("fertilizer"),
            description: Some(String::from("46% nitrogen, 45 kg bag")),
            price_per_unit: 266.5,
            unit: String::from("bag"),
            stock_quantity: 1000,
        },
    )
    .await?;

    tx.commit()
        .await
        .map_err(|err| Error::internal("Failed to commit demonstration data", err))?;

    tracing::info!("Seeded demonstration data for {} users", DEMO_USERS.len());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::database::{self, schema};

    #[tokio::test]
    async fn seeds_once_per_database() {
        let db_conn = database::connect("sqlite::memory:", 1).await.unwrap();
        schema::create_tables(&db_conn.pool).await.unwrap();

        assert!(seed_if_empty(&db_conn.pool).await.unwrap());
        assert!(!seed_if_empty(&db_conn.pool).await.unwrap());

        let users = user::repository::count(&db_conn.pool).await.unwrap();
        assert_eq!(users, DEMO_USERS.len() as i64);
    }
}
