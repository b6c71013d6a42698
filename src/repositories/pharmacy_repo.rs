use async_trait::async_trait;
use sqlx::{PgPool, query_as};
use uuid::Uuid;

use crate::middleware::error_handling::Result;
use crate::models::{Location, Pharmacy};
use crate::repositories::PharmacyStore;

#[derive(Clone)]
pub struct PharmacyRepository {
    pool: PgPool,
}

impl PharmacyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PharmacyStore for PharmacyRepository {
    async fn find_by_id(&self, pharmacy_id: Uuid) -> Result<Option<Pharmacy>> {
        let pharmacy = query_as::<_, Pharmacy>(
            "SELECT id, name, username, email, phone, address, is_open, created_at, updated_at FROM pharmacies WHERE id = $1"
        )
        .bind(pharmacy_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pharmacy)
    }

    async fn get_location(&self, pharmacy_id: Uuid) -> Result<Option<Location>> {
        let location = query_as::<_, Location>(
            "SELECT latitude, longitude FROM locations WHERE pharmacy_id = $1"
        )
        .bind(pharmacy_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }
}
