use async_trait::async_trait;
use sqlx::{PgPool, query_as};
use uuid::Uuid;

use crate::middleware::error_handling::Result;
use crate::models::InventoryRecord;
use crate::repositories::InventoryStore;

const INVENTORY_COLUMNS: &str =
    "pharmacy_id, medicine_name, batch_number, expiry_date, quantity, price_per_unit, created_at, updated_at";

/// Escape `\`, `%` and `_` so user text is matched literally inside ILIKE.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn contains_pattern(name_pattern: &str) -> String {
    format!("%{}%", escape_like(name_pattern))
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for InventoryRepository {
    async fn find_matching(&self, name_pattern: &str, min_quantity: i32) -> Result<Vec<InventoryRecord>> {
        let sql = format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory \
             WHERE medicine_name ILIKE $1 AND quantity >= $2 \
             ORDER BY created_at ASC, pharmacy_id, batch_number"
        );

        let records = query_as::<_, InventoryRecord>(&sql)
            .bind(contains_pattern(name_pattern))
            .bind(min_quantity)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn search_by_name(&self, name_pattern: &str, limit: i64) -> Result<Vec<InventoryRecord>> {
        let sql = format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory \
             WHERE medicine_name ILIKE $1 \
             ORDER BY medicine_name ASC, pharmacy_id, batch_number \
             LIMIT $2"
        );

        let records = query_as::<_, InventoryRecord>(&sql)
            .bind(contains_pattern(name_pattern))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn list_by_pharmacy(&self, pharmacy_id: Uuid) -> Result<Vec<InventoryRecord>> {
        let sql = format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory \
             WHERE pharmacy_id = $1 \
             ORDER BY updated_at DESC"
        );

        let records = query_as::<_, InventoryRecord>(&sql)
            .bind(pharmacy_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }
}
