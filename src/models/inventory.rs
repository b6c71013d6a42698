use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One stocked batch of a medicine at one pharmacy.
///
/// `(pharmacy_id, medicine_name, batch_number)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub pharmacy_id: Uuid,
    pub medicine_name: String,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Case-insensitive substring match on the medicine name.
    pub fn name_matches(&self, pattern: &str) -> bool {
        self.medicine_name
            .to_lowercase()
            .contains(&pattern.to_lowercase())
    }
}

#[derive(Debug, Serialize)]
pub struct MedicineListResponse {
    pub medicines: Vec<InventoryRecord>,
}
